//! Request planning and bounded-concurrency dispatch.
mod dispatcher;
mod executor;
mod policy;


pub use dispatcher::{DispatchPlan, TestRun, dispatch};
pub use executor::{RequestExecutor, RequestSpec};
pub use policy::{ROOT_PATH, RandomEndpointPolicy, SelectionPolicy};
