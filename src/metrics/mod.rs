//! Per-request outcomes and the statistics derived from a finished run.
mod aggregate;
mod percentiles;
mod types;


pub use aggregate::{UNKNOWN_ERROR_CATEGORY, aggregate, categorize_error};
pub use types::{LatencySummary, Outcome, StatisticsReport};
