//! HTTP client construction, the request executor and the readiness probe.
mod client;
mod executor;
mod readiness;

#[cfg(test)]
mod tests;

pub use client::{build_client, parse_base_url};
pub use executor::HttpExecutor;
pub use readiness::{ReadinessPolicy, wait_for_service};
