//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;


pub use cli::TesterArgs;
pub use types::{HttpMethod, OutputFormat, PositiveUsize};

pub(crate) use defaults::DEFAULT_USER_AGENT;
#[cfg(test)]
pub(crate) use defaults::DEFAULT_ENDPOINTS;
