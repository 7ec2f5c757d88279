use clap::Parser;
use std::time::Duration;

use super::defaults::{
    DEFAULT_CONCURRENT, DEFAULT_ENDPOINTS, DEFAULT_REQUESTS, DEFAULT_TIMEOUT, DEFAULT_URL,
    DEFAULT_WAIT_ATTEMPTS,
};
use super::parsers::{parse_duration_arg, parse_positive_usize};
use super::types::{OutputFormat, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Concurrent HTTP load generator - fires a fixed number of requests through a bounded worker pool and reports latency percentiles, status codes and errors."
)]
pub struct TesterArgs {
    /// Base URL of the target service
    #[arg(long, default_value = DEFAULT_URL)]
    pub url: String,

    /// Number of requests to send
    #[arg(long, default_value_t = DEFAULT_REQUESTS)]
    pub requests: u64,

    /// Number of concurrent users (worker pool width)
    #[arg(long, default_value = DEFAULT_CONCURRENT, value_parser = parse_positive_usize)]
    pub concurrent: PositiveUsize,

    /// Wait for the service to answer with a status below 500 before starting
    #[arg(long)]
    pub wait: bool,

    /// Readiness attempts (one per second) when --wait is set
    #[arg(long = "wait-attempts", default_value = DEFAULT_WAIT_ATTEMPTS, value_parser = parse_positive_usize)]
    pub wait_attempts: PositiveUsize,

    /// Endpoints to pick from, uniformly at random
    #[arg(long, num_args = 1.., default_values = DEFAULT_ENDPOINTS)]
    pub endpoints: Vec<String>,

    /// Per-request timeout (supports ms/s/m/h)
    #[arg(
        long = "timeout",
        default_value = DEFAULT_TIMEOUT,
        value_parser = parse_duration_arg
    )]
    pub request_timeout: Duration,

    /// Seed for endpoint/method selection (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Report format
    #[arg(long = "output-format", default_value = "text", ignore_case = true)]
    pub output_format: OutputFormat,

    /// Enable verbose logging (sets log level to debug unless overridden by LOADPROBE_LOG/RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Path to config file (TOML/JSON). Defaults to ./loadprobe.toml or ./loadprobe.json if present.
    #[arg(long)]
    pub config: Option<String>,
}
