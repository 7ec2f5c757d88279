use std::collections::BTreeMap;
use std::time::Duration;

/// Description used when a transport failure reports no text of its own.
const EMPTY_FAILURE_DESCRIPTION: &str = "TransportError: no error description";

/// Result of a single request attempt.
///
/// A record either carries a real HTTP status code or a failure description,
/// never both. The constructors are the only way to build one, so `success()`
/// always agrees with the presence of `error()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    response_time: Duration,
    status_code: u16,
    error: Option<String>,
}

impl Outcome {
    /// A request that got an HTTP response, whatever its status.
    #[must_use]
    pub const fn completed(response_time: Duration, status_code: u16) -> Self {
        Self {
            response_time,
            status_code,
            error: None,
        }
    }

    /// A request that never produced a response.
    #[must_use]
    pub fn failed(response_time: Duration, description: impl Into<String>) -> Self {
        let mut description = description.into();
        if description.is_empty() {
            description = EMPTY_FAILURE_DESCRIPTION.to_owned();
        }
        Self {
            response_time,
            status_code: 0,
            error: Some(description),
        }
    }

    #[must_use]
    pub const fn success(&self) -> bool {
        self.error.is_none()
    }

    #[must_use]
    pub const fn response_time(&self) -> Duration {
        self.response_time
    }

    /// Observed HTTP status, `0` for failed attempts.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        self.status_code
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Latency statistics over successful requests only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LatencySummary {
    pub min: Duration,
    pub max: Duration,
    pub avg: Duration,
    pub p50: Duration,
    pub p95: Duration,
    pub p99: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatisticsReport {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    /// Percentage times 100, `0..=10_000`.
    pub success_rate_x100: u64,
    /// Percentage times 100, `0..=10_000`.
    pub failure_rate_x100: u64,
    pub latency: LatencySummary,
    /// Successful requests per status code, ascending.
    pub status_codes: BTreeMap<u16, usize>,
    /// Failed requests per error category.
    pub error_categories: BTreeMap<String, usize>,
    /// Successful requests per second times 100; absent when nothing
    /// succeeded or no time elapsed.
    pub throughput_x100: Option<u64>,
    pub total_elapsed: Duration,
}
