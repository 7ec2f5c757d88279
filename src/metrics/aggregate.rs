use std::collections::BTreeMap;
use std::time::Duration;

use super::percentiles::{PERCENTILE_P50, PERCENTILE_P95, PERCENTILE_P99, mean, nearest_rank};
use super::{LatencySummary, Outcome, StatisticsReport};

pub const UNKNOWN_ERROR_CATEGORY: &str = "Unknown";

const PERCENT_X100_SCALE: u128 = 10_000;
const NANOS_PER_SEC_X100: u128 = 100_000_000_000;

/// Builds the report for a finished run. Empty input gives a zeroed report.
#[must_use]
pub fn aggregate(outcomes: &[Outcome], total_elapsed: Duration) -> StatisticsReport {
    let mut latencies = Vec::with_capacity(outcomes.len());
    let mut status_codes: BTreeMap<u16, usize> = BTreeMap::new();
    let mut error_categories: BTreeMap<String, usize> = BTreeMap::new();

    for outcome in outcomes {
        if outcome.success() {
            latencies.push(outcome.response_time());
            bump(status_codes.entry(outcome.status_code()).or_insert(0));
        } else {
            let category = categorize_error(outcome.error());
            bump(error_categories.entry(category.to_owned()).or_insert(0));
        }
    }
    latencies.sort_unstable();

    let total_requests = outcomes.len();
    let successful_requests = latencies.len();
    let failed_requests = total_requests.saturating_sub(successful_requests);

    StatisticsReport {
        total_requests,
        successful_requests,
        failed_requests,
        success_rate_x100: percent_x100(successful_requests, total_requests),
        failure_rate_x100: percent_x100(failed_requests, total_requests),
        latency: summarize_latencies(&latencies),
        status_codes,
        error_categories,
        throughput_x100: throughput_x100(successful_requests, total_elapsed),
        total_elapsed,
    }
}

/// Error category: everything before the first `:`, or the whole description
/// when there is no colon. Missing or empty descriptions are `Unknown`.
#[must_use]
pub fn categorize_error(error: Option<&str>) -> &str {
    match error {
        Some(description) if !description.is_empty() => description
            .split_once(':')
            .map_or(description, |(category, _)| category),
        Some(_) | None => UNKNOWN_ERROR_CATEGORY,
    }
}

fn summarize_latencies(sorted: &[Duration]) -> LatencySummary {
    let (Some(min), Some(max)) = (sorted.first(), sorted.last()) else {
        return LatencySummary::default();
    };
    LatencySummary {
        min: *min,
        max: *max,
        avg: mean(sorted),
        p50: nearest_rank(sorted, PERCENTILE_P50),
        p95: nearest_rank(sorted, PERCENTILE_P95),
        p99: nearest_rank(sorted, PERCENTILE_P99),
    }
}

/// Successful requests per second, times 100.
fn throughput_x100(successful: usize, total_elapsed: Duration) -> Option<u64> {
    let nanos = total_elapsed.as_nanos();
    if successful == 0 || nanos == 0 {
        return None;
    }
    let scaled = u128::try_from(successful)
        .map_or(u128::MAX, |count| count)
        .saturating_mul(NANOS_PER_SEC_X100)
        .checked_div(nanos)
        .unwrap_or(0);
    Some(u64::try_from(scaled).map_or(u64::MAX, |value| value))
}

/// `part / total` as a percentage times 100; `0` for an empty total.
fn percent_x100(part: usize, total: usize) -> u64 {
    let (Ok(numerator), Ok(denominator)) = (u128::try_from(part), u128::try_from(total)) else {
        return 0;
    };
    let scaled = numerator
        .saturating_mul(PERCENT_X100_SCALE)
        .checked_div(denominator)
        .unwrap_or(0);
    u64::try_from(scaled).map_or(u64::MAX, |value| value)
}

const fn bump(count: &mut usize) {
    *count = count.saturating_add(1);
}
