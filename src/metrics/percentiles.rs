use std::time::Duration;

/// Standard percentile labels.
pub(super) const PERCENTILE_P50: usize = 50;
pub(super) const PERCENTILE_P95: usize = 95;
pub(super) const PERCENTILE_P99: usize = 99;
const PERCENT_DIVISOR: usize = 100;

/// Nearest-rank percentile over an ascending slice.
///
/// Picks the element at `floor(len * percentile / 100)`, clamped to the last
/// index. No interpolation.
pub(super) fn nearest_rank(sorted: &[Duration], percentile: usize) -> Duration {
    let Some(last) = sorted.len().checked_sub(1) else {
        return Duration::ZERO;
    };
    let index = sorted
        .len()
        .saturating_mul(percentile)
        .checked_div(PERCENT_DIVISOR)
        .unwrap_or(0)
        .min(last);
    sorted.get(index).copied().unwrap_or_default()
}

pub(super) fn mean(values: &[Duration]) -> Duration {
    let count = u128::try_from(values.len()).unwrap_or(u128::MAX);
    let total_nanos = values
        .iter()
        .fold(0u128, |sum, value| sum.saturating_add(value.as_nanos()));
    let avg_nanos = total_nanos.checked_div(count).unwrap_or(0);
    Duration::from_nanos(u64::try_from(avg_nanos).unwrap_or(u64::MAX))
}
