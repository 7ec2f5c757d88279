use std::collections::BTreeMap;
use std::fmt;
use std::io::Write as _;
use std::time::Duration;

use serde::Serialize;
use serde_json::Number;

use crate::args::OutputFormat;
use crate::error::{AppError, AppResult};
use crate::metrics::StatisticsReport;

const RULE_WIDTH: usize = 60;
const X100_DIVISOR: u64 = 100;

/// Writes the report to stdout in the requested format.
///
/// # Errors
///
/// Returns an error when stdout cannot be written or JSON encoding fails.
pub(crate) fn print_report(report: &StatisticsReport, format: OutputFormat) -> AppResult<()> {
    let rendered = match format {
        OutputFormat::Text => render_text(report),
        OutputFormat::Json => render_json(report)?,
    };
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

pub(crate) fn render_text(report: &StatisticsReport) -> String {
    TextReport(report).to_string()
}

struct TextReport<'report>(&'report StatisticsReport);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        let rule = "=".repeat(RULE_WIDTH);

        writeln!(f, "\n{}\nLOAD TEST RESULTS\n{}", rule, rule)?;
        if report.total_requests == 0 {
            return writeln!(f, "No results to analyze\n{}", rule);
        }

        writeln!(f, "Total Requests: {}", report.total_requests)?;
        writeln!(
            f,
            "Successful: {} ({}%)",
            report.successful_requests,
            format_x100(report.success_rate_x100)
        )?;
        writeln!(
            f,
            "Failed: {} ({}%)\n",
            report.failed_requests,
            format_x100(report.failure_rate_x100)
        )?;

        if report.successful_requests > 0 {
            let latency = &report.latency;
            writeln!(f, "RESPONSE TIME STATISTICS:")?;
            for (label, value) in [
                ("Average", latency.avg),
                ("Min", latency.min),
                ("Max", latency.max),
                ("50th percentile", latency.p50),
                ("95th percentile", latency.p95),
                ("99th percentile", latency.p99),
            ] {
                writeln!(f, "  {}: {:.3}s", label, value.as_secs_f64())?;
            }
            writeln!(f, "\nSTATUS CODE DISTRIBUTION:")?;
            for (code, count) in &report.status_codes {
                writeln!(f, "  {}: {} requests", code, count)?;
            }
            writeln!(f)?;
        }

        if report.failed_requests > 0 {
            writeln!(f, "ERRORS:")?;
            for (category, count) in &report.error_categories {
                writeln!(f, "  {}: {} occurrences", category, count)?;
            }
            writeln!(f)?;
        }

        if let Some(throughput) = report.throughput_x100 {
            writeln!(f, "THROUGHPUT: {} requests/second", format_x100(throughput))?;
        }
        writeln!(
            f,
            "TOTAL TEST TIME: {:.2} seconds\n{}",
            report.total_elapsed.as_secs_f64(),
            rule
        )
    }
}

#[derive(Serialize)]
struct LatencyView {
    min: f64,
    max: f64,
    avg: f64,
    p50: f64,
    p95: f64,
    p99: f64,
}

#[derive(Serialize)]
struct ReportView<'report> {
    total_requests: usize,
    successful_requests: usize,
    failed_requests: usize,
    success_rate: Number,
    failure_rate: Number,
    latency_seconds: LatencyView,
    status_codes: &'report BTreeMap<u16, usize>,
    errors: &'report BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    throughput: Option<Number>,
    total_time_seconds: f64,
}

pub(crate) fn render_json(report: &StatisticsReport) -> AppResult<String> {
    let secs = Duration::as_secs_f64;
    let latency = &report.latency;
    let view = ReportView {
        total_requests: report.total_requests,
        successful_requests: report.successful_requests,
        failed_requests: report.failed_requests,
        success_rate: x100_number(report.success_rate_x100)?,
        failure_rate: x100_number(report.failure_rate_x100)?,
        latency_seconds: LatencyView {
            min: secs(&latency.min),
            max: secs(&latency.max),
            avg: secs(&latency.avg),
            p50: secs(&latency.p50),
            p95: secs(&latency.p95),
            p99: secs(&latency.p99),
        },
        status_codes: &report.status_codes,
        errors: &report.error_categories,
        throughput: report.throughput_x100.map(x100_number).transpose()?,
        total_time_seconds: secs(&report.total_elapsed),
    };
    let mut rendered = serde_json::to_string_pretty(&view)?;
    rendered.push('\n');
    Ok(rendered)
}

/// `12345` renders as `123.45`.
fn format_x100(value: u64) -> String {
    format!("{}.{:02}", value / X100_DIVISOR, value % X100_DIVISOR)
}

fn x100_number(value: u64) -> AppResult<Number> {
    format_x100(value).parse::<Number>().map_err(AppError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{Outcome, aggregate};

    fn sample_report() -> StatisticsReport {
        let mut outcomes: Vec<Outcome> = (0..3)
            .map(|_| Outcome::completed(Duration::from_millis(50), 200))
            .collect();
        outcomes.push(Outcome::completed(Duration::from_millis(80), 404));
        outcomes.push(Outcome::failed(
            Duration::from_secs(1),
            "Timeout: operation timed out",
        ));
        aggregate(&outcomes, Duration::from_secs(2))
    }

    #[test]
    fn text_report_lists_counts_and_histograms() -> Result<(), String> {
        let text = render_text(&sample_report());
        for needle in [
            "Total Requests: 5",
            "Successful: 4 (80.00%)",
            "Failed: 1 (20.00%)",
            "50th percentile: 0.050s",
            "  200: 3 requests",
            "  404: 1 requests",
            "  Timeout: 1 occurrences",
            "THROUGHPUT: 2.00 requests/second",
            "TOTAL TEST TIME: 2.00 seconds",
        ] {
            if !text.contains(needle) {
                return Err(format!("Missing '{}' in:\n{}", needle, text));
            }
        }
        let ok_200 = text.find("  200:").unwrap_or(usize::MAX);
        let not_found = text.find("  404:").unwrap_or(0);
        if ok_200 > not_found {
            return Err("Status codes must be listed in ascending order".to_owned());
        }
        Ok(())
    }

    #[test]
    fn fixed_point_values_keep_two_decimals() -> Result<(), String> {
        for (value, expected) in [(0, "0.00"), (5, "0.05"), (8_000, "80.00"), (12_345, "123.45")] {
            let rendered = format_x100(value);
            if rendered != expected {
                return Err(format!("{} rendered as {}, expected {}", value, rendered, expected));
            }
        }
        Ok(())
    }

    #[test]
    fn text_report_for_empty_run() -> Result<(), String> {
        let text = render_text(&aggregate(&[], Duration::ZERO));
        if !text.contains("No results to analyze") || text.contains("THROUGHPUT") {
            return Err(format!("Unexpected empty report:\n{}", text));
        }
        Ok(())
    }

    #[test]
    fn json_report_omits_missing_throughput() -> Result<(), String> {
        let failed_only = aggregate(
            &[Outcome::failed(Duration::from_millis(5), "ConnectionError: refused")],
            Duration::from_secs(1),
        );
        let rendered = render_json(&failed_only).map_err(|err| err.to_string())?;
        let value: serde_json::Value =
            serde_json::from_str(&rendered).map_err(|err| err.to_string())?;

        if value.get("throughput").is_some() {
            return Err("throughput must be omitted".to_owned());
        }
        if value.pointer("/errors/ConnectionError") != Some(&serde_json::json!(1)) {
            return Err(format!("Unexpected errors in {}", rendered));
        }

        let full = render_json(&sample_report()).map_err(|err| err.to_string())?;
        let value: serde_json::Value =
            serde_json::from_str(&full).map_err(|err| err.to_string())?;
        if value.pointer("/status_codes/200") != Some(&serde_json::json!(3)) {
            return Err(format!("Unexpected status codes in {}", full));
        }
        if value.get("throughput") != Some(&serde_json::json!(2.0))
            || value.get("success_rate") != Some(&serde_json::json!(80.0))
        {
            return Err(format!("Unexpected throughput in {}", full));
        }
        Ok(())
    }
}
