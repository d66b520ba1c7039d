use std::fmt::Write as _;
use std::time::Duration;

use crate::metrics::RunMetrics;

const HUNDREDTHS: u64 = 100;

/// Renders a value kept in hundredths with two decimals.
fn format_x100(value: u64) -> String {
    format!("{}.{:02}", value / HUNDREDTHS, value % HUNDREDTHS)
}

fn format_ms(duration: Duration) -> String {
    let ms_x100 = u64::try_from(duration.as_micros() / 10).unwrap_or(u64::MAX);
    format!("{} ms", format_x100(ms_x100))
}

/// Lines of the end-of-run summary. Throughput, response time and latency
/// are always present; `detailed` adds the load and error breakdown.
#[must_use]
pub fn summary_lines(metrics: &RunMetrics, detailed: bool) -> Vec<String> {
    let mut lines = vec![
        format!("Throughput: {} req/s", format_x100(metrics.throughput_x100)),
        format!("Response time: {}", format_ms(metrics.response_time)),
        format!("Latency: {}", format_ms(metrics.latency)),
    ];
    if let Some(reason) = metrics.stop_reason {
        lines.push(format!("Stopped early: {}", reason));
    }
    if !detailed {
        return lines;
    }

    lines.push(format!("Errors: {}", metrics.errors));
    lines.push(format!(
        "Resource utilization: {}%",
        format_x100(metrics.resource_utilization_x100)
    ));
    lines.push(format!("Concurrency: {}", format_x100(metrics.concurrency_x100)));
    lines.push(format!("Peak load: {}", metrics.peak_load));
    lines.push(format!("Downtime: {}", format_ms(metrics.downtime)));

    lines.push(format!(
        "Requests: {} issued of {} planned ({} successful) in {} by {} users",
        metrics.issued,
        metrics.planned_requests,
        metrics.successful,
        format_ms(metrics.duration),
        metrics.users
    ));
    lines.push(format!(
        "Response time percentiles: p50 {} | p90 {} | p99 {}",
        format_ms(metrics.p50),
        format_ms(metrics.p90),
        format_ms(metrics.p99)
    ));
    lines.push(format!(
        "Response time range: min {} | max {}",
        format_ms(metrics.min_response_time),
        format_ms(metrics.max_response_time)
    ));

    if !metrics.status_counts.is_empty() {
        let mut codes = String::from("Status codes:");
        for (status, count) in &metrics.status_counts {
            let _write_result = write!(codes, " {}={}", status, count);
        }
        lines.push(codes);
    }
    if metrics.errors > 0 {
        let failures = metrics.failures;
        lines.push(format!(
            "Failures: status {} | timeout {} | connect {} | transport {} | build {}",
            failures.status, failures.timeout, failures.connect, failures.transport, failures.build
        ));
    }
    lines
}

pub fn print_summary(metrics: &RunMetrics, detailed: bool) {
    for line in summary_lines(metrics, detailed) {
        println!("{}", line);
    }
}
