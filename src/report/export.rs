use tokio::io::{AsyncWriteExt, BufWriter};

use crate::metrics::RunMetrics;

fn as_us(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

/// The metrics document written by [`export_json`].
#[must_use]
pub fn metrics_json(metrics: &RunMetrics) -> serde_json::Value {
    let status_counts: serde_json::Map<String, serde_json::Value> = metrics
        .status_counts
        .iter()
        .map(|(status, count)| (status.to_string(), serde_json::Value::from(*count)))
        .collect();
    let failures = metrics.failures;

    serde_json::json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "users": metrics.users,
        "planned_requests": metrics.planned_requests,
        "issued": metrics.issued,
        "successful": metrics.successful,
        "errors": metrics.errors,
        "duration_us": as_us(metrics.duration),
        "throughput_rps_x100": metrics.throughput_x100,
        "response_time_us": as_us(metrics.response_time),
        "latency_us": as_us(metrics.latency),
        "min_response_time_us": as_us(metrics.min_response_time),
        "max_response_time_us": as_us(metrics.max_response_time),
        "p50_us": as_us(metrics.p50),
        "p90_us": as_us(metrics.p90),
        "p99_us": as_us(metrics.p99),
        "concurrency_x100": metrics.concurrency_x100,
        "resource_utilization_pct_x100": metrics.resource_utilization_x100,
        "peak_load": metrics.peak_load,
        "downtime_us": as_us(metrics.downtime),
        "status_counts": status_counts,
        "failures": {
            "status": failures.status,
            "timeout": failures.timeout,
            "connect": failures.connect,
            "transport": failures.transport,
            "build": failures.build
        },
        "stop_reason": metrics.stop_reason.map(|reason| reason.as_str())
    })
}

/// Writes the metrics of a finished run to `path` as pretty JSON.
///
/// # Errors
///
/// Returns an error when the file cannot be created or written.
pub async fn export_json(path: &str, metrics: &RunMetrics) -> Result<(), std::io::Error> {
    let file = tokio::fs::File::create(path).await?;
    let mut writer = BufWriter::new(file);
    let json = serde_json::to_vec_pretty(&metrics_json(metrics)).map_err(std::io::Error::other)?;
    writer.write_all(&json).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}
