use std::time::Duration;

use super::aggregator::RunSnapshot;
use super::types::RunMetrics;

const NANOS_PER_SEC_X100: u128 = 100_000_000_000;

/// Turns the raw totals of a finished run into its reported metrics.
#[must_use]
pub fn finalize(
    snapshot: RunSnapshot,
    wall_clock: Duration,
    users: usize,
    planned_requests: u64,
) -> RunMetrics {
    let wall_ns = wall_clock.as_nanos();
    let throughput_x100 = scaled_ratio(u128::from(snapshot.issued), NANOS_PER_SEC_X100, wall_ns);
    let concurrency_x100 = scaled_ratio(snapshot.in_flight_area_ns, 100, wall_ns);
    let resource_utilization_x100 = scaled_ratio(
        u128::from(concurrency_x100),
        100,
        u128::try_from(users).unwrap_or(u128::MAX),
    );

    let (p50, p90, p99) = snapshot.percentiles_us;

    RunMetrics {
        duration: wall_clock,
        users,
        planned_requests,
        issued: snapshot.issued,
        successful: snapshot.successful,
        errors: snapshot.errors,
        throughput_x100,
        response_time: mean_duration(snapshot.elapsed_sum, snapshot.issued),
        latency: mean_duration(snapshot.latency_sum, snapshot.issued),
        min_response_time: snapshot.min_elapsed,
        max_response_time: snapshot.max_elapsed,
        p50: Duration::from_micros(p50),
        p90: Duration::from_micros(p90),
        p99: Duration::from_micros(p99),
        concurrency_x100,
        resource_utilization_x100,
        peak_load: snapshot.peak_in_flight,
        downtime: snapshot.downtime,
        status_counts: snapshot.status_counts,
        failures: snapshot.failures,
        stop_reason: snapshot.stop_reason,
    }
}

pub(super) fn mean_duration(sum: Duration, count: u64) -> Duration {
    let Some(mean_ns) = sum.as_nanos().checked_div(u128::from(count)) else {
        return Duration::ZERO;
    };
    Duration::from_nanos(u64::try_from(mean_ns).unwrap_or(u64::MAX))
}

/// `numerator * scale / denominator` in integers; zero when the denominator
/// is zero.
pub(super) fn scaled_ratio(numerator: u128, scale: u128, denominator: u128) -> u64 {
    let scaled = numerator
        .saturating_mul(scale)
        .checked_div(denominator)
        .unwrap_or(0);
    u64::try_from(scaled).map_or(u64::MAX, |value| value)
}
