use super::finalize::{mean_duration, scaled_ratio};
use super::*;
use crate::engine::{RequestFailure, RequestOutcome};
use crate::error::{AppError, AppResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, advance};

fn run_paused_test<F>(future: F) -> AppResult<()>
where
    F: Future<Output = AppResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .map_err(|err| AppError::validation(format!("Failed to build runtime: {}", err)))?;
    runtime.block_on(future)
}

const fn ok() -> RequestOutcome {
    RequestOutcome::succeeded(Some(200))
}

const fn server_error() -> RequestOutcome {
    RequestOutcome::failed(RequestFailure::Status(500))
}

#[test]
fn downtime_counts_only_gaps_after_a_completion() -> AppResult<()> {
    run_paused_test(async {
        let start = Instant::now();
        let state = RunState::new(start, 10, None);

        let first = state
            .record_start()
            .ok_or_else(|| AppError::validation("Expected first ticket"))?;
        advance(Duration::from_millis(10)).await;
        state.record_end(first, &ok());

        advance(Duration::from_millis(5)).await;
        let second = state
            .record_start()
            .ok_or_else(|| AppError::validation("Expected second ticket"))?;
        advance(Duration::from_millis(10)).await;
        state.record_end(second, &ok());

        advance(Duration::from_millis(5)).await;
        let snapshot = state.snapshot(Instant::now());

        if snapshot.downtime != Duration::from_millis(10) {
            return Err(AppError::validation(format!(
                "Unexpected downtime: {:?}",
                snapshot.downtime
            )));
        }
        if snapshot.in_flight_area_ns != Duration::from_millis(20).as_nanos() {
            return Err(AppError::validation(format!(
                "Unexpected in-flight area: {}",
                snapshot.in_flight_area_ns
            )));
        }
        if snapshot.peak_in_flight != 1 {
            return Err(AppError::validation("Expected peak of 1"));
        }
        if snapshot.min_elapsed != Duration::from_millis(10)
            || snapshot.max_elapsed != Duration::from_millis(10)
        {
            return Err(AppError::validation("Unexpected min/max response time"));
        }
        Ok(())
    })
}

#[test]
fn overlapping_requests_raise_peak_and_area() -> AppResult<()> {
    run_paused_test(async {
        let start = Instant::now();
        let state = RunState::new(start, 10, None);

        let first = state
            .record_start()
            .ok_or_else(|| AppError::validation("Expected first ticket"))?;
        let second = state
            .record_start()
            .ok_or_else(|| AppError::validation("Expected second ticket"))?;
        advance(Duration::from_millis(10)).await;
        state.record_end(first, &ok());
        advance(Duration::from_millis(10)).await;
        state.record_end(second, &ok());

        let end = Instant::now();
        let snapshot = state.snapshot(end);
        if snapshot.peak_in_flight != 2 {
            return Err(AppError::validation("Expected peak of 2"));
        }
        // 2 in flight for 10ms, then 1 for 10ms.
        if snapshot.in_flight_area_ns != Duration::from_millis(30).as_nanos() {
            return Err(AppError::validation(format!(
                "Unexpected in-flight area: {}",
                snapshot.in_flight_area_ns
            )));
        }
        if snapshot.downtime != Duration::ZERO {
            return Err(AppError::validation("Expected no downtime"));
        }

        let metrics = finalize(snapshot, end.duration_since(start), 2, 10);
        if metrics.concurrency_x100 != 150 {
            return Err(AppError::validation(format!(
                "Unexpected concurrency: {}",
                metrics.concurrency_x100
            )));
        }
        if metrics.resource_utilization_x100 != 7500 {
            return Err(AppError::validation(format!(
                "Unexpected utilization: {}",
                metrics.resource_utilization_x100
            )));
        }
        if metrics.response_time != Duration::from_millis(15) {
            return Err(AppError::validation(format!(
                "Unexpected response time: {:?}",
                metrics.response_time
            )));
        }
        Ok(())
    })
}

#[test]
fn record_start_stops_at_planned_volume() -> AppResult<()> {
    run_paused_test(async {
        let state = RunState::new(Instant::now(), 2, None);
        let first = state
            .record_start()
            .ok_or_else(|| AppError::validation("Expected first ticket"))?;
        let second = state
            .record_start()
            .ok_or_else(|| AppError::validation("Expected second ticket"))?;
        if first.sequence() != 0 || second.sequence() != 1 {
            return Err(AppError::validation("Sequences must start at zero"));
        }
        if state.record_start().is_some() {
            return Err(AppError::validation("Expected no third ticket"));
        }
        state.record_end(first, &ok());
        state.record_end(second, &ok());
        if state.record_start().is_some() {
            return Err(AppError::validation("Finished requests must not free up volume"));
        }
        Ok(())
    })
}

#[test]
fn error_threshold_cancels_on_the_deciding_error() -> AppResult<()> {
    run_paused_test(async {
        let state = RunState::new(Instant::now(), 100, Some(2));
        let mut cancel_rx = state.subscribe_cancellation();

        for _ in 0..2 {
            if state.should_stop() {
                return Err(AppError::validation("Cancelled too early"));
            }
            let ticket = state
                .record_start()
                .ok_or_else(|| AppError::validation("Expected ticket"))?;
            state.record_end(ticket, &server_error());
        }

        if !state.should_stop() {
            return Err(AppError::validation("Expected cancellation"));
        }
        if state.record_start().is_some() {
            return Err(AppError::validation("No request may start after cancellation"));
        }
        let reason = *cancel_rx
            .wait_for(Option::is_some)
            .await
            .map_err(|err| AppError::validation(format!("Watch closed: {}", err)))?;
        if reason != Some(StopReason::ErrorThreshold { max_errors: 2 }) {
            return Err(AppError::validation("Unexpected stop reason"));
        }

        let snapshot = state.snapshot(Instant::now());
        if snapshot.errors != 2 || snapshot.failures.status != 2 {
            return Err(AppError::validation("Expected two status failures"));
        }
        if snapshot.status_counts.get(&500).copied() != Some(2) {
            return Err(AppError::validation("Expected two 500 responses"));
        }
        Ok(())
    })
}

#[test]
fn zero_error_budget_stops_on_first_error_only() -> AppResult<()> {
    run_paused_test(async {
        let state = RunState::new(Instant::now(), 10, Some(0));
        let ticket = state
            .record_start()
            .ok_or_else(|| AppError::validation("Expected ticket"))?;
        state.record_end(ticket, &ok());
        if state.should_stop() {
            return Err(AppError::validation("Success must not trip a zero budget"));
        }
        let ticket = state
            .record_start()
            .ok_or_else(|| AppError::validation("Expected ticket"))?;
        state.record_end(ticket, &RequestOutcome::failed(RequestFailure::Timeout));
        if !state.should_stop() {
            return Err(AppError::validation("First error must stop the run"));
        }
        Ok(())
    })
}

#[test]
fn cancellation_is_idempotent() -> AppResult<()> {
    run_paused_test(async {
        let state = RunState::new(Instant::now(), 10, None);
        if !state.request_cancellation(StopReason::Interrupted) {
            return Err(AppError::validation("First cancellation must win"));
        }
        if state.request_cancellation(StopReason::ErrorThreshold { max_errors: 1 }) {
            return Err(AppError::validation("Second cancellation must be ignored"));
        }
        let snapshot = state.snapshot(Instant::now());
        if snapshot.stop_reason != Some(StopReason::Interrupted) {
            return Err(AppError::validation("First reason must be kept"));
        }
        Ok(())
    })
}

#[test]
fn latency_prefers_first_byte_when_reported() -> AppResult<()> {
    run_paused_test(async {
        let start = Instant::now();
        let state = RunState::new(start, 1, None);
        let ticket = state
            .record_start()
            .ok_or_else(|| AppError::validation("Expected ticket"))?;
        advance(Duration::from_millis(40)).await;
        state.record_end(ticket, &ok().with_first_byte(Duration::from_millis(15)));

        let end = Instant::now();
        let metrics = finalize(state.snapshot(end), end.duration_since(start), 1, 1);
        if metrics.latency != Duration::from_millis(15) {
            return Err(AppError::validation(format!(
                "Unexpected latency: {:?}",
                metrics.latency
            )));
        }
        if metrics.response_time != Duration::from_millis(40) {
            return Err(AppError::validation(format!(
                "Unexpected response time: {:?}",
                metrics.response_time
            )));
        }
        Ok(())
    })
}

#[test]
fn finalize_without_requests_reports_zeros() -> AppResult<()> {
    run_paused_test(async {
        let start = Instant::now();
        let state = RunState::new(start, 5, None);
        let metrics = finalize(state.snapshot(start), Duration::ZERO, 3, 5);
        if metrics.issued != 0 || metrics.response_time != Duration::ZERO {
            return Err(AppError::validation("Expected zero totals"));
        }
        if metrics.throughput_x100 != 0 || metrics.concurrency_x100 != 0 {
            return Err(AppError::validation("Expected zero rates"));
        }
        if metrics.p99 != Duration::ZERO || metrics.downtime != Duration::ZERO {
            return Err(AppError::validation("Expected zero percentiles"));
        }
        if metrics.stopped_early() {
            return Err(AppError::validation("Expected no stop reason"));
        }
        Ok(())
    })
}

#[test]
fn mean_duration_handles_zero_count() -> AppResult<()> {
    if mean_duration(Duration::from_secs(3), 0) != Duration::ZERO {
        return Err(AppError::validation("Zero count must give zero"));
    }
    if mean_duration(Duration::from_millis(300), 3) != Duration::from_millis(100) {
        return Err(AppError::validation("Unexpected mean"));
    }
    Ok(())
}

#[test]
fn scaled_ratio_keeps_two_decimals() -> AppResult<()> {
    // 7 requests over 3s: 2.33 req/s.
    let throughput = scaled_ratio(7, 100_000_000_000, Duration::from_secs(3).as_nanos());
    if throughput != 233 {
        return Err(AppError::validation(format!(
            "Unexpected throughput: {}",
            throughput
        )));
    }
    if scaled_ratio(5, 100, 0) != 0 {
        return Err(AppError::validation("Zero denominator must give zero"));
    }
    if scaled_ratio(u128::MAX, 100, 1) != u64::MAX {
        return Err(AppError::validation("Overflow must saturate"));
    }
    Ok(())
}

#[test]
fn histogram_percentiles_are_ordered() -> AppResult<()> {
    let mut histogram = LatencyHistogram::new().map_err(AppError::validation)?;
    if histogram.percentiles() != (0, 0, 0) {
        return Err(AppError::validation("Empty histogram must report zeros"));
    }
    for value in 1..=1000_u64 {
        histogram.record(value).map_err(AppError::validation)?;
    }
    let (p50, p90, p99) = histogram.percentiles();
    if !(p50 <= p90 && p90 <= p99) {
        return Err(AppError::validation("Percentiles must be ordered"));
    }
    if !(495..=505).contains(&p50) || !(985..=995).contains(&p99) {
        return Err(AppError::validation(format!(
            "Unexpected percentiles: {} {} {}",
            p50, p90, p99
        )));
    }
    if histogram.count() != 1000 {
        return Err(AppError::validation("Expected 1000 samples"));
    }
    Ok(())
}
