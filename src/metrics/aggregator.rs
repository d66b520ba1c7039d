use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::engine::RequestOutcome;

use super::histogram::LatencyHistogram;
use super::types::{FailureCounts, StopReason};

/// Proof that a request entered flight; handed back to
/// [`RunState::record_end`] when it leaves.
#[derive(Debug, Clone, Copy)]
#[must_use = "a ticket that is never recorded leaves the request in flight"]
pub struct Ticket {
    sequence: u64,
    started: Instant,
}

impl Ticket {
    /// Run-wide, zero-based position of this request.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }
}

/// Shared state of one run.
///
/// Every counter lives behind a single lock so that the in-flight count, the
/// downtime gaps and the issued totals are always observed together. The
/// cancellation flag is readable without the lock.
#[derive(Debug)]
pub struct RunState {
    counters: Mutex<Counters>,
    cancelled: AtomicBool,
    cancel_tx: watch::Sender<Option<StopReason>>,
    total_requests: u64,
    max_errors: Option<u64>,
}

#[derive(Debug)]
struct Counters {
    next_sequence: u64,
    issued: u64,
    successful: u64,
    errors: u64,
    elapsed_sum: Duration,
    latency_sum: Duration,
    min_elapsed: Option<Duration>,
    max_elapsed: Duration,
    in_flight: u64,
    peak_in_flight: u64,
    in_flight_area_ns: u128,
    last_transition: Instant,
    gap_started: Option<Instant>,
    downtime: Duration,
    status_counts: BTreeMap<u16, u64>,
    failures: FailureCounts,
    histogram: Option<LatencyHistogram>,
    stop_reason: Option<StopReason>,
}

impl Counters {
    /// Accumulates in-flight time up to `now`. An instant older than the last
    /// transition leaves the clock where it is.
    fn advance_clock(&mut self, now: Instant) {
        if now <= self.last_transition {
            return;
        }
        let span = now.saturating_duration_since(self.last_transition);
        let weighted = span.as_nanos().saturating_mul(u128::from(self.in_flight));
        self.in_flight_area_ns = self.in_flight_area_ns.saturating_add(weighted);
        self.last_transition = now;
    }

    fn close_gap(&mut self, now: Instant) {
        if let Some(gap_started) = self.gap_started.take() {
            self.downtime = self
                .downtime
                .saturating_add(now.saturating_duration_since(gap_started));
        }
    }
}

/// Raw totals read once all workers have stopped.
#[derive(Debug, Clone)]
pub struct RunSnapshot {
    pub issued: u64,
    pub successful: u64,
    pub errors: u64,
    pub elapsed_sum: Duration,
    pub latency_sum: Duration,
    pub min_elapsed: Duration,
    pub max_elapsed: Duration,
    pub percentiles_us: (u64, u64, u64),
    pub peak_in_flight: u64,
    pub in_flight_area_ns: u128,
    pub downtime: Duration,
    pub status_counts: BTreeMap<u16, u64>,
    pub failures: FailureCounts,
    pub stop_reason: Option<StopReason>,
}

impl RunState {
    #[must_use]
    pub fn new(run_start: Instant, total_requests: u64, max_errors: Option<u64>) -> Self {
        let histogram = match LatencyHistogram::new() {
            Ok(histogram) => Some(histogram),
            Err(err) => {
                tracing::warn!("Failed to initialize latency histogram: {}", err);
                None
            }
        };
        let (cancel_tx, _) = watch::channel(None);

        Self {
            counters: Mutex::new(Counters {
                next_sequence: 0,
                issued: 0,
                successful: 0,
                errors: 0,
                elapsed_sum: Duration::ZERO,
                latency_sum: Duration::ZERO,
                min_elapsed: None,
                max_elapsed: Duration::ZERO,
                in_flight: 0,
                peak_in_flight: 0,
                in_flight_area_ns: 0,
                last_transition: run_start,
                gap_started: None,
                downtime: Duration::ZERO,
                status_counts: BTreeMap::new(),
                failures: FailureCounts::default(),
                histogram,
                stop_reason: None,
            }),
            cancelled: AtomicBool::new(false),
            cancel_tx,
            total_requests,
            max_errors,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Counters> {
        self.counters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks a request as in flight and assigns it the next run-wide
    /// sequence number.
    ///
    /// Returns `None` once the run is cancelled or the planned volume has
    /// been handed out.
    #[must_use]
    pub fn record_start(&self) -> Option<Ticket> {
        let mut counters = self.lock();
        let now = Instant::now();
        if self.should_stop() || counters.next_sequence >= self.total_requests {
            return None;
        }

        counters.advance_clock(now);
        if counters.in_flight == 0 {
            counters.close_gap(now);
        }
        counters.in_flight = counters.in_flight.saturating_add(1);
        counters.peak_in_flight = counters.peak_in_flight.max(counters.in_flight);

        let sequence = counters.next_sequence;
        counters.next_sequence = sequence.saturating_add(1);

        Some(Ticket {
            sequence,
            started: now,
        })
    }

    /// Takes a request out of flight and folds its outcome into the totals.
    ///
    /// Reaching the error budget cancels the run under the same lock, so no
    /// request can start between the deciding error and the flag.
    pub fn record_end(&self, ticket: Ticket, outcome: &RequestOutcome) {
        let mut counters = self.lock();
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(ticket.started);

        counters.advance_clock(now);
        counters.in_flight = counters.in_flight.saturating_sub(1);
        if counters.in_flight == 0 {
            counters.gap_started = Some(now);
        }

        counters.issued = counters.issued.saturating_add(1);
        counters.elapsed_sum = counters.elapsed_sum.saturating_add(elapsed);
        let latency = outcome.first_byte.map_or(elapsed, |first| first.min(elapsed));
        counters.latency_sum = counters.latency_sum.saturating_add(latency);
        counters.min_elapsed = Some(
            counters
                .min_elapsed
                .map_or(elapsed, |current| current.min(elapsed)),
        );
        counters.max_elapsed = counters.max_elapsed.max(elapsed);
        if let Some(histogram) = counters.histogram.as_mut() {
            let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
            if let Err(err) = histogram.record(micros) {
                tracing::debug!("{}", err);
            }
        }
        if let Some(status) = outcome.status {
            let count = counters.status_counts.entry(status).or_insert(0);
            *count = count.saturating_add(1);
        }

        let mut tripped = None;
        match outcome.failure.as_ref() {
            None => {
                counters.successful = counters.successful.saturating_add(1);
            }
            Some(failure) => {
                counters.errors = counters.errors.saturating_add(1);
                counters.failures.record(failure.kind());
                if let Some(max_errors) = self.max_errors
                    && counters.errors >= max_errors
                    && !self.cancelled.swap(true, Ordering::SeqCst)
                {
                    let reason = StopReason::ErrorThreshold { max_errors };
                    counters.stop_reason = Some(reason);
                    tripped = Some(reason);
                }
            }
        }
        drop(counters);

        if let Some(reason) = tripped {
            self.cancel_tx.send_replace(Some(reason));
        }
    }

    /// Whether workers must stop starting new requests.
    #[must_use]
    pub fn should_stop(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Cancels the run. Only the first call has an effect; returns whether
    /// this call was it.
    #[must_use]
    pub fn request_cancellation(&self, reason: StopReason) -> bool {
        let mut counters = self.lock();
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return false;
        }
        counters.stop_reason = Some(reason);
        drop(counters);
        self.cancel_tx.send_replace(Some(reason));
        true
    }

    /// Resolves once the run has been cancelled, with the reason.
    #[must_use]
    pub fn subscribe_cancellation(&self) -> watch::Receiver<Option<StopReason>> {
        self.cancel_tx.subscribe()
    }

    /// Reads the totals at `run_end`, closing a downtime gap left open by the
    /// last request to finish.
    #[must_use]
    pub fn snapshot(&self, run_end: Instant) -> RunSnapshot {
        let mut counters = self.lock();
        counters.advance_clock(run_end);
        if counters.in_flight == 0 {
            counters.close_gap(run_end);
        }
        let percentiles_us = counters
            .histogram
            .as_ref()
            .map_or((0, 0, 0), LatencyHistogram::percentiles);

        RunSnapshot {
            issued: counters.issued,
            successful: counters.successful,
            errors: counters.errors,
            elapsed_sum: counters.elapsed_sum,
            latency_sum: counters.latency_sum,
            min_elapsed: counters.min_elapsed.unwrap_or(Duration::ZERO),
            max_elapsed: counters.max_elapsed,
            percentiles_us,
            peak_in_flight: counters.peak_in_flight,
            in_flight_area_ns: counters.in_flight_area_ns,
            downtime: counters.downtime,
            status_counts: counters.status_counts.clone(),
            failures: counters.failures,
            stop_reason: counters.stop_reason,
        }
    }
}
