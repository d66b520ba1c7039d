use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::engine::FailureKind;

/// Why a run ended before issuing its full request volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Cumulative errors reached the configured maximum.
    ErrorThreshold { max_errors: u64 },
    /// Ctrl+C or SIGTERM.
    Interrupted,
}

impl StopReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            StopReason::ErrorThreshold { .. } => "error-threshold",
            StopReason::Interrupted => "interrupted",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::ErrorThreshold { max_errors } => {
                write!(f, "error threshold reached ({} errors)", max_errors)
            }
            StopReason::Interrupted => write!(f, "interrupted"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FailureCounts {
    pub status: u64,
    pub timeout: u64,
    pub connect: u64,
    pub transport: u64,
    pub build: u64,
}

impl FailureCounts {
    pub(crate) fn record(&mut self, kind: FailureKind) {
        let slot = match kind {
            FailureKind::Status => &mut self.status,
            FailureKind::Timeout => &mut self.timeout,
            FailureKind::Connect => &mut self.connect,
            FailureKind::Transport => &mut self.transport,
            FailureKind::Build => &mut self.build,
        };
        *slot = slot.saturating_add(1);
    }
}

/// Summary of one completed run.
#[derive(Debug, Clone)]
pub struct RunMetrics {
    /// Wall-clock time from scheduler start to the last worker finishing.
    pub duration: Duration,
    pub users: usize,
    pub planned_requests: u64,
    pub issued: u64,
    pub successful: u64,
    pub errors: u64,
    /// Requests per second over `duration`, in hundredths.
    pub throughput_x100: u64,
    /// Mean time a request spent in flight.
    pub response_time: Duration,
    /// Mean time to first byte where the executor reports it, otherwise the
    /// in-flight time.
    pub latency: Duration,
    pub min_response_time: Duration,
    pub max_response_time: Duration,
    pub p50: Duration,
    pub p90: Duration,
    pub p99: Duration,
    /// Time-weighted average of requests in flight, in hundredths.
    pub concurrency_x100: u64,
    /// `100 * concurrency / users` in hundredths of a percent. Not clamped.
    pub resource_utilization_x100: u64,
    pub peak_load: u64,
    /// Time with nothing in flight after the first request started,
    /// including the stretch between the final completion and the run end.
    pub downtime: Duration,
    pub status_counts: BTreeMap<u16, u64>,
    pub failures: FailureCounts,
    pub stop_reason: Option<StopReason>,
}

impl RunMetrics {
    #[must_use]
    pub const fn stopped_early(&self) -> bool {
        self.stop_reason.is_some()
    }
}
