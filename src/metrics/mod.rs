//! Run-wide aggregation of request outcomes and the final metrics summary.
mod aggregator;
mod finalize;
mod histogram;
mod types;

#[cfg(test)]
mod tests;

pub use aggregator::{RunSnapshot, RunState, Ticket};
pub use finalize::finalize;
pub use histogram::LatencyHistogram;
pub use types::{FailureCounts, RunMetrics, StopReason};
