use std::sync::Arc;

use tracing::{debug, trace};

use crate::metrics::RunState;

use super::source::RequestSource;
use super::{RequestExecutor, RequestFailure, RequestOutcome};

pub(super) struct WorkerContext {
    pub(super) id: usize,
    pub(super) share: u64,
    pub(super) state: Arc<RunState>,
    pub(super) source: Arc<RequestSource>,
    pub(super) executor: Arc<dyn RequestExecutor>,
}

/// One virtual user: issues up to `share` requests, one at a time, checking
/// for cancellation before each. Returns how many it issued.
pub(super) async fn run_worker(context: WorkerContext) -> u64 {
    let WorkerContext {
        id,
        share,
        state,
        source,
        executor,
    } = context;
    let mut issued: u64 = 0;

    while issued < share {
        if state.should_stop() {
            debug!("Worker {} observed cancellation after {} requests.", id, issued);
            break;
        }
        let Some(ticket) = state.record_start() else {
            break;
        };

        let outcome = match source.spec_for(ticket.sequence()) {
            Some(spec) => {
                let outcome = executor.execute(spec).await;
                if let Some(failure) = outcome.failure.as_ref() {
                    trace!("Worker {} request {} failed: {}", id, spec, failure);
                }
                outcome
            }
            None => RequestOutcome::failed(RequestFailure::Build(format!(
                "no request for sequence {}",
                ticket.sequence()
            ))),
        };
        state.record_end(ticket, &outcome);
        issued = issued.saturating_add(1);
    }

    debug!("Worker {} finished ({} of {} requests).", id, issued, share);
    issued
}
