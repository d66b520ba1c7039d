use std::sync::Arc;

use futures_util::future::join_all;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult, EngineError};
use crate::metrics::{RunMetrics, RunState, StopReason, finalize};
use crate::shutdown::ShutdownSender;

use super::RequestExecutor;
use super::plan::{EngineConfig, build_work_plan};
use super::worker::{WorkerContext, run_worker};

/// Runs a load test to completion and returns its metrics.
///
/// # Errors
///
/// Returns `InvalidConfig` for zero users, zero requests or a missing target,
/// and `EmptyCollection` for a collection without entries. Both are raised
/// before any request is sent. Failing requests never produce an error.
pub async fn execute(
    config: &EngineConfig,
    executor: Arc<dyn RequestExecutor>,
) -> AppResult<RunMetrics> {
    run(config, executor, None).await
}

/// Like [`execute`], but a message on `shutdown_tx` cancels the run
/// gracefully: in-flight requests finish and metrics are still produced.
///
/// # Errors
///
/// Same as [`execute`].
pub async fn execute_until_shutdown(
    config: &EngineConfig,
    executor: Arc<dyn RequestExecutor>,
    shutdown_tx: &ShutdownSender,
) -> AppResult<RunMetrics> {
    run(config, executor, Some(shutdown_tx)).await
}

async fn run(
    config: &EngineConfig,
    executor: Arc<dyn RequestExecutor>,
    shutdown_tx: Option<&ShutdownSender>,
) -> AppResult<RunMetrics> {
    let plan = build_work_plan(config)?;
    info!(
        "Starting run: {} users, {} requests, {} distinct request(s), max errors {}.",
        config.users,
        config.total_requests,
        plan.source.len(),
        config
            .max_errors
            .map_or_else(|| "unlimited".to_owned(), |max| max.to_string())
    );

    let run_start = Instant::now();
    let state = Arc::new(RunState::new(
        run_start,
        config.total_requests,
        config.max_errors,
    ));
    let monitor = spawn_monitor(&state, shutdown_tx);

    let handles: Vec<_> = plan
        .shares
        .iter()
        .zip(std::iter::repeat_n(executor, plan.shares.len()))
        .enumerate()
        .map(|(id, (&share, executor))| {
            tokio::spawn(run_worker(WorkerContext {
                id,
                share,
                state: Arc::clone(&state),
                source: Arc::clone(&plan.source),
                executor,
            }))
        })
        .collect();

    let mut join_error = None;
    for (worker, result) in join_all(handles).await.into_iter().enumerate() {
        if let Err(source) = result
            && join_error.is_none()
        {
            join_error = Some(EngineError::WorkerJoin { worker, source });
        }
    }
    let run_end = Instant::now();
    monitor.abort();

    if let Some(err) = join_error {
        return Err(AppError::engine(err));
    }

    let wall_clock = run_end.saturating_duration_since(run_start);
    let metrics = finalize(
        state.snapshot(run_end),
        wall_clock,
        config.users,
        config.total_requests,
    );
    info!(
        "Run finished: {} of {} requests issued, {} errors, {}ms.",
        metrics.issued,
        metrics.planned_requests,
        metrics.errors,
        wall_clock.as_millis()
    );
    Ok(metrics)
}

/// Logs the moment a run is cancelled and turns an external shutdown into a
/// cooperative cancellation.
fn spawn_monitor(
    state: &Arc<RunState>,
    shutdown_tx: Option<&ShutdownSender>,
) -> tokio::task::JoinHandle<()> {
    let state = Arc::clone(state);
    let mut cancel_rx = state.subscribe_cancellation();
    let mut shutdown_rx = shutdown_tx.map(ShutdownSender::subscribe);

    tokio::spawn(async move {
        let interrupted = async {
            match shutdown_rx.as_mut() {
                Some(shutdown_rx) => {
                    drop(shutdown_rx.recv().await);
                }
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            reason = cancel_rx.wait_for(Option::is_some) => {
                if let Ok(reason) = reason
                    && let Some(reason) = *reason
                {
                    warn!("Stopping early: {}. Waiting for in-flight requests.", reason);
                }
            }
            () = interrupted => {
                if state.request_cancellation(StopReason::Interrupted) {
                    warn!("Interrupted. Waiting for in-flight requests.");
                } else {
                    debug!("Shutdown received after the run was already cancelled.");
                }
            }
        }
    })
}
