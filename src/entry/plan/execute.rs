use std::sync::Arc;

use tracing::info;

use crate::engine::{RequestExecutor, execute_until_shutdown};
use crate::error::AppResult;
use crate::http::HttpExecutor;
use crate::report::{export_json, print_summary};
use crate::system::shutdown_handlers::{setup_signal_shutdown_handler, shutdown_channel};

use super::types::RunPlan;

pub(crate) async fn execute_plan(plan: &RunPlan) -> AppResult<()> {
    let executor: Arc<dyn RequestExecutor> = Arc::new(HttpExecutor::new(&plan.http)?);

    let (shutdown_tx, _shutdown_rx) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);

    let result = execute_until_shutdown(&plan.engine, executor, &shutdown_tx).await;
    signal_handle.abort();
    let metrics = result?;

    print_summary(&metrics, plan.detailed);

    if let Some(path) = plan.export_json.as_deref() {
        export_json(path, &metrics).await?;
        info!("Metrics written to {}.", path);
    }
    Ok(())
}
