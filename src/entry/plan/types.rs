use crate::engine::EngineConfig;
use crate::http::HttpSettings;

/// Everything a run needs once CLI and config are merged.
#[derive(Debug, Clone)]
pub(crate) struct RunPlan {
    pub(crate) engine: EngineConfig,
    pub(crate) http: HttpSettings,
    pub(crate) detailed: bool,
    pub(crate) export_json: Option<String>,
}
