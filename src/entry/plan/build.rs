use std::path::Path;

use clap::ArgMatches;
use tracing::{info, warn};

use crate::args::TesterArgs;
use crate::collection::load_collection;
use crate::config::{apply_config, load_config};
use crate::engine::{EngineConfig, RequestSpec, Workload};
use crate::error::{AppError, AppResult, ValidationError};
use crate::http::{HttpSettings, parse_target_url};

use super::types::RunPlan;

pub(crate) fn build_plan(mut args: TesterArgs, matches: &ArgMatches) -> AppResult<RunPlan> {
    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, matches, &config)?;
    }

    let workload = resolve_workload(&args)?;
    let engine = EngineConfig::new(args.users.get(), args.requests.get(), workload)
        .with_max_errors(args.error_budget());

    Ok(RunPlan {
        engine,
        http: HttpSettings {
            request_timeout: args.request_timeout,
            connect_timeout: args.connect_timeout,
            expected_status: args.expected_status,
        },
        detailed: args.detailed,
        export_json: args.export_json,
    })
}

fn resolve_workload(args: &TesterArgs) -> AppResult<Workload> {
    if let Some(path) = args.collection.as_deref() {
        if args.url.is_some() {
            warn!("Both a collection and a URL were given; using the collection.");
        }
        let collection = load_collection(Path::new(path))?;
        info!(
            "Using collection {} ({} requests).",
            collection.name.as_deref().unwrap_or(path),
            collection.requests.len()
        );
        let requests = collection
            .requests
            .into_iter()
            .map(|spec| with_default_headers(spec, &args.headers))
            .collect();
        return Ok(Workload::Collection(requests));
    }

    let Some(url) = args.url.as_deref() else {
        return Err(AppError::validation(ValidationError::MissingTarget));
    };
    let url = parse_target_url(url)?;

    let mut spec = RequestSpec::get(url.as_str()).with_method(args.method.to_method());
    for (name, value) in &args.headers {
        spec = spec.with_header(name, value.as_str());
    }
    if let Some(data) = args.data.as_ref() {
        spec = spec.with_body(data.as_str());
    }
    Ok(Workload::Single(spec))
}

/// Adds CLI headers to a collection request that does not set them itself.
fn with_default_headers(mut spec: RequestSpec, headers: &[(String, String)]) -> RequestSpec {
    for (name, value) in headers {
        spec.headers
            .entry(name.to_ascii_lowercase())
            .or_insert_with(|| value.clone());
    }
    spec
}
