use std::sync::Arc;

use crate::error::{AppError, AppResult, EngineError};

use super::RequestSpec;
use super::source::RequestSource;

/// What the virtual users send.
#[derive(Debug, Clone)]
pub enum Workload {
    /// The same request, every time.
    Single(RequestSpec),
    /// Requests taken in order, wrapping around at the end.
    Collection(Vec<RequestSpec>),
}

impl Workload {
    /// A GET to `url`, repeated.
    #[must_use]
    pub fn url(url: impl Into<String>) -> Self {
        Workload::Single(RequestSpec::get(url))
    }
}

/// Inputs of a single run. Immutable once the run starts.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub users: usize,
    pub total_requests: u64,
    /// Stop starting requests once this many have failed.
    pub max_errors: Option<u64>,
    pub workload: Workload,
}

impl EngineConfig {
    #[must_use]
    pub const fn new(users: usize, total_requests: u64, workload: Workload) -> Self {
        Self {
            users,
            total_requests,
            max_errors: None,
            workload,
        }
    }

    #[must_use]
    pub const fn with_max_errors(mut self, max_errors: Option<u64>) -> Self {
        self.max_errors = max_errors;
        self
    }
}

#[derive(Debug)]
pub(super) struct WorkPlan {
    pub(super) source: Arc<RequestSource>,
    pub(super) shares: Vec<u64>,
}

pub(super) fn build_work_plan(config: &EngineConfig) -> AppResult<WorkPlan> {
    if config.users == 0 {
        return Err(AppError::engine(EngineError::InvalidConfig {
            reason: "users must be >= 1",
        }));
    }
    if config.total_requests == 0 {
        return Err(AppError::engine(EngineError::InvalidConfig {
            reason: "total requests must be >= 1",
        }));
    }

    let source = match &config.workload {
        Workload::Single(spec) => {
            if spec.url.trim().is_empty() {
                return Err(AppError::engine(EngineError::InvalidConfig {
                    reason: "neither a URL nor a collection was supplied",
                }));
            }
            RequestSource::Repeat(Arc::new(spec.clone()))
        }
        Workload::Collection(specs) => {
            if specs.is_empty() {
                return Err(AppError::engine(EngineError::EmptyCollection));
            }
            RequestSource::Cycle(Arc::from(specs.as_slice()))
        }
    };

    Ok(WorkPlan {
        source: Arc::new(source),
        shares: partition_requests(config.total_requests, config.users),
    })
}

/// Splits `total` requests across `users` workers as evenly as possible; the
/// first `total % users` workers take one extra. Shares always sum to
/// `total`.
#[must_use]
pub fn partition_requests(total: u64, users: usize) -> Vec<u64> {
    let Ok(users_u64) = u64::try_from(users) else {
        return Vec::new();
    };
    let Some(base) = total.checked_div(users_u64) else {
        return Vec::new();
    };
    let remainder = total.checked_rem(users_u64).unwrap_or(0);

    (0..users_u64)
        .map(|worker| {
            if worker < remainder {
                base.saturating_add(1)
            } else {
                base
            }
        })
        .collect()
}
