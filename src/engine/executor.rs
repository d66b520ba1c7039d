use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use super::RequestSpec;

/// Why a single request counted as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestFailure {
    /// A response arrived with a status the run does not accept.
    Status(u16),
    Timeout,
    Connect(String),
    Transport(String),
    /// The spec could not be turned into a request at all.
    Build(String),
}

impl RequestFailure {
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            RequestFailure::Status(_) => FailureKind::Status,
            RequestFailure::Timeout => FailureKind::Timeout,
            RequestFailure::Connect(_) => FailureKind::Connect,
            RequestFailure::Transport(_) => FailureKind::Transport,
            RequestFailure::Build(_) => FailureKind::Build,
        }
    }
}

impl fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestFailure::Status(status) => write!(f, "unexpected status {}", status),
            RequestFailure::Timeout => write!(f, "timed out"),
            RequestFailure::Connect(message) => write!(f, "connect failed: {}", message),
            RequestFailure::Transport(message) => write!(f, "transport error: {}", message),
            RequestFailure::Build(message) => write!(f, "invalid request: {}", message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Status,
    Timeout,
    Connect,
    Transport,
    Build,
}

/// What a [`RequestExecutor`] reports for one call.
///
/// The time a request spends in flight is measured by the engine around the
/// `execute` call, so every executor is timed the same way. Executors that
/// can observe a narrower span (time to response headers) report it in
/// `first_byte`; the run's latency figure then uses that span instead of the
/// full in-flight time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOutcome {
    pub status: Option<u16>,
    pub first_byte: Option<Duration>,
    pub failure: Option<RequestFailure>,
}

impl RequestOutcome {
    #[must_use]
    pub const fn succeeded(status: Option<u16>) -> Self {
        Self {
            status,
            first_byte: None,
            failure: None,
        }
    }

    #[must_use]
    pub const fn failed(failure: RequestFailure) -> Self {
        let status = match failure {
            RequestFailure::Status(status) => Some(status),
            RequestFailure::Timeout
            | RequestFailure::Connect(_)
            | RequestFailure::Transport(_)
            | RequestFailure::Build(_) => None,
        };
        Self {
            status,
            first_byte: None,
            failure: Some(failure),
        }
    }

    #[must_use]
    pub const fn with_first_byte(mut self, first_byte: Duration) -> Self {
        self.first_byte = Some(first_byte);
        self
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Performs a single request on behalf of a virtual user.
///
/// Implementations are shared by every worker of a run and must tolerate
/// concurrent calls. Failures of any kind (transport errors, timeouts,
/// unexpected statuses) are reported through [`RequestOutcome::failed`] and
/// never abort the run. Per-request timeouts are the executor's job.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(&self, spec: &RequestSpec) -> RequestOutcome;
}
