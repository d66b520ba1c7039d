use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tokio::time::Instant;
use tracing::debug;

use crate::engine::{RequestExecutor, RequestFailure, RequestOutcome, RequestSpec};
use crate::error::AppResult;

use super::client::{HttpSettings, build_client};

/// Sends [`RequestSpec`]s over HTTP and classifies the result.
///
/// A response counts as a success when its status matches the expected one
/// (any 2xx when none is configured) and its body could be read to the end.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: Client,
    expected_status: Option<u16>,
}

impl HttpExecutor {
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(settings: &HttpSettings) -> AppResult<Self> {
        Ok(Self::with_client(build_client(settings)?, settings.expected_status))
    }

    #[must_use]
    pub const fn with_client(client: Client, expected_status: Option<u16>) -> Self {
        Self {
            client,
            expected_status,
        }
    }

    fn status_ok(&self, status: reqwest::StatusCode) -> bool {
        self.expected_status
            .map_or_else(|| status.is_success(), |expected| status.as_u16() == expected)
    }

    fn build_request(&self, spec: &RequestSpec) -> Result<reqwest::Request, RequestFailure> {
        let mut headers = HeaderMap::with_capacity(spec.headers.len());
        for (name, value) in &spec.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|err| RequestFailure::Build(format!("header '{}': {}", name, err)))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|err| RequestFailure::Build(format!("header '{}': {}", name, err)))?;
            headers.insert(header_name, header_value);
        }

        let mut builder = self
            .client
            .request(spec.method.clone(), spec.url.as_str())
            .headers(headers);
        if let Some(body) = spec.body.as_ref() {
            builder = builder.body(body.clone());
        }
        builder
            .build()
            .map_err(|err| RequestFailure::Build(err.to_string()))
    }
}

#[async_trait]
impl RequestExecutor for HttpExecutor {
    async fn execute(&self, spec: &RequestSpec) -> RequestOutcome {
        let request = match self.build_request(spec) {
            Ok(request) => request,
            Err(failure) => return RequestOutcome::failed(failure),
        };

        let sent = Instant::now();
        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                debug!("Request to {} failed: {}", spec, err);
                return RequestOutcome::failed(classify_error(&err));
            }
        };
        let first_byte = sent.elapsed();
        let status = response.status();

        let drained = drain_response_body(response).await;
        let failure = match drained {
            Err(err) => Some(classify_error(&err)),
            Ok(_) if !self.status_ok(status) => Some(RequestFailure::Status(status.as_u16())),
            Ok(_) => None,
        };

        RequestOutcome {
            status: Some(status.as_u16()),
            first_byte: Some(first_byte),
            failure,
        }
    }
}

fn classify_error(err: &reqwest::Error) -> RequestFailure {
    if err.is_timeout() {
        RequestFailure::Timeout
    } else if err.is_connect() {
        RequestFailure::Connect(err.to_string())
    } else if err.is_builder() {
        RequestFailure::Build(err.to_string())
    } else {
        RequestFailure::Transport(err.to_string())
    }
}

async fn drain_response_body(response: reqwest::Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}
