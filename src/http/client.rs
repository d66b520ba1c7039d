use std::time::Duration;

use reqwest::{Client, redirect};
use url::Url;

use crate::args::DEFAULT_USER_AGENT;
use crate::error::{AppError, AppResult, HttpError};

const REDIRECT_LIMIT: usize = 10;

/// Transport knobs shared by every request of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpSettings {
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// Status that counts as success. `None` accepts any 2xx.
    pub expected_status: Option<u16>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            expected_status: None,
        }
    }
}

/// Builds the client all virtual users share, so connections are pooled
/// across the run.
///
/// # Errors
///
/// Returns an error when the TLS backend or client cannot be initialized.
pub fn build_client(settings: &HttpSettings) -> AppResult<Client> {
    Client::builder()
        .timeout(settings.request_timeout)
        .connect_timeout(settings.connect_timeout)
        .user_agent(DEFAULT_USER_AGENT)
        .redirect(redirect::Policy::limited(REDIRECT_LIMIT))
        .build()
        .map_err(|err| AppError::http(HttpError::BuildClientFailed { source: err }))
}

/// Parses an absolute http(s) URL with a host.
///
/// # Errors
///
/// Returns an error when the URL does not parse or has no host.
pub fn parse_target_url(raw: &str) -> AppResult<Url> {
    let url = Url::parse(raw).map_err(|err| {
        AppError::http(HttpError::InvalidUrl {
            url: raw.to_owned(),
            source: err,
        })
    })?;
    if url.host_str().is_none() {
        return Err(AppError::http(HttpError::UrlMissingHost {
            url: raw.to_owned(),
        }));
    }
    Ok(url)
}
