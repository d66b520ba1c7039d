use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("Failed to read collection '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse JSON collection '{path}': {source}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to parse TOML collection '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Unsupported collection extension '{ext}'. Use .json or .toml.")]
    UnsupportedExtension { ext: String },
    #[error("Collection file must have .json or .toml extension.")]
    MissingExtension,
    #[error("Collection '{path}' has no requests.")]
    Empty { path: PathBuf },
    #[error("Request {index} must define url or path.")]
    MissingUrlOrPath { index: usize },
    #[error("Request {index} uses a relative path but the collection has no base_url.")]
    BaseUrlRequired { index: usize },
    #[error("Invalid base_url '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Request {index} has invalid URL '{url}': {source}")]
    InvalidUrl {
        index: usize,
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Request {index} URL '{url}' is missing a host.")]
    UrlMissingHost { index: usize, url: String },
    #[error("Request {index} has invalid method '{method}'.")]
    InvalidMethod { index: usize, method: String },
    #[error("Invalid header name '{header}': {source}")]
    InvalidHeaderName {
        header: String,
        #[source]
        source: http::header::InvalidHeaderName,
    },
    #[error("Invalid header value for '{header}': {source}")]
    InvalidHeaderValue {
        header: String,
        #[source]
        source: http::header::InvalidHeaderValue,
    },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
