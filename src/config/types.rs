use std::time::Duration;

use serde::Deserialize;

use crate::args::{HttpMethod, parse_duration_str};
use crate::error::ConfigError;

/// Settings accepted from `burden.toml` / `burden.json`. Every field is
/// optional and loses to the same option given on the command line.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub url: Option<String>,
    pub collection: Option<String>,
    pub users: Option<usize>,
    pub requests: Option<u64>,
    pub max_errors: Option<i64>,
    pub detailed: Option<bool>,
    pub method: Option<HttpMethod>,
    pub headers: Option<Vec<String>>,
    pub data: Option<String>,
    pub timeout: Option<DurationValue>,
    pub connect_timeout: Option<DurationValue>,
    pub status: Option<u16>,
    pub export_json: Option<String>,
}

/// A duration written either as whole seconds (`10`) or with a unit
/// (`"250ms"`, `"2m"`).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self, field: &'static str) -> Result<Duration, ConfigError> {
        let parsed = match self {
            DurationValue::Seconds(secs) => parse_duration_str(&secs.to_string()),
            DurationValue::Text(text) => parse_duration_str(text),
        };
        parsed.map_err(|err| ConfigError::InvalidDuration { field, source: err })
    }
}
