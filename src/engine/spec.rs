use std::collections::BTreeMap;
use std::fmt;

use http::Method;

/// One HTTP call to issue. Header names are stored lowercased so keys stay
/// unique regardless of how they were spelled in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub name: Option<String>,
    pub method: Method,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

impl RequestSpec {
    /// A plain GET to `url`, the request repeated in single-URL runs.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            name: None,
            method: Method::GET,
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl fmt::Display for RequestSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name.as_deref() {
            Some(name) => write!(f, "{} ({} {})", name, self.method, self.url),
            None => write!(f, "{} {}", self.method, self.url),
        }
    }
}
