pub(crate) const DEFAULT_USER_AGENT: &str = concat!("burden-loadtest/", env!("CARGO_PKG_VERSION"));

pub(crate) const DEFAULT_USERS: &str = "1";
pub(crate) const DEFAULT_REQUESTS: &str = "100";
pub(crate) const DEFAULT_MAX_ERRORS: &str = "-1";
pub(crate) const DEFAULT_TIMEOUT: &str = "10s";
pub(crate) const DEFAULT_CONNECT_TIMEOUT: &str = "5s";
