use clap::Parser;
use std::time::Duration;

use super::defaults::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_MAX_ERRORS, DEFAULT_REQUESTS, DEFAULT_TIMEOUT, DEFAULT_USERS,
};
use super::parsers::{
    parse_bool_env, parse_duration_arg, parse_header, parse_positive_u64, parse_positive_usize,
};
use super::types::{HttpMethod, PositiveU64, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Async HTTP load tester - sends a fixed number of requests from concurrent virtual users and reports throughput, latency, concurrency and downtime."
)]
pub struct TesterArgs {
    /// Target URL for the load test
    #[arg(long, short)]
    pub url: Option<String>,

    /// Request collection file (JSON/TOML), cycled in order; takes precedence over --url
    #[arg(long, short = 'C')]
    pub collection: Option<String>,

    /// Number of concurrent virtual users
    #[arg(
        long,
        short = 'U',
        default_value = DEFAULT_USERS,
        value_parser = parse_positive_usize
    )]
    pub users: PositiveUsize,

    /// Total number of requests, split across all users
    #[arg(
        long = "requests",
        short = 'n',
        default_value = DEFAULT_REQUESTS,
        value_parser = parse_positive_u64
    )]
    pub requests: PositiveU64,

    /// Stop starting new requests after this many errors (negative disables)
    #[arg(
        long = "max-errors",
        default_value = DEFAULT_MAX_ERRORS,
        allow_negative_numbers = true
    )]
    pub max_errors: i64,

    /// Print the extended summary (errors, utilization, concurrency, peak load, downtime, percentiles)
    #[arg(long)]
    pub detailed: bool,

    /// HTTP method for --url runs
    #[arg(long, short = 'X', default_value = "get", ignore_case = true)]
    pub method: HttpMethod,

    /// HTTP headers in 'Key: Value' format (repeatable)
    #[arg(long = "header", short = 'H', alias = "headers", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Request body for --url runs
    #[arg(long, short)]
    pub data: Option<String>,

    /// Request timeout (supports ms/s/m/h)
    #[arg(
        long = "timeout",
        default_value = DEFAULT_TIMEOUT,
        value_parser = parse_duration_arg
    )]
    pub request_timeout: Duration,

    /// Timeout for establishing a new connection (supports ms/s/m/h)
    #[arg(
        long = "connect-timeout",
        default_value = DEFAULT_CONNECT_TIMEOUT,
        value_parser = parse_duration_arg
    )]
    pub connect_timeout: Duration,

    /// Status code that counts as success (default: any 2xx)
    #[arg(long = "status", short = 's')]
    pub expected_status: Option<u16>,

    /// Write the final metrics to a JSON file
    #[arg(long = "export-json")]
    pub export_json: Option<String>,

    /// Path to config file (TOML/JSON). Defaults to ./burden.toml or ./burden.json if present.
    #[arg(long)]
    pub config: Option<String>,

    /// Enable verbose logging (sets log level to debug unless overridden by BURDEN_LOG/RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable color output
    #[arg(long = "no-color", env = "NO_COLOR", value_parser = parse_bool_env)]
    pub no_color: bool,
}

impl TesterArgs {
    /// Error budget with negative values meaning "no budget".
    #[must_use]
    pub fn error_budget(&self) -> Option<u64> {
        u64::try_from(self.max_errors).ok()
    }
}
