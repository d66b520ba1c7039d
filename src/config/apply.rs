use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{PositiveU64, PositiveUsize, TesterArgs, parse_header};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::ConfigFile;

/// Applies configuration values to CLI arguments. Options given on the
/// command line always win.
///
/// # Errors
///
/// Returns an error when a config value is out of range or malformed.
pub fn apply_config(
    args: &mut TesterArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "url")
        && let Some(url) = config.url.clone()
    {
        args.url = Some(url);
    }

    if !is_cli(matches, "collection")
        && let Some(collection) = config.collection.clone()
    {
        args.collection = Some(collection);
    }

    if !is_cli(matches, "users")
        && let Some(users) = config.users
    {
        args.users = PositiveUsize::try_from(users).map_err(|err| {
            AppError::config(ConfigError::FieldMustBePositive {
                field: "users".to_owned(),
                source: err,
            })
        })?;
    }

    if !is_cli(matches, "requests")
        && let Some(requests) = config.requests
    {
        args.requests = PositiveU64::try_from(requests).map_err(|err| {
            AppError::config(ConfigError::FieldMustBePositive {
                field: "requests".to_owned(),
                source: err,
            })
        })?;
    }

    if !is_cli(matches, "max_errors")
        && let Some(max_errors) = config.max_errors
    {
        args.max_errors = max_errors;
    }

    if !is_cli(matches, "detailed")
        && let Some(detailed) = config.detailed
    {
        args.detailed = detailed;
    }

    if !is_cli(matches, "method")
        && let Some(method) = config.method
    {
        args.method = method;
    }

    if !is_cli(matches, "headers")
        && let Some(headers) = config.headers.as_ref()
    {
        args.headers = headers
            .iter()
            .map(|header| {
                parse_header(header)
                    .map_err(|err| AppError::config(ConfigError::InvalidHeader { source: err }))
            })
            .collect::<AppResult<Vec<_>>>()?;
    }

    if !is_cli(matches, "data")
        && let Some(data) = config.data.clone()
    {
        args.data = Some(data);
    }

    if !is_cli(matches, "request_timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        args.request_timeout = timeout.to_duration("timeout")?;
    }

    if !is_cli(matches, "connect_timeout")
        && let Some(timeout) = config.connect_timeout.as_ref()
    {
        args.connect_timeout = timeout.to_duration("connect_timeout")?;
    }

    if !is_cli(matches, "expected_status")
        && let Some(status) = config.status
    {
        args.expected_status = Some(status);
    }

    if !is_cli(matches, "export_json")
        && let Some(path) = config.export_json.clone()
    {
        args.export_json = Some(path);
    }

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}
