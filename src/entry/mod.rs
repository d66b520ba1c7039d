//! Process entry: argument parsing, logging and runtime setup.
mod plan;

use std::ffi::OsString;

use clap::{ArgMatches, CommandFactory, FromArgMatches};

use crate::args::TesterArgs;
use crate::config::default_config_path;
use crate::error::{AppError, AppResult, ValidationError};
use plan::{build_plan, execute_plan};

/// Runs the CLI with the process arguments.
///
/// # Errors
///
/// Returns an error when arguments or config are invalid, when no target is
/// given, or when the run cannot be set up. Failing requests are not errors.
pub fn run() -> AppResult<()> {
    let (args, matches) = parse_args()?;

    crate::system::logger::init_logging(args.verbose, args.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::validation(ValidationError::RuntimeBuildFailed { source: err }))?;

    runtime.block_on(run_async(args, &matches))
}

fn parse_args() -> AppResult<(TesterArgs, ArgMatches)> {
    let mut cmd = TesterArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Err(AppError::validation(ValidationError::MissingTarget));
    }

    let matches = cmd.get_matches_from(raw_args);
    let args = TesterArgs::from_arg_matches(&matches)?;

    Ok((args, matches))
}

fn should_show_help(raw_args: &[OsString]) -> bool {
    let treat_as_empty =
        matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--");
    treat_as_empty && default_config_path().is_none()
}

async fn run_async(args: TesterArgs, matches: &ArgMatches) -> AppResult<()> {
    let plan = build_plan(args, matches)?;
    execute_plan(&plan).await
}
