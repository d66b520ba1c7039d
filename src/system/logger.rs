use tracing_subscriber::{EnvFilter, FmtSubscriber};

const LOG_ENV_VARS: [&str; 2] = ["BURDEN_LOG", "RUST_LOG"];

fn build_filter(env_value: Option<String>, verbose: bool) -> EnvFilter {
    let fallback = if verbose { "debug" } else { "info" };
    env_value.map_or_else(
        || EnvFilter::new(fallback),
        |value| EnvFilter::try_new(value).unwrap_or_else(|_err| EnvFilter::new(fallback)),
    )
}

/// Installs the global `tracing` subscriber. Logs go to stderr so the summary
/// on stdout stays machine-readable. Only the first call takes effect.
pub fn init_logging(verbose: bool, no_color: bool) {
    let env_value = LOG_ENV_VARS
        .iter()
        .find_map(|name| std::env::var(name).ok());

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(build_filter(env_value, verbose))
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("Logging already initialized.");
    }
}
