//! Logger initialization.

use tracing_subscriber::EnvFilter;

/// The filter used when neither the command line nor `RUST_LOG` configure one.
const DEFAULT_FILTER: &str = "warn";

/// The level directive implied by the `--verbose` count, if any.
pub fn verbosity_directive(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

/// Build the log filter.
///
/// The explicit `--log-filter` takes precedence over `--verbose`, which takes precedence
/// over `RUST_LOG`.
pub fn env_filter(verbose: u8, log_filter: Option<&str>) -> Result<EnvFilter, anyhow::Error> {
    if let Some(directives) = log_filter.or_else(|| verbosity_directive(verbose)) {
        return Ok(EnvFilter::try_new(directives)?);
    }
    Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)))
}

/// Install the global logger, writing to stderr.
pub fn init(verbose: u8, log_filter: Option<&str>) -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose, log_filter)?)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(anyhow::Error::msg)
}
