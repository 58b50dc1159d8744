//! Tracing subscriber setup.

use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a filter directive, e.g. `ghinstall=debug`.
pub const LOG_ENV_VAR: &str = "GHINSTALL_LOG";

/// Default filter directive for a verbosity level.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "ghinstall=info,warn"
    } else {
        "warn"
    }
}

/// Install a plain-text subscriber writing to stderr.
///
/// `GHINSTALL_LOG` takes precedence over the verbosity default. Calling
/// this twice keeps the first subscriber.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init()
    {
        warn!("Tracing already initialised, skipping duplicate subscriber: {err}");
    }
}
