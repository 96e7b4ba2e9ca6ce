//! Log setup for the CLI
//!
//! Logs go to stderr so stdout stays free for JSON reports. `RUST_LOG`
//! takes precedence over the `--debug` default.

use tracing_subscriber::EnvFilter;

/// Default filter directive for a verbosity
pub fn default_directive(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "info"
    }
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
