//! Log output for the CLI
//!
//! Diagnostics go to stderr so answers on stdout stay clean. `RUST_LOG`
//! overrides the level picked from `-q`/`-v`.

use tracing_subscriber::EnvFilter;

use crate::cli::Verbosity;

/// Default filter directive for a verbosity level
pub fn filter_for(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Quiet => "ragbuddy=error",
        Verbosity::Normal => "ragbuddy=warn",
        Verbosity::Verbose => "ragbuddy=info",
        Verbosity::VeryVerbose => "ragbuddy=debug",
    }
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_for(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
