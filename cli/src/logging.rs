//! # Logging
//!
//! Installs a `tracing` fmt subscriber on stderr. goctl shows the plugin's
//! output to the user, so stdout stays free.

use tracing_subscriber::EnvFilter;

/// Maps `-v` occurrences to a default filter directive.
pub fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Initializes logging. `RUST_LOG` wins over the `-v` count.
pub fn init(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbose)));

    // Ignore failure: a subscriber may already be installed (tests).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
