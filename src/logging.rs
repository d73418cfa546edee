//! Logging setup

use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// The log level selected by the number of `-v` flags
pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs a subscriber printing to stderr
///
/// `RUST_LOG` takes precedence over `verbosity` when it is set. Calling this more than
/// once has no effect.
pub fn init(verbosity: u8) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("adjdump={}", level_for(verbosity))));

        let verbose = verbosity > 1;

        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(verbose)
            .with_file(verbose)
            .with_line_number(verbose)
            .compact()
            .init();
    });
}
