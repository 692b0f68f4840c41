//! Logging initialisation.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "shopsync=info,shopsync_core=info";

/// Install a stderr `fmt` subscriber filtered by `RUST_LOG`.
///
/// Stdout is left to command output. Calling this more than once is a no-op.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
