//! Logging initialization.
//!
//! Diagnostics go to stderr through `tracing`; stdout is reserved for
//! `--json` output.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT_ONCE: Once = Once::new();

/// Install the global subscriber. `RUST_LOG` overrides the default filter
/// (`cafesplit=info`, or `cafesplit=debug` with `--verbose`).
pub fn init(verbose: bool) {
    INIT_ONCE.call_once(|| {
        let default = if verbose { "cafesplit=debug" } else { "cafesplit=info" };
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
            )
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    });
}
