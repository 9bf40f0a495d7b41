//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the filter directives.
pub const LOG_ENV_VAR: &str = "GOVLINT_LOG";

static INIT: Once = Once::new();

/// Initialize the govlint tracing/logging system.
///
/// Reads `GOVLINT_LOG` for per-subsystem log levels.
/// Format: `GOVLINT_LOG=govlint_analysis::extractor=debug,govlint_analysis::workspace=info`
///
/// Falls back to `govlint=info` if `GOVLINT_LOG` is not set or is invalid.
///
/// Calling this more than once is a no-op.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new("govlint=info"));

        // A host may already own the global subscriber.
        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .try_init();
    });
}
