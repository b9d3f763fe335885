//! Logging setup.
//!
//! The terminal belongs to the game while it runs, so logs are written to a
//! file rather than stderr.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the verbosity flags.
pub const LOG_ENV_VAR: &str = "PHYSMAN_LOG";

/// Maps a verbosity level to a tracing directive string.
///
/// - 0 → `"warn"`
/// - 1 → `"info"`
/// - 2 → `"debug"`
/// - 3+ → `"trace"` (saturates)
#[must_use]
pub const fn verbosity_to_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber writing to `path`.
///
/// `PHYSMAN_LOG` takes precedence over `verbosity`. Uses `try_init()` so a
/// second call is a no-op.
pub fn init_logging(path: &Path, verbosity: u8) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let log_file = File::create(path)?;

    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(verbosity_to_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .with_target(verbosity >= 2)
        .try_init();

    Ok(())
}
