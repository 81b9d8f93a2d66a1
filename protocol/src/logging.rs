//! # Structured Logging
//!
//! The library itself only emits `tracing` events; it never installs a
//! subscriber on its own. Binaries and test harnesses that embed the crate
//! call [`init_logging`] (or [`try_init_logging`]) once at startup.
//!
//! Output goes to stderr so stdout stays free for whatever the host prints,
//! typically signed payloads piped into another tool.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{ProtocolError, Result};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable output for local development.
    Pretty,
    /// JSON lines for log aggregation.
    Json,
}

impl LogFormat {
    /// Parse a format string. Accepts "json" or "pretty" (case-insensitive).
    /// Returns `Pretty` for any unrecognized value.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Initialize the global tracing subscriber, panicking if one is already set.
///
/// * `default_level` - used when `RUST_LOG` is not set, e.g. `"info"` or
///   `"rollup_protocol=debug"`.
/// * `format` - output format.
pub fn init_logging(default_level: &str, format: LogFormat) {
    if let Err(e) = try_init_logging(default_level, format) {
        panic!("{e}");
    }
}

/// Like [`init_logging`], but reports an already-installed subscriber as an
/// error instead of panicking. Handy in tests, where every case races to
/// install one.
pub fn try_init_logging(default_level: &str, format: LogFormat) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let installed = match format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init(),
    };

    installed.map_err(|e| ProtocolError::invalid("logging", e.to_string()))?;
    tracing::info!("logging initialized (format={:?})", format);
    Ok(())
}
