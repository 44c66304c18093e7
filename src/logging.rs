// src/logging.rs

//! Logging setup.
//!
//! The filter comes from `--log-level` when given, else from `ASSETFLOW_LOG`
//! (any `EnvFilter` directive, e.g. `debug` or `assetflow::watch=trace`),
//! else `info`. Output goes to stderr; stdout carries `--dry-run` plans.

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

pub const LOG_ENV_VAR: &str = "ASSETFLOW_LOG";

/// Install the global subscriber. Call once from `main`.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = build_filter(cli_level, std::env::var(LOG_ENV_VAR).ok().as_deref())?;

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    Ok(())
}

/// Resolve the filter from the CLI flag and the raw env value.
///
/// An unparsable env value falls back to `info` with a note on stderr.
pub fn build_filter(cli_level: Option<LogLevel>, env_value: Option<&str>) -> Result<EnvFilter> {
    if let Some(level) = cli_level {
        return EnvFilter::try_new(level.directive())
            .with_context(|| format!("invalid log level {:?}", level));
    }

    match env_value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(directives) => match EnvFilter::try_new(directives) {
            Ok(filter) => Ok(filter),
            Err(e) => {
                eprintln!("ignoring {LOG_ENV_VAR}={directives:?}: {e}");
                Ok(EnvFilter::new("info"))
            }
        },
        None => Ok(EnvFilter::new("info")),
    }
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}
