//! Tracing setup for the bindstamp CLI
//!
//! Logs always go to stderr so that stdout carries only command output.

use crate::errors::CliError;
use std::io::{self, IsTerminal};
pub use tracing::Level;
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Crates whose logs the `--level` flag controls.
const CRATES: &[&str] = &[
    "bindstamp",
    "bindstamp_bindings",
    "bindstamp_filesys",
    "bindstamp_pathsys",
];

/// Target of the per-entry scan trace.
pub const BINDSCAN_TARGET: &str = "bindscan";

/// Tracing output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TracingFormat {
    /// Pretty-printed human-readable format
    Pretty,
    /// Compact single-line format
    Compact,
    /// Structured JSON format
    Json,
    /// Development format with source locations
    Dev,
}

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    /// Show all logs (trace level)
    Trace,
    /// Show debug and above
    Debug,
    /// Show info and above
    Info,
    /// Show warnings and above (default)
    Warn,
    /// Show errors only
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

/// Tracing configuration
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub format: TracingFormat,
    pub level: Level,
    /// Also show the `bindscan` trace, whatever the level.
    pub bindscan: bool,
    /// Explicit filter; otherwise `RUST_LOG`, otherwise `level`.
    pub filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            format: TracingFormat::Compact,
            level: Level::WARN,
            bindscan: false,
            filter: None,
        }
    }
}

static CORRELATION_ID: std::sync::OnceLock<Uuid> = std::sync::OnceLock::new();

/// Get or create a correlation ID for the current session
pub fn correlation_id() -> Uuid {
    *CORRELATION_ID.get_or_init(Uuid::new_v4)
}

/// Filter directives for `level` across the workspace crates.
fn level_directives(level: Level) -> String {
    let level = level.as_str().to_lowercase();
    CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn build_filter(config: &TracingConfig) -> Result<EnvFilter, CliError> {
    let filter = match &config.filter {
        Some(filter) => EnvFilter::try_new(filter),
        None => EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level_directives(config.level))),
    }
    .map_err(|e| CliError::tracing(e.to_string()))?;

    if config.bindscan {
        let directive = format!("{BINDSCAN_TARGET}=info")
            .parse()
            .map_err(|e: tracing_subscriber::filter::ParseError| CliError::tracing(e.to_string()))?;
        Ok(filter.add_directive(directive))
    } else {
        Ok(filter)
    }
}

/// Initialize tracing with the given configuration
pub fn init_tracing(config: &TracingConfig) -> Result<(), CliError> {
    let correlation_id = correlation_id();
    let ansi = io::stderr().is_terminal();
    let registry = tracing_subscriber::registry().with(build_filter(config)?);

    match config.format {
        TracingFormat::Pretty => {
            let layer = tracing_subscriber::fmt::layer()
                .pretty()
                .with_ansi(ansi)
                .with_writer(io::stderr)
                .with_target(true);
            registry.with(layer).init();
        }
        TracingFormat::Compact => {
            let layer = tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(ansi)
                .with_writer(io::stderr)
                .with_target(false)
                .without_time();
            registry.with(layer).init();
        }
        TracingFormat::Json => {
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(io::stderr)
                .with_current_span(true)
                .with_span_list(true);
            registry.with(layer).init();
        }
        TracingFormat::Dev => {
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(ansi)
                .with_writer(io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true);
            registry.with(layer).init();
        }
    }

    tracing::info!(
        correlation_id = %correlation_id,
        version = env!("CARGO_PKG_VERSION"),
        format = ?config.format,
        "Tracing initialized"
    );

    Ok(())
}

/// Create a span for one command with the session correlation id
#[macro_export]
macro_rules! command_span {
    ($command:expr) => {
        tracing::info_span!(
            "command",
            command = %$command,
            correlation_id = %$crate::tracing::correlation_id(),
            start_time = %chrono::Utc::now().to_rfc3339(),
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_id_consistency() {
        assert_eq!(correlation_id(), correlation_id());
    }

    #[test]
    fn test_level_directives_cover_workspace_crates() {
        let directives = level_directives(Level::DEBUG);
        assert_eq!(
            directives,
            "bindstamp=debug,bindstamp_bindings=debug,bindstamp_filesys=debug,bindstamp_pathsys=debug"
        );
    }

    #[test]
    fn test_explicit_filter_with_bindscan() {
        let config = TracingConfig {
            filter: Some("warn".to_string()),
            bindscan: true,
            ..TracingConfig::default()
        };
        let filter = build_filter(&config).unwrap();
        assert!(filter.to_string().contains("bindscan=info"));
    }

    #[test]
    fn test_invalid_filter_is_reported() {
        let config = TracingConfig {
            filter: Some("bindstamp=notalevel".to_string()),
            ..TracingConfig::default()
        };
        assert!(build_filter(&config).is_err());
    }
}
