//! CLI error types with miette diagnostics

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Failures of the command line front end.
///
/// Resolution itself never fails; these cover the plumbing around it.
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("Failed to write {what}")]
    #[diagnostic(
        code(bindstamp::cli::output),
        help("Check that stdout is still open, e.g. not a closed pipe")
    )]
    Output {
        what: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode {what} as JSON")]
    #[diagnostic(code(bindstamp::cli::json))]
    Json {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Tracing initialization failed: {message}")]
    #[diagnostic(
        code(bindstamp::cli::tracing),
        help("Check the RUST_LOG environment variable")
    )]
    Tracing { message: String },
}

impl CliError {
    pub fn output(what: &'static str, source: std::io::Error) -> Self {
        Self::Output { what, source }
    }

    pub fn json(what: &'static str, source: serde_json::Error) -> Self {
        Self::Json { what, source }
    }

    pub fn tracing(message: impl Into<String>) -> Self {
        Self::Tracing {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_codes() {
        let err = CliError::tracing("bad directive");
        assert_eq!(err.code().unwrap().to_string(), "bindstamp::cli::tracing");
        assert_eq!(
            err.to_string(),
            "Tracing initialization failed: bad directive"
        );

        let io = std::io::Error::from(std::io::ErrorKind::BrokenPipe);
        let err = CliError::output("results", io);
        assert_eq!(err.code().unwrap().to_string(), "bindstamp::cli::output");
        assert!(std::error::Error::source(&err).is_some());
    }
}
