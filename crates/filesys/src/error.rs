//! Error types for the filesys crate

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

/// Error type for scans and time queries
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// I/O error while reading a directory, archive or file metadata
    #[error("I/O {operation} failed{}", path.as_ref().map_or(String::new(), |p| format!(": {}", p.display())))]
    #[diagnostic(
        code(bindstamp::filesys::io),
        help("Check file permissions and ensure the path exists")
    )]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Path that caused the error, if available
        path: Option<Box<Path>>,
        /// Operation that failed (e.g., "read_dir", "open", "metadata")
        operation: String,
    },

    /// Archive contents do not follow the detected format
    #[error("Malformed archive {}: {message}", path.display())]
    #[diagnostic(
        code(bindstamp::filesys::malformed_archive),
        help("The archive may be truncated or written by an unsupported tool")
    )]
    MalformedArchive {
        /// Archive being scanned
        path: Box<Path>,
        /// What was wrong with it
        message: String,
    },

    /// Archive magic matched none of the supported formats
    #[error("Unrecognized archive format: {}", path.display())]
    #[diagnostic(
        code(bindstamp::filesys::unknown_format),
        help("Supported formats are ar, tar and zstd-compressed tar")
    )]
    UnknownArchiveFormat {
        /// Archive being scanned
        path: Box<Path>,
    },
}

impl Error {
    /// Create an I/O error with path context
    #[must_use]
    pub fn io(
        source: std::io::Error,
        path: impl AsRef<Path>,
        operation: impl Into<String>,
    ) -> Self {
        Self::Io {
            source,
            path: Some(path.as_ref().into()),
            operation: operation.into(),
        }
    }

    /// Create a malformed archive error
    #[must_use]
    pub fn malformed(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::MalformedArchive {
            path: path.as_ref().into(),
            message: message.into(),
        }
    }

    /// Create an unknown archive format error
    #[must_use]
    pub fn unknown_format(path: impl AsRef<Path>) -> Self {
        Self::UnknownArchiveFormat {
            path: path.as_ref().into(),
        }
    }

    /// Returns true when the error means the path does not exist
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Result type for filesys operations
pub type Result<T> = std::result::Result<T, Error>;
