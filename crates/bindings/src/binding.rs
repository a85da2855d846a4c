//! One cache entry per normalized path

use crate::Progress;
use bindstamp_timestamp::Timestamp;
use std::sync::Arc;

/// Handle to a binding inside a [`crate::BindingStore`].
///
/// Handles stay valid for the life of the store; teardown invalidates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(pub(crate) usize);

/// Whether a container's contents have been enumerated into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScanState {
    Unscanned,
    /// A resolver has claimed the scan and is running it.
    Scanning,
    Scanned,
}

/// Cached resolution record for one path.
///
/// Values handed out by the store are snapshots; the live record stays owned
/// by the store.
#[derive(Debug, Clone)]
pub struct Binding {
    key: Arc<str>,
    pub(crate) scan: ScanState,
    pub(crate) progress: Progress,
    pub(crate) time: Timestamp,
    /// Set while a resolver is scanning for or stat-ing this path.
    pub(crate) resolving: bool,
}

impl Binding {
    pub(crate) fn new(key: Arc<str>) -> Self {
        Self {
            key,
            scan: ScanState::Unscanned,
            progress: Progress::Init,
            time: Timestamp::EMPTY,
            resolving: false,
        }
    }

    /// Canonical path key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// True once this path, as a directory or archive, has been scanned.
    #[must_use]
    pub fn scanned(&self) -> bool {
        self.scan == ScanState::Scanned
    }

    /// Resolution progress.
    #[must_use]
    pub fn progress(&self) -> Progress {
        self.progress
    }

    /// Stored time; only meaningful when [`Binding::progress`] is `Found`.
    #[must_use]
    pub fn time(&self) -> Timestamp {
        self.time
    }

    /// The time a resolver hands out: the stored time if found, else cleared.
    #[must_use]
    pub fn resolved_time(&self) -> Timestamp {
        if self.progress == Progress::Found {
            self.time
        } else {
            Timestamp::EMPTY
        }
    }
}
