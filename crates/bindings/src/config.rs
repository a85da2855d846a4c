//! Resolver options and counters

use bindstamp_pathsys::KeyStyle;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Options for [`crate::TimestampResolver`].
#[derive(Debug, Clone, Default)]
pub struct ResolverConfig {
    /// How paths are turned into binding keys.
    pub key_style: KeyStyle,
    /// Emit a `bindscan` trace line for every entry a scan reports.
    pub trace_bindscan: bool,
}

impl ResolverConfig {
    /// Sets the key normalization.
    #[must_use]
    pub fn with_key_style(mut self, key_style: KeyStyle) -> Self {
        self.key_style = key_style;
        self
    }

    /// Enables or disables the per-entry scan trace.
    #[must_use]
    pub fn with_trace_bindscan(mut self, trace_bindscan: bool) -> Self {
        self.trace_bindscan = trace_bindscan;
        self
    }
}

/// Collaborator calls a resolver has issued so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolverStats {
    /// Directory scans started.
    pub directory_scans: u64,
    /// Archive scans started.
    pub archive_scans: u64,
    /// Individual time queries for spotted entries.
    pub time_queries: u64,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    directory_scans: AtomicU64,
    archive_scans: AtomicU64,
    time_queries: AtomicU64,
}

impl Counters {
    pub(crate) fn directory_scan(&self) {
        self.directory_scans.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn archive_scan(&self) {
        self.archive_scans.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn time_query(&self) {
        self.time_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> ResolverStats {
        ResolverStats {
            directory_scans: self.directory_scans.load(Ordering::Relaxed),
            archive_scans: self.archive_scans.load(Ordering::Relaxed),
            time_queries: self.time_queries.load(Ordering::Relaxed),
        }
    }
}
