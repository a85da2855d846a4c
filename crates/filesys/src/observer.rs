//! Collaborator contracts between scanners and the resolver

use crate::Result;
use bindstamp_timestamp::Timestamp;
use std::sync::Arc;

/// Receives every entry a directory or archive scan discovers.
///
/// `time` is `Some` when the scanner already knows the entry's modification
/// time (archive member tables, or directories scanned with per-entry stat),
/// and `None` when it only knows that the entry exists.
pub trait ScanObserver {
    /// Reports one discovered entry.
    fn entry(&mut self, path: &str, time: Option<Timestamp>);
}

impl<F> ScanObserver for F
where
    F: FnMut(&str, Option<Timestamp>),
{
    fn entry(&mut self, path: &str, time: Option<Timestamp>) {
        self(path, time);
    }
}

/// The file system operations the resolver depends on.
///
/// Paths are cache keys: already normalized, possibly empty (the current
/// directory). Failures are returned rather than swallowed; the resolver
/// decides how to degrade them.
pub trait FileSystem {
    /// Enumerates `dir`, reporting each entry to `observer`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read. Entries reported
    /// before the failure stay reported.
    fn scan_dir(&self, dir: &str, observer: &mut dyn ScanObserver) -> Result<()>;

    /// Enumerates the members of `archive`, reporting each as `archive(member)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive cannot be opened, is in an unknown
    /// format, or is malformed part way through.
    fn scan_archive(&self, archive: &str, observer: &mut dyn ScanObserver) -> Result<()>;

    /// Returns the modification time of a single path.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not exist or its metadata cannot be read.
    fn file_time(&self, path: &str) -> Result<Timestamp>;
}

impl<T: FileSystem + ?Sized> FileSystem for &T {
    fn scan_dir(&self, dir: &str, observer: &mut dyn ScanObserver) -> Result<()> {
        (**self).scan_dir(dir, observer)
    }

    fn scan_archive(&self, archive: &str, observer: &mut dyn ScanObserver) -> Result<()> {
        (**self).scan_archive(archive, observer)
    }

    fn file_time(&self, path: &str) -> Result<Timestamp> {
        (**self).file_time(path)
    }
}

impl<T: FileSystem + ?Sized> FileSystem for Arc<T> {
    fn scan_dir(&self, dir: &str, observer: &mut dyn ScanObserver) -> Result<()> {
        (**self).scan_dir(dir, observer)
    }

    fn scan_archive(&self, archive: &str, observer: &mut dyn ScanObserver) -> Result<()> {
        (**self).scan_archive(archive, observer)
    }

    fn file_time(&self, path: &str) -> Result<Timestamp> {
        (**self).file_time(path)
    }
}
