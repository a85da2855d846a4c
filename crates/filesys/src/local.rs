//! Scanners backed by the real file system

use crate::archive;
use crate::{Error, FileSystem, Result, ScanObserver};
use bindstamp_pathsys::child;
use bindstamp_timestamp::Timestamp;
use std::fs;
use std::io::BufReader;
use std::path::Path;

/// Options for [`LocalFileSystem`].
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Stat every directory entry during the scan and report its time.
    ///
    /// Off by default: a plain listing is cheap and most entries are never
    /// asked about, so they are timed individually on demand instead.
    pub stat_entries: bool,
}

impl ScanConfig {
    /// Enables or disables per-entry stat during directory scans.
    #[must_use]
    pub fn with_stat_entries(mut self, stat_entries: bool) -> Self {
        self.stat_entries = stat_entries;
        self
    }
}

/// [`FileSystem`] over `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct LocalFileSystem {
    config: ScanConfig,
}

/// The empty key names the current directory.
fn os_path(key: &str) -> &Path {
    if key.is_empty() {
        Path::new(".")
    } else {
        Path::new(key)
    }
}

fn modified(path: &Path) -> std::io::Result<Timestamp> {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map(Timestamp::from)
}

impl LocalFileSystem {
    /// Creates a file system with the given scan options.
    #[must_use]
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// The scan options in effect.
    #[must_use]
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }
}

impl FileSystem for LocalFileSystem {
    fn scan_dir(&self, dir: &str, observer: &mut dyn ScanObserver) -> Result<()> {
        let path = os_path(dir);
        let entries = fs::read_dir(path).map_err(|e| Error::io(e, path, "read_dir"))?;

        // The directory itself is known to exist and its time is one stat away.
        if !dir.is_empty() {
            match modified(path) {
                Ok(time) => observer.entry(dir, Some(time)),
                Err(e) => tracing::debug!(dir, "Directory time unavailable: {e}"),
            }
        }

        let mut reported = 0_usize;
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!(dir, "Skipping unreadable directory entry: {e}");
                    continue;
                }
            };
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                tracing::debug!(dir, name = ?file_name, "Skipping non UTF-8 directory entry");
                continue;
            };

            let time = if self.config.stat_entries {
                modified(&entry.path()).ok()
            } else {
                None
            };
            observer.entry(&child(dir, name), time);
            reported += 1;
        }

        tracing::debug!(dir, entries = reported, "Scanned directory");
        Ok(())
    }

    fn scan_archive(&self, archive: &str, observer: &mut dyn ScanObserver) -> Result<()> {
        let path = os_path(archive);
        let file = fs::File::open(path).map_err(|e| Error::io(e, path, "open"))?;
        let members = archive::scan(BufReader::new(file), archive, observer)?;
        tracing::debug!(archive, members, "Scanned archive");
        Ok(())
    }

    fn file_time(&self, path: &str) -> Result<Timestamp> {
        let os = os_path(path);
        modified(os).map_err(|e| Error::io(e, os, "metadata"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn collect_dir(
        fs: &LocalFileSystem,
        dir: &str,
    ) -> Result<BTreeMap<String, Option<Timestamp>>> {
        let mut seen = BTreeMap::new();
        let mut observer = |path: &str, time: Option<Timestamp>| {
            seen.insert(path.to_string(), time);
        };
        fs.scan_dir(dir, &mut observer)?;
        Ok(seen)
    }

    #[test]
    fn scan_dir_reports_entries_without_times() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("a.c"), "a").unwrap();
        std::fs::create_dir(tmp.path().join("sub")).unwrap();
        let dir = tmp.path().to_str().unwrap();

        let seen = collect_dir(&LocalFileSystem::default(), dir).unwrap();

        assert_eq!(seen.len(), 3);
        assert!(seen[dir].is_some(), "directory itself carries its time");
        assert_eq!(seen[&format!("{dir}/a.c")], None);
        assert_eq!(seen[&format!("{dir}/sub")], None);
    }

    #[test]
    fn scan_dir_with_stat_entries_reports_times() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("a.c"), "a").unwrap();
        let dir = tmp.path().to_str().unwrap();
        let fs = LocalFileSystem::new(ScanConfig::default().with_stat_entries(true));

        let seen = collect_dir(&fs, dir).unwrap();

        let time = seen[&format!("{dir}/a.c")].unwrap();
        assert_eq!(time, fs.file_time(&format!("{dir}/a.c")).unwrap());
    }

    #[test]
    fn scan_missing_dir_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");
        let err = collect_dir(&LocalFileSystem::default(), missing.to_str().unwrap()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn file_time_matches_metadata() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("f.txt");
        std::fs::write(&file, "x").unwrap();
        let expected = Timestamp::from(std::fs::metadata(&file).unwrap().modified().unwrap());

        let fs = LocalFileSystem::default();
        assert_eq!(fs.file_time(file.to_str().unwrap()).unwrap(), expected);
        assert!(fs.file_time(tmp.path().join("gone").to_str().unwrap()).is_err());
    }

    #[test]
    fn scan_archive_rejects_unknown_format() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("notes.txt");
        std::fs::write(&file, "just text").unwrap();

        let mut observer = |_: &str, _: Option<Timestamp>| {};
        let err = LocalFileSystem::default()
            .scan_archive(file.to_str().unwrap(), &mut observer)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownArchiveFormat { .. }));
    }
}
