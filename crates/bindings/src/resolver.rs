//! Path to timestamp resolution

use crate::binding::{BindingId, ScanState};
use crate::config::{Counters, ResolverConfig, ResolverStats};
use crate::observer::StoreObserver;
use crate::{BindingStore, Progress};
use bindstamp_filesys::FileSystem;
use bindstamp_pathsys::PathName;
use bindstamp_timestamp::Timestamp;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy)]
enum Container {
    Directory,
    Archive,
}

#[derive(Debug, Clone, Copy)]
enum ClaimKind {
    /// Container enumeration in flight.
    Scan,
    /// Scan or individual stat on behalf of this binding in flight.
    Resolve,
}

/// Releases a claim on drop, so a panicking collaborator cannot leave other
/// resolvers waiting forever.
struct Claim<'a> {
    store: &'a BindingStore,
    id: BindingId,
    kind: ClaimKind,
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        {
            let mut guard = self.store.lock();
            let binding = &mut guard.table()[self.id];
            match self.kind {
                ClaimKind::Scan => binding.scan = ScanState::Scanned,
                ClaimKind::Resolve => binding.resolving = false,
            }
        }
        self.store.notify();
    }
}

/// Answers "does this path exist, and when was it last modified?" while
/// touching the file system as little as possible.
///
/// Every distinct key is resolved at most once; every directory and archive
/// is enumerated at most once, and that enumeration settles all of its
/// siblings at the same time. Results are never invalidated.
///
/// The resolver is `Sync` when its file system is: concurrent callers share
/// one store and wait for each other's scans rather than repeating them.
#[derive(Debug)]
pub struct TimestampResolver<F> {
    store: BindingStore,
    fs: F,
    config: ResolverConfig,
    counters: Counters,
}

impl<F: FileSystem> TimestampResolver<F> {
    /// Creates a resolver with default options.
    #[must_use]
    pub fn new(fs: F) -> Self {
        Self::with_config(fs, ResolverConfig::default())
    }

    /// Creates a resolver with the given options.
    #[must_use]
    pub fn with_config(fs: F, config: ResolverConfig) -> Self {
        Self {
            store: BindingStore::new(),
            fs,
            config,
            counters: Counters::default(),
        }
    }

    /// Returns the modification time of `path`.
    ///
    /// Absent paths, and paths whose time could not be read, yield the
    /// cleared timestamp; use [`TimestampResolver::progress`] to tell those
    /// apart from a file genuinely stamped at the epoch.
    pub fn resolve(&self, path: &str) -> Timestamp {
        let key = self.config.key_style.key(path);

        let (id, needs_scan) = {
            let mut guard = self.store.lock();
            let (id, _) = guard.table().get_or_create(&key);
            while guard.table()[id].resolving {
                guard.wait();
            }

            let binding = &mut guard.table()[id];
            if binding.progress.is_settled() {
                tracing::trace!(key = %key, progress = %binding.progress, "Binding cache hit");
                return binding.resolved_time();
            }
            let needs_scan = binding.progress == Progress::Init;
            if needs_scan {
                // Pessimistic until some scan reports the path.
                binding.progress = Progress::NoEntry;
            }
            binding.resolving = true;
            (id, needs_scan)
        };

        let _claim = Claim {
            store: &self.store,
            id,
            kind: ClaimKind::Resolve,
        };
        // The key only addresses the store; the file system sees the
        // caller's spelling.
        let name = PathName::parse(path);
        if needs_scan {
            self.scan_containers(name.strip_grist());
        }
        let fs_path = path.strip_prefix(name.grist).unwrap_or(path);
        self.settle(fs_path, &key, id)
    }

    /// Progress of `path`, or `None` if it was never looked at.
    #[must_use]
    pub fn progress(&self, path: &str) -> Option<Progress> {
        let key = self.config.key_style.key(path);
        self.store.lookup(&key).map(|binding| binding.progress())
    }

    /// Resolves every path and returns the newest one with its time.
    ///
    /// Ties go to the later path, matching [`Timestamp::latest`]. Returns
    /// `None` for an empty input.
    pub fn newest<I, S>(&self, paths: I) -> Option<(S, Timestamp)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        paths.into_iter().fold(None, |newest, path| {
            let time = self.resolve(path.as_ref());
            match newest {
                Some((prev, prev_time)) if prev_time.compare(&time) == Ordering::Greater => {
                    Some((prev, prev_time))
                }
                _ => Some((path, time)),
            }
        })
    }

    /// True when `target` must be rebuilt: it is absent (not `FOUND`) or
    /// some dependency is strictly newer.
    pub fn is_stale<I, S>(&self, target: &str, deps: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let target_time = self.resolve(target);
        if self.progress(target) != Some(Progress::Found) {
            return true;
        }
        deps.into_iter()
            .any(|dep| self.resolve(dep.as_ref()).compare(&target_time) == Ordering::Greater)
    }

    /// Collaborator calls issued so far.
    #[must_use]
    pub fn stats(&self) -> ResolverStats {
        self.counters.snapshot()
    }

    /// The underlying binding store.
    #[must_use]
    pub fn store(&self) -> &BindingStore {
        &self.store
    }

    /// The file system the resolver scans.
    #[must_use]
    pub fn file_system(&self) -> &F {
        &self.fs
    }

    /// The options in effect.
    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Releases every binding; returns how many were held.
    pub fn teardown(&mut self) -> usize {
        self.store.teardown()
    }

    fn scan_containers(&self, name: PathName<'_>) {
        self.scan_container(&name.parent().build(), Container::Directory);
        if name.has_member() {
            self.scan_container(&name.strip_member().build(), Container::Archive);
        }
    }

    /// Enumerates `path` unless some resolver already has or is doing so.
    fn scan_container(&self, path: &str, container: Container) {
        let key = self.config.key_style.key(path);
        let id = {
            let mut guard = self.store.lock();
            let (id, _) = guard.table().get_or_create(&key);
            loop {
                match guard.table()[id].scan {
                    ScanState::Scanned => return,
                    ScanState::Scanning => guard.wait(),
                    ScanState::Unscanned => {
                        guard.table()[id].scan = ScanState::Scanning;
                        break id;
                    }
                }
            }
        };
        let _claim = Claim {
            store: &self.store,
            id,
            kind: ClaimKind::Scan,
        };

        let mut observer = StoreObserver {
            store: &self.store,
            key_style: self.config.key_style,
            trace: self.config.trace_bindscan,
            reported: 0,
        };
        let outcome = match container {
            Container::Directory => {
                self.counters.directory_scan();
                self.fs.scan_dir(path, &mut observer)
            }
            Container::Archive => {
                self.counters.archive_scan();
                self.fs.scan_archive(path, &mut observer)
            }
        };

        // Unreadable containers simply report nothing more.
        if let Err(e) = outcome {
            tracing::debug!(container = path, kind = ?container, "Scan failed: {e}");
        }
        tracing::trace!(
            container = path,
            kind = ?container,
            reported = observer.reported,
            "Scanned container"
        );
    }

    /// Finishes a claimed binding: stats `path` if a scan only spotted it.
    fn settle(&self, path: &str, key: &str, id: BindingId) -> Timestamp {
        {
            let mut guard = self.store.lock();
            let binding = &guard.table()[id];
            if binding.progress != Progress::Spotted {
                return binding.resolved_time();
            }
        }

        self.counters.time_query();
        let outcome = self.fs.file_time(path);

        let mut guard = self.store.lock();
        let binding = &mut guard.table()[id];
        match outcome {
            Ok(time) => {
                binding.time = time;
                binding.progress = Progress::Found;
            }
            Err(e) => {
                tracing::debug!(path, "Time query failed: {e}");
                binding.time.clear();
                binding.progress = Progress::Missing;
            }
        }
        if self.config.trace_bindscan {
            tracing::info!(target: "bindscan", "time ( {key} ) : {}", binding.progress);
        }
        binding.resolved_time()
    }
}
