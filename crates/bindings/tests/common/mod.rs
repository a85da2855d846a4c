//! Scripted file system shared by the resolver tests.

#![allow(dead_code, clippy::panic)]

use bindstamp_filesys::{Error, FileSystem, Result, ScanObserver};
use bindstamp_timestamp::Timestamp;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ScanDir(String),
    ScanArchive(String),
    FileTime(String),
}

/// Answers from fixed tables and records every call it receives.
#[derive(Debug, Default)]
pub struct ScriptedFs {
    dirs: HashMap<String, Vec<(String, Option<Timestamp>)>>,
    archives: HashMap<String, Vec<(String, Timestamp)>>,
    times: HashMap<String, Timestamp>,
    panics_on: Option<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<Call>>,
}

fn not_found(path: &str, operation: &str) -> Error {
    Error::io(io::Error::from(io::ErrorKind::NotFound), path, operation)
}

impl ScriptedFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dir(mut self, dir: &str, entries: &[(&str, Option<Timestamp>)]) -> Self {
        self.dirs.insert(
            dir.to_string(),
            entries.iter().map(|(p, t)| ((*p).to_string(), *t)).collect(),
        );
        self
    }

    pub fn archive(mut self, archive: &str, members: &[(&str, Timestamp)]) -> Self {
        self.archives.insert(
            archive.to_string(),
            members.iter().map(|(p, t)| ((*p).to_string(), *t)).collect(),
        );
        self
    }

    pub fn time(mut self, path: &str, time: Timestamp) -> Self {
        self.times.insert(path.to_string(), time);
        self
    }

    /// Makes every scan of `dir` panic after recording the call.
    pub fn panic_on(mut self, dir: &str) -> Self {
        self.panics_on = Some(dir.to_string());
        self
    }

    /// Makes every call sleep, widening race windows.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().iter().filter(|call| matches(call)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
    }
}

impl FileSystem for ScriptedFs {
    fn scan_dir(&self, dir: &str, observer: &mut dyn ScanObserver) -> Result<()> {
        self.record(Call::ScanDir(dir.to_string()));
        if self.panics_on.as_deref() == Some(dir) {
            panic!("scripted scan failure for {dir}");
        }
        let entries = self.dirs.get(dir).ok_or_else(|| not_found(dir, "read_dir"))?;
        for (path, time) in entries {
            observer.entry(path, *time);
        }
        Ok(())
    }

    fn scan_archive(&self, archive: &str, observer: &mut dyn ScanObserver) -> Result<()> {
        self.record(Call::ScanArchive(archive.to_string()));
        let members = self
            .archives
            .get(archive)
            .ok_or_else(|| not_found(archive, "open"))?;
        for (path, time) in members {
            observer.entry(path, Some(*time));
        }
        Ok(())
    }

    fn file_time(&self, path: &str) -> Result<Timestamp> {
        self.record(Call::FileTime(path.to_string()));
        self.times
            .get(path)
            .copied()
            .ok_or_else(|| not_found(path, "metadata"))
    }
}
