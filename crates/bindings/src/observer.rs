//! Routes scan reports into the binding store

use crate::BindingStore;
use bindstamp_filesys::ScanObserver;
use bindstamp_pathsys::KeyStyle;
use bindstamp_timestamp::Timestamp;

/// Observer handed to the scanners while a container is being enumerated.
pub(crate) struct StoreObserver<'a> {
    pub(crate) store: &'a BindingStore,
    pub(crate) key_style: KeyStyle,
    pub(crate) trace: bool,
    pub(crate) reported: usize,
}

impl ScanObserver for StoreObserver<'_> {
    fn entry(&mut self, path: &str, time: Option<Timestamp>) {
        let key = self.key_style.key(path);
        let progress = self.store.record_entry(&key, time);
        self.reported += 1;
        if self.trace {
            tracing::info!(target: "bindscan", "time ( {key} ) : {progress}");
        }
    }
}
