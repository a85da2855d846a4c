//! The process-wide binding table
//!
//! One mutex guards the whole table. Resolvers never hold it across a call
//! into a [`bindstamp_filesys::FileSystem`]; long-running work is claimed by
//! flagging the binding instead, and other threads wait on the condition
//! variable until the claim is released.

use crate::binding::{Binding, BindingId};
use crate::Progress;
use bindstamp_timestamp::Timestamp;
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::collections::HashMap;
use std::ops::{Index, IndexMut};
use std::sync::Arc;

#[derive(Debug, Default)]
pub(crate) struct Table {
    index: HashMap<Arc<str>, BindingId>,
    bindings: Vec<Binding>,
}

impl Table {
    /// Returns the binding for `key`, creating it in `INIT` if absent.
    pub(crate) fn get_or_create(&mut self, key: &str) -> (BindingId, bool) {
        if let Some(&id) = self.index.get(key) {
            return (id, true);
        }
        let key: Arc<str> = Arc::from(key);
        let id = BindingId(self.bindings.len());
        self.bindings.push(Binding::new(Arc::clone(&key)));
        self.index.insert(key, id);
        (id, false)
    }

    fn lookup(&self, key: &str) -> Option<&Binding> {
        self.index.get(key).map(|&id| &self[id])
    }
}

impl Index<BindingId> for Table {
    type Output = Binding;

    fn index(&self, id: BindingId) -> &Binding {
        &self.bindings[id.0]
    }
}

impl IndexMut<BindingId> for Table {
    fn index_mut(&mut self, id: BindingId) -> &mut Binding {
        &mut self.bindings[id.0]
    }
}

/// Locked view of the table, allocating it on first use.
pub(crate) struct StoreGuard<'a> {
    guard: MutexGuard<'a, Option<Table>>,
    settled: &'a Condvar,
}

impl StoreGuard<'_> {
    pub(crate) fn table(&mut self) -> &mut Table {
        self.guard.get_or_insert_with(Table::default)
    }

    /// Releases the lock until some claim is released, then reacquires it.
    pub(crate) fn wait(&mut self) {
        self.settled.wait(&mut self.guard);
    }
}

/// Map from canonical path key to [`Binding`].
///
/// The table is allocated on first insertion. Every method takes the store
/// lock for its own duration only.
#[derive(Debug, Default)]
pub struct BindingStore {
    table: Mutex<Option<Table>>,
    settled: Condvar,
}

impl BindingStore {
    /// Creates an empty, unallocated store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn lock(&self) -> StoreGuard<'_> {
        StoreGuard {
            guard: self.table.lock(),
            settled: &self.settled,
        }
    }

    /// Wakes every thread waiting for a claim to be released.
    pub(crate) fn notify(&self) {
        self.settled.notify_all();
    }

    /// Returns the binding for `key`, creating it if absent.
    ///
    /// The flag is true when the binding already existed.
    pub fn get_or_create(&self, key: &str) -> (BindingId, bool) {
        self.lock().table().get_or_create(key)
    }

    /// Snapshot of a binding by handle.
    #[must_use]
    pub fn binding(&self, id: BindingId) -> Option<Binding> {
        self.table
            .lock()
            .as_ref()
            .and_then(|table| table.bindings.get(id.0))
            .cloned()
    }

    /// Snapshot of the binding for `key`, if one exists.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<Binding> {
        self.table
            .lock()
            .as_ref()
            .and_then(|table| table.lookup(key))
            .cloned()
    }

    /// Applies one scan report to the binding for `key`.
    ///
    /// A report with a time moves the binding to `FOUND`; one without moves
    /// it to `SPOTTED` with its time cleared. Returns the resulting progress.
    pub fn record_entry(&self, key: &str, time: Option<Timestamp>) -> Progress {
        let mut guard = self.lock();
        let table = guard.table();
        let (id, _) = table.get_or_create(key);
        let binding = &mut table[id];
        match time {
            Some(time) => {
                binding.time = time;
                binding.progress = Progress::Found;
            }
            None => {
                binding.time.clear();
                binding.progress = Progress::Spotted;
            }
        }
        binding.progress
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.lock().as_ref().map_or(0, |table| table.bindings.len())
    }

    /// True when the store holds no bindings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True once the table has been allocated.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.table.lock().is_some()
    }

    /// Releases every binding and returns how many there were.
    ///
    /// Does nothing on a store that was never used. Exclusive access means no
    /// resolution can be in flight; outstanding [`BindingId`]s become invalid.
    pub fn teardown(&mut self) -> usize {
        let released = self
            .table
            .get_mut()
            .take()
            .map_or(0, |table| table.bindings.len());
        if released > 0 {
            tracing::debug!(bindings = released, "Released binding table");
        }
        released
    }
}
