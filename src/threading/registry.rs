//! The id → guest thread registry.
//!
//! Ids are the smallest value not currently in use, starting from
//! [`ThreadId::FIRST`]; `0` and `u64::MAX` are never assigned. A removed id
//! may be handed out again by a later registration.
//!
//! All operations run under one mutex, and nothing that blocks (spawning,
//! joining) ever happens while it is held. [`ThreadRegistry::remove`]
//! hands the registry's reference back to the caller instead of dropping
//! it, so a guest thread is never destroyed with the lock held.
use super::{
    handle::{GuestThread, ThreadRef},
    roots::GcRoot,
};
use crate::{
    error::ThreadError,
    utils::{
        ThreadId,
        sync::{LazyLock, Mutex},
    },
};
use std::collections::{BTreeMap, BTreeSet};

struct RegistryState {
    threads: BTreeMap<ThreadId, ThreadRef>,
    /// Ids below `next` that are not in `threads`.
    free: BTreeSet<ThreadId>,
    next: ThreadId,
}

impl RegistryState {
    fn allocate(&mut self) -> ThreadId {
        if let Some(id) = self.free.pop_first() {
            return id;
        }
        let id = self.next;
        assert!(id != ThreadId::INVALID, "guest thread ids exhausted");
        self.next = ThreadId(id.as_u64() + 1);
        id
    }
}

pub struct ThreadRegistry {
    state: Mutex<RegistryState>,
}

/// The process-wide registry used by the thread operations. Created on
/// first use and never torn down.
pub fn global() -> &'static ThreadRegistry {
    static THREADS: LazyLock<ThreadRegistry> = LazyLock::new(ThreadRegistry::new);
    &THREADS
}

impl ThreadRegistry {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState {
                threads: BTreeMap::new(),
                free: BTreeSet::new(),
                next: ThreadId::FIRST,
            }),
        }
    }

    /// Stores `thread` under a fresh id and returns the id.
    pub fn register(&self, thread: ThreadRef) -> ThreadId {
        let mut state = self.state.lock();
        assert!(
            !thread.id().is_valid(),
            "guest thread {} registered twice",
            thread.id()
        );
        let id = state.allocate();
        thread.set_id(id);
        let previous = state.threads.insert(id, thread);
        assert!(previous.is_none(), "thread id {id} assigned to two guest threads");
        id
    }

    pub fn contains(&self, id: ThreadId) -> bool {
        id.is_valid() && self.state.lock().threads.contains_key(&id)
    }

    /// Removes `id` and returns the registry's reference to it.
    ///
    /// Unknown and sentinel ids fail without touching the registry.
    pub fn remove(&self, id: ThreadId) -> Result<ThreadRef, ThreadError> {
        if !id.is_valid() {
            return Err(ThreadError::UnknownThread(id.as_u64()));
        }

        let mut state = self.state.lock();
        let thread = state
            .threads
            .remove(&id)
            .ok_or(ThreadError::UnknownThread(id.as_u64()))?;
        assert_eq!(thread.id(), id, "registry slot and guest thread disagree on id");
        thread.set_id(ThreadId::INVALID);
        state.free.insert(id);
        Ok(thread)
    }

    pub fn len(&self) -> usize {
        self.state.lock().threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered ids in ascending order.
    pub fn ids(&self) -> Vec<ThreadId> {
        self.state.lock().threads.keys().copied().collect()
    }

    /// Number of live references to the guest thread registered as `id`.
    pub fn ref_count(&self, id: ThreadId) -> Option<usize> {
        self.state.lock().threads.get(&id).map(ThreadRef::ref_count)
    }

    /// Visits every registered guest thread with the lock held.
    ///
    /// `visit` must not call back into this registry.
    pub fn for_each(&self, mut visit: impl FnMut(&GuestThread)) {
        for thread in self.state.lock().threads.values() {
            visit(thread);
        }
    }

    pub fn trace(&self, mut visit: impl FnMut(GcRoot<'_>)) {
        self.for_each(|thread| thread.trace(&mut visit));
    }
}

impl Default for ThreadRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ThreadRegistry {
    fn drop(&mut self) {
        for thread in self.state.get_mut().threads.values() {
            thread.set_id(ThreadId::INVALID);
        }
    }
}
