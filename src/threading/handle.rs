//! Reference-counted guest thread records.
use super::native::NativeThread;
use crate::{
    metrics::ThreadMetrics,
    runtime::{Context, Function, Value},
    utils::{
        ThreadId,
        sync::{Arc, AtomicU64, Condvar, Mutex, Ordering},
    },
};
use std::{
    fmt::{self, Debug, Formatter},
    mem,
    ops::Deref,
};
use tracing::trace;

#[derive(Debug)]
enum NativeSlot {
    /// Registered (or about to be) but the spawn has not returned yet.
    Pending,
    Spawned(NativeThread),
    /// Joined or detached.
    Released,
}

/// One logical guest thread.
///
/// Holds the thread's execution context together with the entry point and
/// argument it was started with; a forked thread inherits the entry point
/// and argument of the thread that forked it. Everything in here stays
/// rooted for as long as any [`ThreadRef`] to it exists.
pub struct GuestThread {
    id: AtomicU64,
    context: Context,
    entry_function: Function,
    argument: Value,
    native: Mutex<NativeSlot>,
    native_published: Condvar,
}

impl GuestThread {
    /// The registry id, or [`ThreadId::INVALID`] while unregistered.
    pub fn id(&self) -> ThreadId {
        ThreadId(self.id.load(Ordering::Acquire))
    }

    /// Only the registry writes ids, and only while holding its lock.
    pub(super) fn set_id(&self, id: ThreadId) {
        self.id.store(id.as_u64(), Ordering::Release);
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn entry_function(&self) -> &Function {
        &self.entry_function
    }

    pub fn argument(&self) -> &Value {
        &self.argument
    }

    pub fn has_native_thread(&self) -> bool {
        matches!(*self.native.lock(), NativeSlot::Spawned(_))
    }

    pub(super) fn publish_native(&self, native: NativeThread) {
        let mut slot = self.native.lock();
        assert!(
            matches!(*slot, NativeSlot::Pending),
            "native thread for guest thread {} published twice",
            self.id()
        );
        *slot = NativeSlot::Spawned(native);
        self.native_published.notify_all();
    }

    /// Takes the native thread out of the handle, waiting for the spawning
    /// thread to publish it if necessary.
    pub(super) fn take_native(&self) -> NativeThread {
        let mut slot = self.native.lock();
        // Only `Pending` while a create or fork of this thread is still in flight.
        while matches!(*slot, NativeSlot::Pending) {
            self.native_published.wait(&mut slot);
        }
        match mem::replace(&mut *slot, NativeSlot::Released) {
            NativeSlot::Spawned(native) => native,
            _ => panic!("native thread of guest thread {} was already released", self.id()),
        }
    }
}

impl Drop for GuestThread {
    fn drop(&mut self) {
        debug_assert!(
            !self.id().is_valid(),
            "guest thread {} destroyed while still registered",
            self.id()
        );
        trace!(context = ?self.context, "destroyed guest thread");
        ThreadMetrics::global().record_destroyed();
    }
}

impl Debug for GuestThread {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuestThread")
            .field("id", &self.id())
            .field("context", &self.context)
            .field("entry_function", &self.entry_function)
            .field("argument", &self.argument)
            .finish_non_exhaustive()
    }
}

/// An owning reference to a [`GuestThread`].
///
/// Every place that stores a guest thread (a registry slot, a current-thread
/// cell, a spawn in flight) owns exactly one `ThreadRef`. There is no
/// `Clone`: a new reference is taken with [`acquire`](Self::acquire) and
/// given back with [`release`](Self::release) or by dropping it. The
/// thread is destroyed when its last reference goes away, on whichever
/// native thread that happens.
pub struct ThreadRef(Arc<GuestThread>);

impl ThreadRef {
    pub(crate) fn new(context: Context, entry_function: Function, argument: Value) -> Self {
        Self(Arc::new(GuestThread {
            id: AtomicU64::new(ThreadId::INVALID.as_u64()),
            context,
            entry_function,
            argument,
            native: Mutex::new(NativeSlot::Pending),
            native_published: Condvar::new(),
        }))
    }

    pub fn acquire(&self) -> ThreadRef {
        ThreadRef(Arc::clone(&self.0))
    }

    pub fn release(self) {
        trace!(
            thread_id = %self.id(),
            refs = self.ref_count() - 1,
            "released guest thread reference"
        );
    }

    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    pub fn ptr_eq(&self, other: &ThreadRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for ThreadRef {
    type Target = GuestThread;

    fn deref(&self) -> &GuestThread {
        &self.0
    }
}

impl Debug for ThreadRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ThreadRef({}, refs: {})", self.id(), self.ref_count())
    }
}
