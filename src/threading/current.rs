//! The current-thread cell.
//!
//! Each native thread started for guest code owns one [`ThreadRef`] to the
//! guest thread it serves. The cell is written once when the thread starts
//! and emptied once when its routine finishes; native threads the
//! subsystem did not start (such as the host's main thread) have an empty
//! cell.
use super::handle::{GuestThread, ThreadRef};
use crate::utils::ThreadId;
use std::cell::RefCell;

thread_local! {
    static CURRENT_THREAD: RefCell<Option<ThreadRef>> = const { RefCell::new(None) };
}

/// Moves `thread` into this native thread's cell.
///
/// Kept out of line so that a forked continuation always writes the cell of
/// the native thread it is actually running on.
#[inline(never)]
pub(super) fn set_current_thread(thread: ThreadRef) {
    CURRENT_THREAD.with(|cell| {
        let mut slot = cell.borrow_mut();
        assert!(
            slot.is_none(),
            "current guest thread set twice on native thread {:?}",
            std::thread::current().id()
        );
        *slot = Some(thread);
    });
}

/// Empties the cell, releasing its reference.
pub(super) fn retire_current_thread() {
    let retired = CURRENT_THREAD.with(|cell| cell.borrow_mut().take());
    if let Some(thread) = retired {
        thread.release();
    }
}

pub fn with_current_thread<R>(f: impl FnOnce(Option<&GuestThread>) -> R) -> R {
    CURRENT_THREAD.with(|cell| f(cell.borrow().as_deref()))
}

/// A new reference to the guest thread this native thread is serving.
pub fn current_thread() -> Option<ThreadRef> {
    CURRENT_THREAD.with(|cell| cell.borrow().as_ref().map(ThreadRef::acquire))
}

/// The id of the current guest thread; [`ThreadId::INVALID`] if there is
/// none or it is not registered (yet, or any more).
pub fn current_thread_id() -> ThreadId {
    with_current_thread(|thread| thread.map_or(ThreadId::INVALID, GuestThread::id))
}
