//! Garbage collection roots held by guest threads.
//!
//! A guest thread keeps its context, entry point and argument alive for as
//! long as it is registered or installed in some native thread's
//! current-thread cell. Collectors that need to enumerate those roots
//! rather than rely on reference counts walk them through here.
use super::{current, handle::GuestThread, registry};
use crate::runtime::{Context, Function, Value};

#[derive(Debug, Clone, Copy)]
pub enum GcRoot<'a> {
    Context(&'a Context),
    Function(&'a Function),
    Value(&'a Value),
}

impl GuestThread {
    pub fn trace(&self, visit: &mut dyn FnMut(GcRoot<'_>)) {
        visit(GcRoot::Context(self.context()));
        visit(GcRoot::Function(self.entry_function()));
        visit(GcRoot::Value(self.argument()));
    }
}

/// Visits the roots of every registered guest thread.
pub fn trace_roots(visit: impl FnMut(GcRoot<'_>)) {
    registry::global().trace(visit);
}

/// Visits the roots held by the calling native thread's current-thread cell.
pub fn trace_current_thread(mut visit: impl FnMut(GcRoot<'_>)) {
    current::with_current_thread(|thread| {
        if let Some(thread) = thread {
            thread.trace(&mut visit);
        }
    });
}
