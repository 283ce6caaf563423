//! Native thread primitives.
//!
//! Guest threads map 1:1 onto OS threads spawned through [`spawn`]. A
//! thread ends early through [`exit_current`], which unwinds the calling
//! thread with a private payload; [`exit_code`] turns that payload back
//! into the thread's result. Builds with `panic = "abort"` therefore
//! cannot exit threads early.
use std::{
    any::Any,
    panic,
    thread::{self, JoinHandle},
};

/// Unwinding payload carrying the code passed to [`exit_current`].
struct ThreadExit(i64);

#[derive(Debug)]
pub struct NativeThread {
    handle: JoinHandle<i64>,
}

impl NativeThread {
    pub fn name(&self) -> Option<&str> {
        self.handle.thread().name()
    }

    /// Blocks until the thread has terminated and returns its exit code.
    ///
    /// If the thread died from a panic, the panic continues on the joining
    /// thread.
    pub fn join(self) -> i64 {
        match self.handle.join() {
            Ok(code) => code,
            Err(payload) => exit_code(Err(payload)),
        }
    }

    /// Lets the thread run to completion on its own; its resources are
    /// reclaimed when it finishes.
    pub fn detach(self) {
        drop(self.handle);
    }
}

/// Spawns a native thread with a `stack_bytes` stack running `routine`.
///
/// Failing to create an OS thread is fatal.
pub fn spawn<F>(stack_bytes: usize, name: String, routine: F) -> NativeThread
where
    F: FnOnce() -> i64 + Send + 'static,
{
    let builder = thread::Builder::new().name(name).stack_size(stack_bytes);
    match builder.spawn(routine) {
        Ok(handle) => NativeThread { handle },
        Err(err) => panic!("failed to spawn native thread: {err}"),
    }
}

/// Terminates the calling thread with `code`. Does not return.
pub fn exit_current(code: i64) -> ! {
    panic::resume_unwind(Box::new(ThreadExit(code)))
}

/// Resolves the outcome of a caught thread body to an exit code: a normal
/// return or an [`exit_current`] yields its code, any other panic resumes.
pub fn exit_code(outcome: Result<i64, Box<dyn Any + Send>>) -> i64 {
    match outcome {
        Ok(code) => code,
        Err(payload) => match payload.downcast::<ThreadExit>() {
            Ok(exit) => exit.0,
            Err(payload) => panic::resume_unwind(payload),
        },
    }
}
