//! Forking a running guest thread.
//!
//! There is no portable way to duplicate a live native thread, so a fork
//! spawns a new native thread from an explicit snapshot instead: a clone
//! of the caller's context plus the continuation the caller wants both
//! sides to run after the fork point. The continuation is a guest function
//! of type `(i64) -> (i64)`. The original side gets the new thread's id
//! back from [`fork_thread`] and is expected to run the continuation
//! itself; the duplicate runs `continuation(0)` in the cloned context and
//! exits with its result. Guest state captured outside the context (host
//! locals, the caller's own stack) is not duplicated.
use super::{
    current,
    handle::ThreadRef,
    lifecycle::{check_signature, run_guest_thread},
    native, registry,
};
use crate::{
    config::RuntimeConfig,
    error::{ThreadError, Trap},
    metrics::ThreadMetrics,
    runtime::{Caller, Context, Function, FunctionType, Value, ValueType},
    utils::ThreadId,
};
use tracing::debug;

/// The signature of a fork continuation: `(i64) -> (i64)`.
pub fn continuation_signature() -> FunctionType {
    FunctionType::new([ValueType::I64], [ValueType::I64])
}

/// Everything the duplicate needs to start running.
struct ForkSnapshot {
    thread: ThreadRef,
    /// Starts out in the forking thread's context.
    caller: Caller,
    context: Context,
    continuation: Function,
}

impl ForkSnapshot {
    fn resume(self) -> i64 {
        let ForkSnapshot {
            thread,
            mut caller,
            context,
            continuation,
        } = self;

        // The cell takes over the reference acquired for the duplicate.
        current::set_current_thread(thread);

        // From here on the duplicate runs in the clone, and it observes 0.
        drop(caller.switch_context(context));
        run_guest_thread(caller, &continuation, Value::I64(0))
    }
}

/// Forks the calling guest thread.
///
/// Must be called from a native thread that is running a guest thread,
/// i.e. one started by [`create_thread`](super::create_thread) or by an
/// earlier fork.
pub fn fork_thread(caller: &Caller, continuation: Option<&Function>) -> Result<ThreadId, ThreadError> {
    let continuation = check_signature(continuation, continuation_signature())?.clone();

    let parent_context = caller.context();
    let context = parent_context.compartment().clone_context(parent_context);

    let (entry_function, argument) = current::with_current_thread(|current| {
        let Some(current) = current else {
            panic!("fork requires a native thread started for a guest thread");
        };
        (current.entry_function().clone(), current.argument().clone())
    });

    // Registered before the duplicate starts so it never observes an
    // unassigned id of its own.
    let child = ThreadRef::new(context.clone(), entry_function, argument);
    let id = registry::global().register(child.acquire());

    let snapshot = ForkSnapshot {
        thread: child.acquire(),
        caller: Caller::new(parent_context.clone()),
        context,
        continuation,
    };
    let config = RuntimeConfig::global();
    let native = native::spawn(
        config.stack_bytes,
        format!("{}-{}", config.thread_name_prefix, id),
        move || snapshot.resume(),
    );
    child.publish_native(native);

    ThreadMetrics::global().record_forked();
    debug!(
        thread_id = %id,
        parent = %current::current_thread_id(),
        "forked guest thread"
    );
    child.release();
    Ok(id)
}

/// Runs `continuation` on both sides of a fork of the calling thread: the
/// duplicate runs it with `0`, the caller runs it here with the new id and
/// returns its result.
pub fn fork_and_continue(caller: &mut Caller, continuation: &Function) -> Result<i64, Trap> {
    let id = fork_thread(caller, Some(continuation))?;
    let results = caller.call(continuation, &[Value::I64(id.as_u64() as i64)])?;
    match results.as_slice() {
        [Value::I64(result)] => Ok(*result),
        other => panic!("{} returned {other:?}", continuation.name()),
    }
}
