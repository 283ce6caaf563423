//! Creating, exiting, joining and detaching guest threads.
use super::{current, handle::ThreadRef, native, registry};
use crate::{
    config::RuntimeConfig,
    error::ThreadError,
    metrics::ThreadMetrics,
    runtime::{Caller, Function, FunctionType, Value, ValueType},
    utils::ThreadId,
};
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error};

/// The signature every thread entry point must have: `(i32) -> (i64)`.
pub fn entry_signature() -> FunctionType {
    FunctionType::new([ValueType::I64], [ValueType::I32])
}

/// Validates a function reference against `expected` before anything is
/// allocated on its behalf.
pub(super) fn check_signature(
    function: Option<&Function>,
    expected: FunctionType,
) -> Result<&Function, ThreadError> {
    let function = function.ok_or(ThreadError::NullFunction)?;
    if *function.ty() != expected {
        return Err(ThreadError::SignatureMismatch {
            expected,
            actual: function.ty().clone(),
        });
    }
    Ok(function)
}

/// Starts `entry(argument)` on a new native thread in a fresh context of
/// the caller's compartment and returns the new thread's id without
/// waiting for it to run.
pub fn create_thread(
    caller: &Caller,
    entry: Option<&Function>,
    argument: i32,
) -> Result<ThreadId, ThreadError> {
    let entry = check_signature(entry, entry_signature())?;

    let context = caller.context().compartment().create_context();
    let thread = ThreadRef::new(context, entry.clone(), Value::I32(argument));
    let id = registry::global().register(thread.acquire());

    // Handed to the new native thread, which moves it into its cell.
    let spawn_ref = thread.acquire();
    let config = RuntimeConfig::global();
    let native = native::spawn(
        config.stack_bytes,
        format!("{}-{}", config.thread_name_prefix, id),
        move || thread_entry(spawn_ref),
    );
    thread.publish_native(native);

    ThreadMetrics::global().record_created();
    debug!(thread_id = %id, entry = entry.name(), argument, "created guest thread");
    thread.release();
    Ok(id)
}

fn thread_entry(thread: ThreadRef) -> i64 {
    let context = thread.context().clone();
    let entry = thread.entry_function().clone();
    let argument = thread.argument().clone();

    // From here on the cell holds the only reference this native thread has.
    current::set_current_thread(thread);

    run_guest_thread(Caller::new(context), &entry, argument)
}

/// Runs `function(argument)` in the caller's active context as the body of
/// a guest thread and returns its exit code. The current-thread cell is
/// emptied however the body ends.
pub(super) fn run_guest_thread(mut caller: Caller, function: &Function, argument: Value) -> i64 {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        match caller.call(function, &[argument]) {
            Ok(results) => match results.as_slice() {
                [Value::I64(code)] => *code,
                other => panic!("{} returned {other:?} as its exit code", function.name()),
            },
            Err(trap) => {
                error!(
                    thread_id = %current::current_thread_id(),
                    function = function.name(),
                    %trap,
                    "unhandled trap in guest thread"
                );
                panic!("unhandled trap in guest thread: {trap}");
            }
        }
    }));

    current::retire_current_thread();
    native::exit_code(outcome)
}

/// Terminates the calling native thread with `code`.
///
/// Registry entries and references are untouched; whoever joins or
/// detaches the thread cleans those up.
pub fn exit_thread(code: i64) -> ! {
    ThreadMetrics::global().record_exited();
    debug!(thread_id = %current::current_thread_id(), exit_code = code, "exiting guest thread");
    native::exit_current(code)
}

/// Unregisters `id`, waits for its native thread to terminate and returns
/// its exit code. Blocks for as long as the thread runs.
pub fn join_thread(id: ThreadId) -> Result<i64, ThreadError> {
    let thread = registry::global().remove(id)?;
    let code = thread.take_native().join();

    ThreadMetrics::global().record_joined();
    debug!(thread_id = %id, exit_code = code, "joined guest thread");
    thread.release();
    Ok(code)
}

/// Unregisters `id` and lets its native thread finish on its own.
pub fn detach_thread(id: ThreadId) -> Result<(), ThreadError> {
    let thread = registry::global().remove(id)?;
    thread.take_native().detach();

    ThreadMetrics::global().record_detached();
    debug!(thread_id = %id, "detached guest thread");
    thread.release();
    Ok(())
}
