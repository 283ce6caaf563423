use guest_threads::{
    error::{ErrorKind, ThreadError, Trap},
    programs,
    runtime::{Caller, Compartment, Function, Value},
    threading::{
        create_thread, current_thread_id, detach_thread, entry_signature, join_thread,
        registry,
    },
    utils::ThreadId,
};
use std::{
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Barrier, Mutex, MutexGuard},
    thread,
    time::{Duration, Instant},
};

// Ids are recycled smallest first, so tests that reason about a specific
// id being absent must not race with other tests in this binary.
static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

fn host_caller() -> (Compartment, Caller) {
    let compartment = Compartment::new();
    let caller = Caller::new(compartment.create_context());
    (compartment, caller)
}

/// An entry point that parks on `barrier` before returning its own id.
fn parked_entry(barrier: Arc<Barrier>) -> Function {
    Function::new("parked", entry_signature(), move |_, _| {
        barrier.wait();
        Ok(vec![Value::I64(current_thread_id().as_u64() as i64)])
    })
}

#[test]
fn create_and_join_returns_entry_result() {
    let _serial = serial();
    let (_compartment, caller) = host_caller();

    let id = create_thread(&caller, Some(&programs::factorial()), 5).unwrap();
    assert!(id.is_valid());
    assert_eq!(join_thread(id).unwrap(), 120);
    assert!(!registry::global().contains(id));
}

#[test]
fn exit_code_reaches_joiner() {
    let _serial = serial();
    let (_compartment, caller) = host_caller();

    let id = create_thread(&caller, Some(&programs::exit_with()), 42).unwrap();
    assert_eq!(join_thread(id).unwrap(), 42);

    let id = create_thread(&caller, Some(&programs::exit_with()), -1).unwrap();
    assert_eq!(join_thread(id).unwrap(), -1);
}

#[test]
fn exit_from_nested_call_skips_the_rest() {
    let _serial = serial();
    let (_compartment, caller) = host_caller();

    let inner = programs::exit_with();
    let entry = Function::new("outer", entry_signature(), move |caller, args| {
        caller.call(&inner, args)?;
        Err(Trap::Guest("unreachable after exit".into()))
    });

    let id = create_thread(&caller, Some(&entry), 9).unwrap();
    assert_eq!(join_thread(id).unwrap(), 9);
}

#[test]
fn thread_sees_its_own_id() {
    let _serial = serial();
    let (_compartment, caller) = host_caller();
    let barrier = Arc::new(Barrier::new(2));

    let id = create_thread(&caller, Some(&parked_entry(barrier.clone())), 0).unwrap();
    // One reference in the registry, one in the running thread's cell.
    assert_eq!(registry::global().ref_count(id), Some(2));
    barrier.wait();

    assert_eq!(join_thread(id).unwrap(), id.as_u64() as i64);
    assert_eq!(current_thread_id(), ThreadId::INVALID);
}

#[test]
fn join_and_detach_reject_unknown_ids() {
    let _serial = serial();
    for raw in [0, u64::MAX, u64::MAX - 1] {
        let id = ThreadId::new(raw);
        let err = join_thread(id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err, ThreadError::UnknownThread(raw));
        assert_eq!(
            detach_thread(id).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
    }
}

#[test]
fn second_join_is_rejected() {
    let _serial = serial();
    let (_compartment, caller) = host_caller();

    let id = create_thread(&caller, Some(&programs::sum_to()), 10).unwrap();
    assert_eq!(join_thread(id).unwrap(), 55);
    assert_eq!(join_thread(id).unwrap_err().kind(), ErrorKind::InvalidArgument);
    assert_eq!(detach_thread(id).unwrap_err().kind(), ErrorKind::InvalidArgument);
}

#[test]
fn detach_unregisters() {
    let _serial = serial();
    let (compartment, caller) = host_caller();
    let barrier = Arc::new(Barrier::new(2));

    let id = create_thread(&caller, Some(&parked_entry(barrier.clone())), 0).unwrap();
    detach_thread(id).unwrap();
    assert!(!registry::global().contains(id));
    assert_eq!(join_thread(id).unwrap_err().kind(), ErrorKind::InvalidArgument);
    assert_eq!(compartment.live_contexts(), 2);

    // The detached thread still runs to completion, and its handle goes
    // with it.
    barrier.wait();
    let deadline = Instant::now() + Duration::from_secs(10);
    while compartment.live_contexts() > 1 {
        assert!(Instant::now() < deadline, "detached thread was never freed");
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn bad_entry_points_are_rejected_before_registration() {
    let _serial = serial();
    let (compartment, caller) = host_caller();
    let before = registry::global().len();

    let err = create_thread(&caller, None, 1).unwrap_err();
    assert_eq!(err, ThreadError::NullFunction);
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = create_thread(&caller, Some(&programs::mismatched()), 1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SignatureMismatch);
    assert_eq!(
        err.to_string(),
        "indirect call signature mismatch: expected (i32) -> (i64), got (i64) -> (i32)"
    );

    assert_eq!(registry::global().len(), before);
    assert_eq!(compartment.live_contexts(), 1);
}

#[test]
fn joined_thread_releases_its_context() {
    let _serial = serial();
    let (compartment, caller) = host_caller();

    let id = create_thread(&caller, Some(&programs::factorial()), 3).unwrap();
    assert_eq!(join_thread(id).unwrap(), 6);

    assert_eq!(compartment.live_contexts(), 1);
    assert_eq!(compartment.collect_garbage(), 1);
}

#[test]
fn trap_in_thread_surfaces_at_join() {
    let _serial = serial();
    let (_compartment, caller) = host_caller();

    let failing = Function::new("failing", entry_signature(), |_, _| {
        Err(Trap::Guest("boom".into()))
    });
    let id = create_thread(&caller, Some(&failing), 0).unwrap();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| join_thread(id)));
    assert!(outcome.is_err());
    assert!(!registry::global().contains(id));
}

#[test]
fn concurrent_creates_get_distinct_ids() {
    let _serial = serial();
    const CREATORS: usize = 8;
    const PER_CREATOR: i32 = 4;

    let ids: Vec<(ThreadId, i32)> = thread::scope(|s| {
        let handles: Vec<_> = (0..CREATORS)
            .map(|_| {
                s.spawn(|| {
                    let (_compartment, caller) = host_caller();
                    (1..=PER_CREATOR)
                        .map(|n| {
                            let id = create_thread(&caller, Some(&programs::sum_to()), n).unwrap();
                            (id, n)
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
    });

    let mut raw: Vec<_> = ids.iter().map(|(id, _)| id.as_u64()).collect();
    raw.sort_unstable();
    raw.dedup();
    assert_eq!(raw.len(), CREATORS * PER_CREATOR as usize);
    assert!(raw.iter().all(|&id| ThreadId::new(id).is_valid()));

    for (id, _) in &ids {
        assert!(registry::global().contains(*id));
    }
    for (id, n) in ids {
        let n = i64::from(n);
        assert_eq!(join_thread(id).unwrap(), n * (n + 1) / 2);
    }
}

#[test]
fn freed_ids_are_reused() {
    let _serial = serial();
    let (_compartment, caller) = host_caller();

    let first = create_thread(&caller, Some(&programs::sum_to()), 1).unwrap();
    join_thread(first).unwrap();
    let second = create_thread(&caller, Some(&programs::sum_to()), 1).unwrap();
    assert_eq!(second, first);
    join_thread(second).unwrap();
}
