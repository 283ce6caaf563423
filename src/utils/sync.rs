//! Basic synchronization primitives.
//!
//! The thread subsystem always runs on real OS threads, so this is a thin
//! re-export of `parking_lot` locks next to the std atomics and shared
//! pointers. Low-level modules depend on this rather than naming the
//! crates directly.
pub use parking_lot::{Condvar, Mutex, MutexGuard};

pub use std::sync::{
    Arc, LazyLock, OnceLock, Weak,
    atomic::{AtomicU64, AtomicUsize, Ordering},
};
