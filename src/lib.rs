//! # guest-threads
//!
//! Lifecycle management for threads created by guest code: create, fork,
//! exit, join and detach, backed by real native threads.
//!
//! A guest thread is identified by a small integer id handed out by a
//! process-wide [registry](threading::registry). Ids are recycled smallest
//! first; `0` and `u64::MAX` are never issued.
//!
//! ## Configuration
//!
//! - `GUEST_THREADS_STACK_BYTES`: stack size of every native thread spawned
//!   for a guest thread (default 1 MiB, at least 64 KiB).
//! - `GUEST_THREADS_NAME_PREFIX`: prefix of native thread names (default
//!   `guest`).
//!
//! `exitThread` unwinds the native thread it is called on, so the crate
//! must not be built with `panic = "abort"`.
pub mod cli;
pub mod config;
pub mod error;
pub mod intrinsics;
pub mod metrics;
pub mod programs;
pub mod runtime;
pub mod threading;
pub mod utils;

pub use error::{ErrorKind, ThreadError, Trap};
pub use threading::{create_thread, detach_thread, exit_thread, fork_thread, join_thread};
pub use utils::ThreadId;
