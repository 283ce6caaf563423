//! Guest-spawned threads.
//!
//! Guest code creates, forks, joins, detaches and exits threads that run
//! on real native threads. Each guest thread is a [`GuestThread`] reached
//! through owning [`ThreadRef`]s.
//!
//! # Ownership
//!
//! A guest thread is referenced from at most these places:
//!
//! - its slot in the [registry](registry::global), from registration until
//!   it is joined or detached;
//! - the current-thread cell of the native thread running it, from the
//!   moment that thread starts until its routine finishes;
//! - short-lived references on the stack while it is being created or
//!   forked, or while a join or detach is finishing.
//!
//! It is destroyed when the last of those goes away, which can happen on
//! any native thread and either before or after it leaves the registry.
//!
//! # State machine
//!
//! `Unregistered → Registered → Removed`, with destruction possible
//! whenever the reference count reaches zero after registration. The id of
//! a guest thread is valid exactly while it is registered.
//!
//! # Example
//!
//! ```ignore
//! let id = threading::create_thread(&caller, Some(&entry), 5)?;
//! let result = threading::join_thread(id)?;
//! ```
mod current;
mod fork;
mod handle;
mod lifecycle;
pub mod native;
pub mod registry;
mod roots;

pub use current::{current_thread, current_thread_id, with_current_thread};
pub use fork::{continuation_signature, fork_and_continue, fork_thread};
pub use handle::{GuestThread, ThreadRef};
pub use lifecycle::{create_thread, detach_thread, entry_signature, exit_thread, join_thread};
pub use registry::ThreadRegistry;
pub use roots::{GcRoot, trace_current_thread, trace_roots};
