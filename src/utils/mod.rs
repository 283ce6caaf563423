//! Utility types and functions used throughout the codebase.

pub mod newtypes;
pub mod sync;

pub use newtypes::ThreadId;
