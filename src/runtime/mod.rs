//! The host side of guest execution.
//!
//! Guest code here is a set of host closures with WebAssembly-like
//! signatures. What matters to the thread subsystem is the shape of the
//! collaboration, not the guest language:
//!
//! - [`Compartment`] / [`Context`]: create, clone and track isolated
//!   execution state.
//! - [`Function`] / [`FunctionType`] / [`Value`]: entry points, their
//!   signatures and arguments.
//! - [`invoke_function`] / [`Caller`]: run a function inside a context.
mod context;
mod function;
mod invoke;
mod value;

pub use context::{Compartment, Context};
pub use function::Function;
pub use invoke::{Caller, invoke_function};
pub use value::{FunctionType, Value, ValueType};
