//! The `threadTest` intrinsic module.
//!
//! | export         | signature               |
//! |----------------|-------------------------|
//! | `createThread` | `(funcref, i32) -> (i64)` |
//! | `forkThread`   | `(funcref) -> (i64)`      |
//! | `exitThread`   | `(i64) -> ()`             |
//! | `joinThread`   | `(i64) -> (i64)`          |
//! | `detachThread` | `(i64) -> ()`             |
//!
//! Thread ids cross the guest boundary as the bits of an `i64`.
use super::ModuleInstance;
use crate::{
    error::Trap,
    runtime::{Compartment, Function, FunctionType, Value, ValueType},
    threading,
    utils::ThreadId,
};

pub const MODULE_NAME: &str = "threadTest";

pub fn instantiate(compartment: &Compartment) -> ModuleInstance {
    ModuleInstance::new(
        MODULE_NAME,
        compartment,
        [
            create_thread(),
            fork_thread(),
            exit_thread(),
            join_thread(),
            detach_thread(),
        ],
    )
}

fn bad_arguments(ty: FunctionType, args: &[Value]) -> Trap {
    Trap::ArgumentMismatch {
        expected: ty,
        actual: args.iter().map(Value::ty).collect(),
    }
}

fn id_to_guest(id: ThreadId) -> Value {
    Value::I64(id.as_u64() as i64)
}

fn id_from_guest(raw: i64) -> ThreadId {
    ThreadId::new(raw as u64)
}

fn create_thread() -> Function {
    let ty = FunctionType::new([ValueType::I64], [ValueType::FuncRef, ValueType::I32]);
    Function::new("createThread", ty.clone(), move |caller, args| {
        let [Value::FuncRef(entry), Value::I32(argument)] = args else {
            return Err(bad_arguments(ty.clone(), args));
        };
        let id = threading::create_thread(caller, entry.as_ref(), *argument)?;
        Ok(vec![id_to_guest(id)])
    })
}

fn fork_thread() -> Function {
    let ty = FunctionType::new([ValueType::I64], [ValueType::FuncRef]);
    Function::new("forkThread", ty.clone(), move |caller, args| {
        let [Value::FuncRef(continuation)] = args else {
            return Err(bad_arguments(ty.clone(), args));
        };
        let id = threading::fork_thread(caller, continuation.as_ref())?;
        Ok(vec![id_to_guest(id)])
    })
}

fn exit_thread() -> Function {
    let ty = FunctionType::new([], [ValueType::I64]);
    Function::new("exitThread", ty.clone(), move |_, args| {
        let [Value::I64(code)] = args else {
            return Err(bad_arguments(ty.clone(), args));
        };
        threading::exit_thread(*code)
    })
}

fn join_thread() -> Function {
    let ty = FunctionType::new([ValueType::I64], [ValueType::I64]);
    Function::new("joinThread", ty.clone(), move |_, args| {
        let [Value::I64(id)] = args else {
            return Err(bad_arguments(ty.clone(), args));
        };
        let result = threading::join_thread(id_from_guest(*id))?;
        Ok(vec![Value::I64(result)])
    })
}

fn detach_thread() -> Function {
    let ty = FunctionType::new([], [ValueType::I64]);
    Function::new("detachThread", ty.clone(), move |_, args| {
        let [Value::I64(id)] = args else {
            return Err(bad_arguments(ty.clone(), args));
        };
        threading::detach_thread(id_from_guest(*id))?;
        Ok(Vec::new())
    })
}
