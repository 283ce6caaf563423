//! Small guest programs used by the command line driver and the tests.
//!
//! Each constructor returns a host-defined [`Function`] that behaves like a
//! guest function: it is called through a [`Caller`](crate::runtime::Caller)
//! and reaches threads only through the public threading operations.
use crate::{
    error::Trap,
    runtime::{Function, FunctionType, Value, ValueType},
    threading::{self, continuation_signature, entry_signature},
    utils::ThreadId,
};

fn int_argument(args: &[Value]) -> i32 {
    match args {
        [Value::I32(n)] => *n,
        // Arguments are checked against the signature before the body runs.
        other => unreachable!("entry called with {other:?}"),
    }
}

/// Thread entry computing `n!` for its argument. Negative inputs yield 1.
pub fn factorial() -> Function {
    Function::new("factorial", entry_signature(), |_, args| {
        let n = int_argument(args);
        let result = (1..=i64::from(n)).fold(1i64, |acc, k| acc.wrapping_mul(k));
        Ok(vec![Value::I64(result)])
    })
}

/// Thread entry summing `1..=n`.
pub fn sum_to() -> Function {
    Function::new("sum_to", entry_signature(), |_, args| {
        let n = i64::from(int_argument(args));
        Ok(vec![Value::I64((1..=n).sum())])
    })
}

/// Thread entry that ends its thread through `exit_thread` with its
/// argument as the exit code, skipping the normal return.
pub fn exit_with() -> Function {
    Function::new("exit_with", entry_signature(), |_, args| {
        threading::exit_thread(i64::from(int_argument(args)))
    })
}

/// Thread entry that forks itself `depth` levels deep.
///
/// Every side of every fork continues with the next stage, so `depth`
/// levels produce `2^depth - 1` forked threads. Each side joins the thread
/// it was told about and adds up what the leaves report, so the entry
/// returns `2^depth`.
pub fn fork_fan_out(depth: u32) -> Function {
    let mut first = fan_out_stage(depth, None);
    for level in (0..depth).rev() {
        first = fan_out_stage(level, Some(first));
    }

    Function::new("fork_fan_out", entry_signature(), move |caller, _| {
        caller.call(&first, &[Value::I64(0)])
    })
}

fn fan_out_stage(level: u32, next: Option<Function>) -> Function {
    Function::new(
        format!("fan_out_stage_{level}"),
        continuation_signature(),
        move |caller, args| {
            let forked = match args {
                [Value::I64(id)] => *id,
                other => unreachable!("stage called with {other:?}"),
            };

            let own = match &next {
                Some(next) => threading::fork_and_continue(caller, next)?,
                None => 1,
            };
            let joined = if forked > 0 {
                threading::join_thread(ThreadId::new(forked as u64))?
            } else {
                0
            };
            Ok(vec![Value::I64(own + joined)])
        },
    )
}

/// `name : (params) -> (results)`.
pub fn describe(function: &Function) -> String {
    format!("{} : {}", function.name(), function.ty())
}

/// A function with a signature no thread operation accepts.
pub fn mismatched() -> Function {
    Function::new(
        "mismatched",
        FunctionType::new([ValueType::I32], [ValueType::I64]),
        |_, _| Err(Trap::Guest("mismatched entry was invoked".into())),
    )
}
