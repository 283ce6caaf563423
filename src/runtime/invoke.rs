//! Calling guest functions.
//!
//! A [`Caller`] is the view guest code has of the thread it is running on:
//! which execution context is active. Thread operations that need the
//! caller's context (create clones under the caller's compartment, fork
//! clones the caller's context itself) take it as `&mut Caller`.
use super::{Context, Function, Value};
use crate::error::Trap;

#[derive(Debug)]
pub struct Caller {
    context: Context,
}

impl Caller {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Makes `context` the active context, returning the previous one.
    pub fn switch_context(&mut self, context: Context) -> Context {
        std::mem::replace(&mut self.context, context)
    }

    /// Calls `function` in the active context.
    pub fn call(&mut self, function: &Function, args: &[Value]) -> Result<Vec<Value>, Trap> {
        check_arguments(function, args)?;
        let results = function.call_body(self, args)?;
        check_results(function, &results)?;
        Ok(results)
    }
}

fn check_arguments(function: &Function, args: &[Value]) -> Result<(), Trap> {
    if function.ty().accepts(args) {
        Ok(())
    } else {
        Err(Trap::ArgumentMismatch {
            expected: function.ty().clone(),
            actual: args.iter().map(Value::ty).collect(),
        })
    }
}

fn check_results(function: &Function, results: &[Value]) -> Result<(), Trap> {
    let expected = function.ty().results();
    if results.len() == expected.len() && results.iter().zip(expected).all(|(r, t)| r.ty() == *t) {
        Ok(())
    } else {
        Err(Trap::Guest(format!(
            "{} returned {:?}, expected {:?}",
            function.name(),
            results.iter().map(Value::ty).collect::<Vec<_>>(),
            expected
        )))
    }
}

/// Calls `function` with `args` inside `context`, checking the arguments
/// against the function's signature first.
pub fn invoke_function(
    context: &Context,
    function: &Function,
    args: &[Value],
) -> Result<Vec<Value>, Trap> {
    Caller::new(context.clone()).call(function, args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{Compartment, FunctionType, ValueType};

    fn double() -> Function {
        Function::new(
            "double",
            FunctionType::new([ValueType::I64], [ValueType::I32]),
            |_, args| Ok(vec![Value::I64(args[0].as_i32().unwrap_or_default() as i64 * 2)]),
        )
    }

    #[test]
    fn invoke_checks_arguments() {
        let compartment = Compartment::new();
        let context = compartment.create_context();

        let results = invoke_function(&context, &double(), &[Value::I32(21)]).unwrap();
        assert_eq!(results, vec![Value::I64(42)]);

        let err = invoke_function(&context, &double(), &[Value::I64(21)]).unwrap_err();
        assert!(matches!(err, Trap::ArgumentMismatch { .. }));
    }

    #[test]
    fn bad_results_trap() {
        let compartment = Compartment::new();
        let liar = Function::new(
            "liar",
            FunctionType::new([ValueType::I64], []),
            |_, _| Ok(vec![Value::I32(0)]),
        );
        let err = invoke_function(&compartment.create_context(), &liar, &[]).unwrap_err();
        assert!(matches!(err, Trap::Guest(_)));
    }

    #[test]
    fn switch_context_returns_previous() {
        let compartment = Compartment::new();
        let first = compartment.create_context();
        let second = compartment.create_context();

        let mut caller = Caller::new(first.clone());
        let old = caller.switch_context(second.clone());
        assert!(old.ptr_eq(&first));
        assert!(caller.context().ptr_eq(&second));
    }
}
