use guest_threads::{
    error::{ErrorKind, Trap},
    intrinsics::{ModuleInstance, threadtest},
    programs,
    runtime::{Compartment, Context, Function, Value, invoke_function},
    threading::{continuation_signature, entry_signature},
};

struct Guest {
    context: Context,
    module: ModuleInstance,
}

impl Guest {
    fn new() -> Self {
        let compartment = Compartment::new();
        Self {
            context: compartment.create_context(),
            module: threadtest::instantiate(&compartment),
        }
    }

    fn export(&self, name: &str) -> Function {
        self.module.export(name).cloned().unwrap()
    }

    fn call(&self, name: &str, args: &[Value]) -> Result<Vec<Value>, Trap> {
        invoke_function(&self.context, &self.export(name), args)
    }

    fn create(&self, entry: &Function, argument: i32) -> Result<i64, Trap> {
        let results = self.call(
            "createThread",
            &[Value::FuncRef(Some(entry.clone())), Value::I32(argument)],
        )?;
        Ok(results[0].as_i64().unwrap())
    }

    fn join(&self, id: i64) -> Result<i64, Trap> {
        let results = self.call("joinThread", &[Value::I64(id)])?;
        Ok(results[0].as_i64().unwrap())
    }
}

#[test]
fn create_and_join_by_export() {
    let guest = Guest::new();
    let id = guest.create(&programs::factorial(), 5).unwrap();
    assert!(id > 0);
    assert_eq!(guest.join(id).unwrap(), 120);
}

#[test]
fn errors_surface_as_traps() {
    let guest = Guest::new();

    let err = guest.join(0).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::InvalidArgument));
    let err = guest.join(-1).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::InvalidArgument));
    let err = guest.call("detachThread", &[Value::I64(0)]).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::InvalidArgument));

    let err = guest
        .call("createThread", &[Value::FuncRef(None), Value::I32(0)])
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::InvalidArgument));

    let err = guest.create(&programs::mismatched(), 0).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::SignatureMismatch));

    let err = guest.call("createThread", &[Value::I32(0)]).unwrap_err();
    assert!(matches!(err, Trap::ArgumentMismatch { .. }));
}

#[test]
fn exit_by_export() {
    let guest = Guest::new();
    let exit = guest.export("exitThread");
    let entry = Function::new("exits", entry_signature(), move |caller, args| {
        let [Value::I32(code)] = args else {
            unreachable!()
        };
        caller.call(&exit, &[Value::I64(i64::from(*code) * 2)])?;
        Ok(vec![Value::I64(-1)])
    });

    let id = guest.create(&entry, 21).unwrap();
    assert_eq!(guest.join(id).unwrap(), 42);
}

#[test]
fn fork_by_export() {
    let guest = Guest::new();
    let fork = guest.export("forkThread");
    let join = guest.export("joinThread");

    let continuation = Function::new("after_fork", continuation_signature(), |_, args| {
        Ok(vec![args[0].clone()])
    });
    let entry = Function::new("forks", entry_signature(), move |caller, _| {
        let results = caller.call(&fork, &[Value::FuncRef(Some(continuation.clone()))])?;
        let forked = results[0].clone();
        // The duplicate ran `after_fork(0)`, so it exits with 0.
        let child = caller.call(&join, &[forked.clone()])?;
        match (&forked, &child[..]) {
            (Value::I64(id), [Value::I64(0)]) if *id > 0 => Ok(vec![Value::I64(1)]),
            _ => Ok(vec![Value::I64(0)]),
        }
    });

    let id = guest.create(&entry, 0).unwrap();
    assert_eq!(guest.join(id).unwrap(), 1);
}

#[test]
fn detach_by_export() {
    let guest = Guest::new();
    let id = guest.create(&programs::sum_to(), 3).unwrap();
    assert!(guest.call("detachThread", &[Value::I64(id)]).unwrap().is_empty());
}
