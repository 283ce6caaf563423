use super::{Caller, FunctionType, Value};
use crate::{error::Trap, utils::sync::Arc};
use std::fmt::{self, Debug, Formatter};

type HostBody = dyn Fn(&mut Caller, &[Value]) -> Result<Vec<Value>, Trap> + Send + Sync;

struct FunctionInner {
    name: String,
    ty: FunctionType,
    body: Box<HostBody>,
}

/// A callable guest function.
///
/// Cloning shares the same function; equality is identity.
#[derive(Clone)]
pub struct Function(Arc<FunctionInner>);

impl Function {
    pub fn new<F>(name: impl Into<String>, ty: FunctionType, body: F) -> Self
    where
        F: Fn(&mut Caller, &[Value]) -> Result<Vec<Value>, Trap> + Send + Sync + 'static,
    {
        Self(Arc::new(FunctionInner {
            name: name.into(),
            ty,
            body: Box::new(body),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn ty(&self) -> &FunctionType {
        &self.0.ty
    }

    pub fn ptr_eq(&self, other: &Function) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn call_body(&self, caller: &mut Caller, args: &[Value]) -> Result<Vec<Value>, Trap> {
        (self.0.body)(caller, args)
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Debug for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Function({} : {})", self.0.name, self.0.ty)
    }
}
