use super::Function;
use std::fmt::{self, Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    I32,
    I64,
    F32,
    F64,
    FuncRef,
}

impl Display for ValueType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::I32 => "i32",
            ValueType::I64 => "i64",
            ValueType::F32 => "f32",
            ValueType::F64 => "f64",
            ValueType::FuncRef => "funcref",
        };
        f.write_str(name)
    }
}

/// A single guest value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    FuncRef(Option<Function>),
}

impl Value {
    pub fn ty(&self) -> ValueType {
        match self {
            Value::I32(_) => ValueType::I32,
            Value::I64(_) => ValueType::I64,
            Value::F32(_) => ValueType::F32,
            Value::F64(_) => ValueType::F64,
            Value::FuncRef(_) => ValueType::FuncRef,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns `Some(None)` for a null reference and `None` for a non-reference value.
    pub fn as_func_ref(&self) -> Option<Option<&Function>> {
        match self {
            Value::FuncRef(f) => Some(f.as_ref()),
            _ => None,
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<Function> for Value {
    fn from(f: Function) -> Self {
        Value::FuncRef(Some(f))
    }
}

/// Signature of a guest function: `(params) -> (results)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionType {
    results: Vec<ValueType>,
    params: Vec<ValueType>,
}

impl FunctionType {
    pub fn new(
        results: impl IntoIterator<Item = ValueType>,
        params: impl IntoIterator<Item = ValueType>,
    ) -> Self {
        Self {
            results: results.into_iter().collect(),
            params: params.into_iter().collect(),
        }
    }

    pub fn results(&self) -> &[ValueType] {
        &self.results
    }

    pub fn params(&self) -> &[ValueType] {
        &self.params
    }

    /// Whether `args` has exactly the parameter types of this signature.
    pub fn accepts(&self, args: &[Value]) -> bool {
        args.len() == self.params.len() && args.iter().zip(&self.params).all(|(a, p)| a.ty() == *p)
    }
}

fn write_tuple(f: &mut Formatter<'_>, types: &[ValueType]) -> fmt::Result {
    f.write_str("(")?;
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", ty)?;
    }
    f.write_str(")")
}

impl Display for FunctionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_tuple(f, &self.params)?;
        f.write_str(" -> ")?;
        write_tuple(f, &self.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_type_display() {
        let ty = FunctionType::new([ValueType::I64], [ValueType::FuncRef, ValueType::I32]);
        assert_eq!(ty.to_string(), "(funcref, i32) -> (i64)");
        assert_eq!(FunctionType::new([], []).to_string(), "() -> ()");
    }

    #[test]
    fn accepts_checks_arity_and_types() {
        let ty = FunctionType::new([ValueType::I64], [ValueType::I32]);
        assert!(ty.accepts(&[Value::I32(5)]));
        assert!(!ty.accepts(&[Value::I64(5)]));
        assert!(!ty.accepts(&[]));
        assert!(!ty.accepts(&[Value::I32(1), Value::I32(2)]));
    }

    #[test]
    fn accessors() {
        assert_eq!(Value::from(3i32).as_i32(), Some(3));
        assert_eq!(Value::from(3i32).as_i64(), None);
        assert_eq!(Value::FuncRef(None).as_func_ref(), Some(None));
        assert_eq!(Value::F64(1.5).as_func_ref(), None);
    }
}
