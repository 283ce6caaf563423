use crate::runtime::{FunctionType, ValueType};
use thiserror::Error;

/// The two failure kinds guest code can observe from thread operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    SignatureMismatch,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ThreadError {
    #[error("invalid argument: no thread with id {0}")]
    UnknownThread(u64),

    #[error("invalid argument: null function reference")]
    NullFunction,

    #[error("indirect call signature mismatch: expected {expected}, got {actual}")]
    SignatureMismatch {
        expected: FunctionType,
        actual: FunctionType,
    },
}

impl ThreadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ThreadError::UnknownThread(_) | ThreadError::NullFunction => ErrorKind::InvalidArgument,
            ThreadError::SignatureMismatch { .. } => ErrorKind::SignatureMismatch,
        }
    }
}

/// A failure raised while running guest code.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Trap {
    #[error(transparent)]
    Thread(#[from] ThreadError),

    #[error("invalid call arguments: expected {expected}, got {actual:?}")]
    ArgumentMismatch {
        expected: FunctionType,
        actual: Vec<ValueType>,
    },

    #[error("guest trap: {0}")]
    Guest(String),
}

impl Trap {
    /// The thread-level error kind carried by this trap, if any.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Trap::Thread(e) => Some(e.kind()),
            Trap::ArgumentMismatch { .. } => Some(ErrorKind::SignatureMismatch),
            Trap::Guest(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(ThreadError::UnknownThread(3).kind(), ErrorKind::InvalidArgument);
        assert_eq!(ThreadError::NullFunction.kind(), ErrorKind::InvalidArgument);

        let mismatch = ThreadError::SignatureMismatch {
            expected: FunctionType::new([ValueType::I64], [ValueType::I32]),
            actual: FunctionType::new([], []),
        };
        assert_eq!(mismatch.kind(), ErrorKind::SignatureMismatch);
        assert_eq!(
            mismatch.to_string(),
            "indirect call signature mismatch: expected (i32) -> (i64), got () -> ()"
        );

        let trap: Trap = mismatch.into();
        assert_eq!(trap.kind(), Some(ErrorKind::SignatureMismatch));
        assert_eq!(Trap::Guest("boom".into()).kind(), None);
    }
}
