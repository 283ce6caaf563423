use std::fmt::{self, Display, Formatter};

/// Identifier of a guest thread, as seen by guest code.
///
/// `0` and `u64::MAX` are never handed out: `0` is what a forked
/// continuation observes, and `u64::MAX` marks a handle that is not
/// currently registered.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThreadId(pub u64);

impl Display for ThreadId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "<invalid:{}>", self.0)
        }
    }
}

impl From<u64> for ThreadId {
    fn from(id: u64) -> Self {
        ThreadId(id)
    }
}

impl From<ThreadId> for u64 {
    fn from(id: ThreadId) -> Self {
        id.0
    }
}

impl ThreadId {
    pub const NONE: Self = ThreadId(0);
    pub const INVALID: Self = ThreadId(u64::MAX);

    /// Smallest id the registry will assign.
    pub const FIRST: Self = ThreadId(1);

    pub fn new(id: u64) -> Self {
        ThreadId(id)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self != Self::NONE && self != Self::INVALID
    }
}
