//! Compartments and execution contexts.
//!
//! A [`Compartment`] is an isolation domain. Every [`Context`] belongs to
//! exactly one compartment and holds the guest's mutable state (its
//! globals). Contexts are shared: whoever holds a `Context` keeps it
//! alive, and the compartment only tracks them weakly, so
//! [`Compartment::collect_garbage`] reclaims exactly the contexts that no
//! thread handle, caller, or host reference still roots.
use super::Value;
use crate::utils::sync::{Arc, AtomicU64, Mutex, Ordering, Weak};
use std::fmt::{self, Debug, Formatter};

static NEXT_COMPARTMENT_ID: AtomicU64 = AtomicU64::new(1);

struct CompartmentInner {
    id: u64,
    next_context_id: AtomicU64,
    contexts: Mutex<Vec<Weak<ContextInner>>>,
}

#[derive(Clone)]
pub struct Compartment(Arc<CompartmentInner>);

impl Compartment {
    pub fn new() -> Self {
        Self(Arc::new(CompartmentInner {
            id: NEXT_COMPARTMENT_ID.fetch_add(1, Ordering::Relaxed),
            next_context_id: AtomicU64::new(1),
            contexts: Mutex::new(Vec::new()),
        }))
    }

    pub fn id(&self) -> u64 {
        self.0.id
    }

    pub fn create_context(&self) -> Context {
        self.adopt(Vec::new())
    }

    /// Creates a new context in this compartment whose globals are a copy
    /// of `context`'s globals at the time of the call.
    pub fn clone_context(&self, context: &Context) -> Context {
        assert!(
            context.compartment().ptr_eq(self),
            "cannot clone a context across compartments"
        );
        let globals = context.0.globals.lock().clone();
        self.adopt(globals)
    }

    fn adopt(&self, globals: Vec<Value>) -> Context {
        let inner = Arc::new(ContextInner {
            id: self.0.next_context_id.fetch_add(1, Ordering::Relaxed),
            compartment: self.clone(),
            globals: Mutex::new(globals),
        });
        self.0.contexts.lock().push(Arc::downgrade(&inner));
        Context(inner)
    }

    /// Number of contexts in this compartment that are still rooted.
    pub fn live_contexts(&self) -> usize {
        self.0
            .contexts
            .lock()
            .iter()
            .filter(|c| c.strong_count() > 0)
            .count()
    }

    /// Forgets every context that is no longer rooted and returns how many
    /// were reclaimed.
    pub fn collect_garbage(&self) -> usize {
        let mut contexts = self.0.contexts.lock();
        let before = contexts.len();
        contexts.retain(|c| c.strong_count() > 0);
        let reclaimed = before - contexts.len();
        if reclaimed > 0 {
            tracing::trace!(compartment = self.0.id, reclaimed, "collected contexts");
        }
        reclaimed
    }

    pub fn ptr_eq(&self, other: &Compartment) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for Compartment {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Compartment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Compartment({})", self.0.id)
    }
}

struct ContextInner {
    id: u64,
    compartment: Compartment,
    globals: Mutex<Vec<Value>>,
}

/// An isolated unit of guest execution state.
#[derive(Clone)]
pub struct Context(Arc<ContextInner>);

impl Context {
    pub fn id(&self) -> u64 {
        self.0.id
    }

    pub fn compartment(&self) -> &Compartment {
        &self.0.compartment
    }

    /// Appends a global and returns its index.
    pub fn add_global(&self, value: Value) -> usize {
        let mut globals = self.0.globals.lock();
        globals.push(value);
        globals.len() - 1
    }

    pub fn global(&self, index: usize) -> Option<Value> {
        self.0.globals.lock().get(index).cloned()
    }

    /// Overwrites an existing global. Returns `false` if `index` is out of range.
    pub fn set_global(&self, index: usize, value: Value) -> bool {
        match self.0.globals.lock().get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn ptr_eq(&self, other: &Context) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Debug for Context {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Context({}/{})", self.0.compartment.id(), self.0.id)
    }
}
