use crate::utils::sync::{AtomicU64, Ordering};
use serde::Serialize;

/// Lifecycle counters.
///
/// All counters use `Ordering::Relaxed`: they are independent tallies and
/// never used to synchronize other memory.
#[derive(Debug, Default)]
pub struct ThreadMetrics {
    created: AtomicU64,
    forked: AtomicU64,
    joined: AtomicU64,
    detached: AtomicU64,
    exited: AtomicU64,
    destroyed: AtomicU64,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct ThreadMetricsSnapshot {
    pub created: u64,
    pub forked: u64,
    pub joined: u64,
    pub detached: u64,
    pub exited: u64,
    pub destroyed: u64,
}

impl std::fmt::Display for ThreadMetricsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Thread Statistics:")?;
        writeln!(f, "  Created:    {:>8}", self.created)?;
        writeln!(f, "  Forked:     {:>8}", self.forked)?;
        writeln!(f, "  Joined:     {:>8}", self.joined)?;
        writeln!(f, "  Detached:   {:>8}", self.detached)?;
        writeln!(f, "  Exited:     {:>8}", self.exited)?;
        write!(f, "  Destroyed:  {:>8}", self.destroyed)
    }
}

impl ThreadMetrics {
    pub const fn new() -> Self {
        Self {
            created: AtomicU64::new(0),
            forked: AtomicU64::new(0),
            joined: AtomicU64::new(0),
            detached: AtomicU64::new(0),
            exited: AtomicU64::new(0),
            destroyed: AtomicU64::new(0),
        }
    }

    /// Counters for the whole process.
    pub fn global() -> &'static ThreadMetrics {
        static METRICS: ThreadMetrics = ThreadMetrics::new();
        &METRICS
    }

    #[inline]
    pub fn record_created(&self) {
        self.created.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_forked(&self) {
        self.forked.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_joined(&self) {
        self.joined.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_detached(&self) {
        self.detached.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_exited(&self) {
        self.exited.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_destroyed(&self) {
        self.destroyed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ThreadMetricsSnapshot {
        ThreadMetricsSnapshot {
            created: self.created.load(Ordering::Relaxed),
            forked: self.forked.load(Ordering::Relaxed),
            joined: self.joined.load(Ordering::Relaxed),
            detached: self.detached.load(Ordering::Relaxed),
            exited: self.exited.load(Ordering::Relaxed),
            destroyed: self.destroyed.load(Ordering::Relaxed),
        }
    }
}
