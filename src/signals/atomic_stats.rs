/*!
 * Lock-Free Signal Statistics
 * Process-wide counters for waits, deliveries and thread lifecycle events
 */

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Signal statistics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalStats {
    pub threads_spawned: u64,
    pub waits_entered: u64,
    pub signals_received: u64,
    pub callbacks_dispatched: u64,
    pub kills_sent: u64,
    pub signals_queued: u64,
    pub threads_canceled: u64,
}

/// Atomic signal statistics for lock-free updates
///
/// # Performance
/// - Cache-line aligned to prevent false sharing
#[repr(C, align(64))]
pub struct AtomicSignalStats {
    threads_spawned: AtomicU64,
    waits_entered: AtomicU64,
    signals_received: AtomicU64,
    callbacks_dispatched: AtomicU64,
    kills_sent: AtomicU64,
    signals_queued: AtomicU64,
    threads_canceled: AtomicU64,
}

pub(crate) static STATS: AtomicSignalStats = AtomicSignalStats::new();

/// Snapshot of the process-wide counters
pub fn stats() -> SignalStats {
    STATS.snapshot()
}

impl AtomicSignalStats {
    pub const fn new() -> Self {
        Self {
            threads_spawned: AtomicU64::new(0),
            waits_entered: AtomicU64::new(0),
            signals_received: AtomicU64::new(0),
            callbacks_dispatched: AtomicU64::new(0),
            kills_sent: AtomicU64::new(0),
            signals_queued: AtomicU64::new(0),
            threads_canceled: AtomicU64::new(0),
        }
    }

    #[inline(always)]
    pub fn inc_spawned(&self) {
        self.threads_spawned.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_waits(&self) {
        self.waits_entered.fetch_add(1, Ordering::Relaxed);
    }

    /// Hot path - called on every wait return
    #[inline(always)]
    pub fn inc_received(&self) {
        self.signals_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Hot path - called after every loop callback
    #[inline(always)]
    pub fn inc_dispatched(&self) {
        self.callbacks_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_kills(&self) {
        self.kills_sent.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_queued(&self) {
        self.signals_queued.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_canceled(&self) {
        self.threads_canceled.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of current stats (no locks required)
    ///
    /// # Note
    /// Values may not be perfectly consistent with each other due to concurrent updates,
    /// but each individual value is accurate. This is acceptable for monitoring.
    #[inline]
    pub fn snapshot(&self) -> SignalStats {
        SignalStats {
            threads_spawned: self.threads_spawned.load(Ordering::Relaxed),
            waits_entered: self.waits_entered.load(Ordering::Relaxed),
            signals_received: self.signals_received.load(Ordering::Relaxed),
            callbacks_dispatched: self.callbacks_dispatched.load(Ordering::Relaxed),
            kills_sent: self.kills_sent.load(Ordering::Relaxed),
            signals_queued: self.signals_queued.load(Ordering::Relaxed),
            threads_canceled: self.threads_canceled.load(Ordering::Relaxed),
        }
    }
}

impl Default for AtomicSignalStats {
    fn default() -> Self {
        Self::new()
    }
}
