//! Metrics collection for the emission subsystem

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics collector for emission decisions
#[derive(Debug, Default)]
pub struct Metrics {
    /// Events admitted and broadcast
    pub events_emitted: AtomicU64,

    /// Decisions that deferred emission
    pub deferrals: AtomicU64,

    /// Emergency gas-power blocks
    pub emergency_blocks: AtomicU64,

    /// Idle-marker refreshes
    pub idle_rechecks: AtomicU64,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an admitted and broadcast event
    pub fn record_emitted(&self) {
        self.events_emitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a deferred decision
    pub fn record_deferral(&self) {
        self.deferrals.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an emergency gas-power block
    pub fn record_emergency_block(&self) {
        self.emergency_blocks.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an idle-marker refresh
    pub fn record_idle_recheck(&self) {
        self.idle_rechecks.fetch_add(1, Ordering::Relaxed);
    }

    /// Get events emitted
    pub fn get_events_emitted(&self) -> u64 {
        self.events_emitted.load(Ordering::Relaxed)
    }

    /// Get deferral ratio over all decisions taken so far
    pub fn get_deferral_ratio(&self) -> f64 {
        let emitted = self.events_emitted.load(Ordering::Relaxed);
        let deferred = self.deferrals.load(Ordering::Relaxed);
        let blocked = self.emergency_blocks.load(Ordering::Relaxed);
        let total = emitted + deferred + blocked;
        if total == 0 {
            return 0.0;
        }
        (deferred + blocked) as f64 / total as f64
    }
}
