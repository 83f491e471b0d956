//! Process-wide emitter state behind the world lock.
//!
//! All fields are read and written under one coarse-grained mutex, one
//! acquisition per read-or-write transaction. Readers take a
//! [`StateSnapshot`] of every field they need in a single acquisition so
//! the elapsed-time computations never observe a half-updated state.

use super::piecefunc::{Metric, DECIMAL_UNIT};
use parking_lot::Mutex;
use shared_types::{BlockIndex, Timestamp, ValidatorId, ValidatorSet};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// One consistent read of the mutable fields the admission predicate
/// consumes.
#[derive(Clone, Copy, Debug)]
pub struct StateSnapshot {
    /// Wall-clock time of the previous successful emission
    pub prev_emitted_at_time: Timestamp,
    /// Wall-clock time of the last idle observation
    pub prev_idle_time: Timestamp,
    /// Finalized block index at the previous emission
    pub prev_emitted_at_block: BlockIndex,
    /// Cached stake share of the queried validator (fixed-point)
    pub stake_ratio: Metric,
}

#[derive(Debug)]
struct Inner {
    prev_emitted_at_time: Timestamp,
    prev_idle_time: Timestamp,
    prev_emitted_at_block: BlockIndex,
    stake_ratio: HashMap<ValidatorId, Metric>,
    epoch: u64,
    last_power_warn: Option<Instant>,
}

/// Per-validator mutable emission state, lifecycle = lifetime of the
/// running validator process.
#[derive(Debug)]
pub struct EmitterState {
    inner: Mutex<Inner>,
}

impl EmitterState {
    /// Create fresh state as of `now`.
    pub fn new(now: Timestamp) -> Self {
        Self {
            inner: Mutex::new(Inner {
                prev_emitted_at_time: now,
                prev_idle_time: now,
                prev_emitted_at_block: 0,
                stake_ratio: HashMap::new(),
                epoch: 0,
                last_power_warn: None,
            }),
        }
    }

    /// Snapshot every field the admission predicate needs, in one lock
    /// acquisition.
    pub fn snapshot(&self, creator: ValidatorId) -> StateSnapshot {
        let inner = self.inner.lock();
        StateSnapshot {
            prev_emitted_at_time: inner.prev_emitted_at_time,
            prev_idle_time: inner.prev_idle_time,
            prev_emitted_at_block: inner.prev_emitted_at_block,
            stake_ratio: inner.stake_ratio.get(&creator).copied().unwrap_or(0),
        }
    }

    /// Record a successful emission (the commit path).
    pub fn commit_emission(&self, at: Timestamp, block: BlockIndex) {
        let mut inner = self.inner.lock();
        inner.prev_emitted_at_time = at;
        inner.prev_emitted_at_block = block;
    }

    /// If the emitter has no pending work, move the idle marker to `now`.
    pub fn recheck_idle_time(&self, idle: bool, now: Timestamp) {
        let mut inner = self.inner.lock();
        if idle {
            inner.prev_idle_time = now;
        }
    }

    /// Epoch of the validator set the stake-ratio cache was built from.
    pub fn epoch(&self) -> u64 {
        self.inner.lock().epoch
    }

    /// Swap in a new epoch's validator set, recomputing the whole
    /// stake-ratio cache atomically. A decision never reads weights from
    /// one epoch and totals from another.
    pub fn apply_epoch(&self, validators: &ValidatorSet) {
        let total = validators.total_weight();
        let ratios: HashMap<ValidatorId, Metric> = validators
            .iter()
            .map(|v| {
                let ratio = if total == 0 {
                    0
                } else {
                    (v.weight as u128 * DECIMAL_UNIT as u128 / total as u128) as Metric
                };
                (v.id, ratio)
            })
            .collect();
        let mut inner = self.inner.lock();
        inner.stake_ratio = ratios;
        inner.epoch = validators.epoch();
    }

    /// Rate limiter for the low-power warning: true at most once per
    /// `interval`.
    pub fn should_warn_low_power(&self, interval: Duration) -> bool {
        let mut inner = self.inner.lock();
        let now = Instant::now();
        match inner.last_power_warn {
            Some(last) if now.duration_since(last) < interval => false,
            _ => {
                inner.last_power_warn = Some(now);
                true
            }
        }
    }
}
