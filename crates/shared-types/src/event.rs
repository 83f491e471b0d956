//! DAG event entities and the gas-power budget projection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Per-creator monotone event sequence number.
pub type EventSeq = u32;

/// Finalized block index.
pub type BlockIndex = u64;

/// Nanosecond-precision wall-clock timestamp (UNIX epoch based).
///
/// Elapsed-time queries saturate at zero: clock skew or out-of-order
/// invocation yields a zero delta, never an error.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Current wall-clock time.
    pub fn now() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_nanos();
        Timestamp(nanos as u64)
    }

    /// Construct from nanoseconds since the UNIX epoch.
    pub fn from_nanos(nanos: u64) -> Self {
        Timestamp(nanos)
    }

    /// Nanoseconds since the UNIX epoch.
    pub fn as_nanos(&self) -> u64 {
        self.0
    }

    /// Time elapsed since `earlier`, clamped to zero if `earlier` is in
    /// the future of `self`.
    pub fn saturating_since(&self, earlier: Timestamp) -> Duration {
        Duration::from_nanos(self.0.saturating_sub(earlier.0))
    }

    /// Shift forward by a duration.
    pub fn add(&self, d: Duration) -> Timestamp {
        Timestamp(self.0.saturating_add(d.as_nanos() as u64))
    }
}

/// Remaining gas-power budget across the two allocation lanes
/// (short-term and long-term).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasPowerLeft {
    /// Remaining budget per lane: `[short_term, long_term]`
    pub gas: [u64; 2],
}

impl GasPowerLeft {
    /// Scalar projection: the tighter of the two lanes.
    pub fn min(&self) -> u64 {
        self.gas[0].min(self.gas[1])
    }
}

impl fmt::Display for GasPowerLeft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.gas[0], self.gas[1])
    }
}

/// The event a validator is about to emit, before sealing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CandidateEvent {
    /// Creator validator
    pub creator: super::ValidatorId,
    /// Per-creator sequence number (monotone)
    pub seq: EventSeq,
    /// Creation wall-clock time
    pub creation_time: Timestamp,
    /// Remaining gas-power budget after this event
    pub gas_power_left: GasPowerLeft,
    /// Whether the event carries pending transactions
    pub carries_txs: bool,
}

/// Read-only view of an already emitted event (used as the candidate's
/// self-parent reference).
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct EmittedEvent {
    /// Per-creator sequence number
    pub seq: EventSeq,
    /// Creation wall-clock time
    pub creation_time: Timestamp,
    /// Remaining gas-power budget at emission time
    pub gas_power_left: GasPowerLeft,
}
