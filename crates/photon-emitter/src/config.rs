//! Configuration types for event emission

use crate::error::{EmitterError, Result};
use serde::Deserialize;
use shared_types::ValidatorId;
use std::time::Duration;

/// Emission cadence bounds.
///
/// Invariant: `min <= confirming <= max`. This is asserted by
/// [`EmitIntervals::validate`] at service construction rather than
/// defensively inside the decision path.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct EmitIntervals {
    /// Minimum interval between own events
    pub min: Duration,

    /// Maximum interval between own events; reaching it forces emission
    pub max: Duration,

    /// Target interval for confirming (no-payload) events
    pub confirming: Duration,
}

impl Default for EmitIntervals {
    fn default() -> Self {
        Self {
            min: Duration::from_millis(110),
            max: Duration::from_secs(600),
            confirming: Duration::from_millis(120),
        }
    }
}

impl EmitIntervals {
    /// Check the `min <= confirming <= max` ordering.
    pub fn validate(&self) -> Result<()> {
        if self.min > self.confirming || self.confirming > self.max {
            return Err(EmitterError::InvalidConfig(format!(
                "emit intervals must satisfy min <= confirming <= max, got {:?} / {:?} / {:?}",
                self.min, self.confirming, self.max
            )));
        }
        Ok(())
    }
}

/// Runtime configuration for the emission service
#[derive(Clone, Debug, Deserialize)]
pub struct EmitterConfig {
    /// This node's validator identity
    pub validator_id: ValidatorId,

    /// Emission cadence bounds
    pub intervals: EmitIntervals,

    /// Cadence at which the service re-evaluates emission
    pub tick_interval: Duration,

    /// Minimum gap between repeated low-power warnings
    pub power_warn_interval: Duration,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            validator_id: 0,
            intervals: EmitIntervals::default(),
            tick_interval: Duration::from_millis(100),
            power_warn_interval: Duration::from_secs(10),
        }
    }
}
