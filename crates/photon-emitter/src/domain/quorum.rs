//! Stake-weighted quorum progress estimation.
//!
//! Estimates how much a new event from a given validator, at a given
//! sequence number, would advance the network's aggregate view relative
//! to its peers. Only the delta beyond the network median and beyond the
//! validator's own last-known position counts, so a validator cannot
//! repeatedly claim full credit for sequence numbers it already
//! advanced past.

use super::piecefunc::{Metric, PieceFunc, DECIMAL_UNIT};
use shared_types::{EventSeq, ValidatorIdx, ValidatorSet, Weight};

/// Sequence progress observed in global consensus state at decision
/// time: the median across validators and this validator's own current
/// position. Inputs, not owned by this component.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProgressSnapshot {
    /// Median observed sequence number across the validator set
    pub median_seq: EventSeq,
    /// The deciding validator's currently observed own sequence number
    pub current_seq: EventSeq,
}

/// Computes the marginal consensus-advancement metric for candidate
/// events. All arithmetic is fixed-point; the result is comparable
/// across validators given identical inputs.
#[derive(Clone, Debug)]
pub struct QuorumProgressEstimator {
    scalar_update: PieceFunc,
    event_metric: PieceFunc,
}

impl Default for QuorumProgressEstimator {
    fn default() -> Self {
        Self {
            scalar_update: PieceFunc::scalar_update_default(),
            event_metric: PieceFunc::event_metric_default(),
        }
    }
}

impl QuorumProgressEstimator {
    /// Build an estimator from explicit (versioned) protocol tables.
    pub fn new(scalar_update: PieceFunc, event_metric: PieceFunc) -> Self {
        Self {
            scalar_update,
            event_metric,
        }
    }

    fn scalar_update_metric(&self, diff: EventSeq, weight: Weight, total_weight: Weight) -> Metric {
        if total_weight == 0 {
            return 0;
        }
        let piece = self.scalar_update.get(diff as u64 * DECIMAL_UNIT);
        (piece as u128 * weight as u128 / total_weight as u128) as Metric
    }

    /// Marginal progress of advancing `validator_idx` to `candidate`,
    /// relative to the network `median` and the validator's own
    /// `current` position.
    pub fn update_metric(
        &self,
        median: EventSeq,
        current: EventSeq,
        candidate: EventSeq,
        validator_idx: ValidatorIdx,
        validators: &ValidatorSet,
    ) -> Metric {
        if candidate <= median || candidate <= current {
            return 0;
        }
        let weight = validators.get_weight_by_idx(validator_idx);
        let total = validators.total_weight();
        if median < current {
            // Only the gain beyond the contribution already counted for
            // the validator's current position.
            return self.scalar_update_metric(candidate - median, weight, total)
                - self.scalar_update_metric(current - median, weight, total);
        }
        self.scalar_update_metric(candidate - median, weight, total)
    }

    /// Floor boost at the very start of an epoch, when there is nothing
    /// to observe yet and every metric looks artificially low. Without
    /// it, all validators would perpetually defer at seq 1-2.
    pub fn kick_start_metric(metric: Metric, seq: EventSeq) -> Metric {
        let mut metric = metric;
        if seq <= 2 && metric < 9 * DECIMAL_UNIT / 10 {
            metric += DECIMAL_UNIT / 10;
        }
        if seq <= 1 && metric <= 8 * DECIMAL_UNIT / 10 {
            metric += 2 * DECIMAL_UNIT / 10;
        }
        metric
    }

    /// Externally consumed entry point: reshape a raw aggregate metric
    /// through the event-metric table, then apply the epoch kickstart.
    pub fn event_metric(&self, raw: Metric, seq: EventSeq) -> Metric {
        Self::kick_start_metric(self.event_metric.get(raw), seq)
    }
}
