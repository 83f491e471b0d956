//! Event-emission admission control.
//!
//! [`is_allowed_to_emit`] is the pure decision predicate: given a
//! candidate event, a consistent snapshot of the emitter state, the
//! current protocol rules, and the quorum-progress metric, it answers
//! whether the validator should emit now. It never fails and has no
//! side effects; state commits happen in the service layer.
//!
//! Decision precedence, first match wins:
//!
//! 1. top-tier gate (currently disabled, see [`ENFORCE_TOP_TIER_GATE`])
//! 2. stake-tier idle-time blending (always applied, result unused if
//!    the emergency check returns early)
//! 3. emergency gas-power block
//! 4. liveness override (bounded staleness, always emits)
//! 5. low-power slowdown
//! 6. no-work slowdown
//! 7. efficiency-metric throttle
//! 8. fallthrough emit

use super::piecefunc::{Metric, DECIMAL_UNIT};
use crate::config::EmitIntervals;
use crate::ports::RuleSnapshot;
use shared_types::{BlockIndex, CandidateEvent, EmittedEvent, Timestamp, ValidatorId};
use std::time::Duration;

/// Size of the stake-descending whitelist considered "top tier".
pub const TOP_TIER_SIZE: usize = 50;

/// Whether the top-tier whitelist actually restricts emission.
///
/// The restriction is computed on every call but not honored: the gate
/// is an in-progress feature left disabled. Flipping this constant makes
/// validators outside the top [`TOP_TIER_SIZE`] stakers emit only when
/// `passed_time >= intervals.max`.
pub const ENFORCE_TOP_TIER_GATE: bool = false;

/// Why emission was denied by a throttling rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeferReason {
    /// Outside the enforced top-tier whitelist and max interval not reached
    OutsideTopTier,
    /// Gas power low; interpolated slowdown interval not reached
    LowGasPower,
    /// Idle with no transactions to confirm or originate
    NoWork,
    /// Minimum emission interval not reached
    MinInterval,
    /// Metric-adjusted elapsed time below the minimum interval
    MetricTooLow,
    /// Metric-adjusted idle time below the confirming interval
    ConfirmingInterval,
}

/// Why emission was forcibly blocked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockReason {
    /// Gas power at or below the emergency threshold and trending down
    EmergencyGasPower,
}

/// Three-way admission outcome. The boolean the original surface exposed
/// collapses `Defer` and `Blocked` into `false`; keeping them apart
/// preserves the precedence ordering explicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmissionDecision {
    /// Emit the candidate now
    Emit,
    /// Keep waiting; re-evaluate on the next tick
    Defer(DeferReason),
    /// Do not emit; emitting now would be economically unsafe
    Blocked(BlockReason),
}

impl EmissionDecision {
    /// Boundary mapping to the legacy boolean surface.
    pub fn should_emit(&self) -> bool {
        matches!(self, EmissionDecision::Emit)
    }
}

/// Consistent single-lock snapshot of the mutable emitter state, plus
/// the external world reads, assembled by the caller. All fields are
/// read together to avoid tearing across the elapsed-time computations.
#[derive(Clone, Copy, Debug)]
pub struct AdmissionContext {
    /// This node's validator identity
    pub local_validator: ValidatorId,
    /// Wall-clock time of the previous successful emission
    pub prev_emitted_at_time: Timestamp,
    /// Wall-clock time of the last idle observation
    pub prev_idle_time: Timestamp,
    /// Finalized block index at the previous emission
    pub prev_emitted_at_block: BlockIndex,
    /// Cached stake share of the candidate's creator (fixed-point)
    pub stake_ratio: Metric,
    /// Whether the emitter currently has no pending local work
    pub idle: bool,
    /// Latest finalized block index
    pub latest_block: BlockIndex,
    /// Current protocol economic parameters
    pub rules: RuleSnapshot,
    /// Emission cadence bounds
    pub intervals: EmitIntervals,
}

fn is_in_top_tier(id: ValidatorId, sorted_ids: &[ValidatorId]) -> bool {
    sorted_ids.iter().take(TOP_TIER_SIZE).any(|&v| v == id)
}

/// Scale elapsed wall-clock time by the consensus-advancement metric:
/// an event expected to advance consensus a lot "counts" more elapsed
/// time, encouraging faster emission when it matters more.
fn adjust_elapsed(passed: Duration, metric: Metric) -> Duration {
    let scaled = passed.as_nanos() as u64 / DECIMAL_UNIT;
    Duration::from_nanos((scaled as u128 * metric as u128) as u64)
}

/// The admission predicate. Total over well-formed inputs; malformed
/// interval configuration is the rules-supplying collaborator's problem.
pub fn is_allowed_to_emit(
    candidate: &CandidateEvent,
    self_parent: Option<&EmittedEvent>,
    metric: Metric,
    sorted_ids: &[ValidatorId],
    ctx: &AdmissionContext,
) -> EmissionDecision {
    let intervals = &ctx.intervals;
    let passed_time = candidate
        .creation_time
        .saturating_since(ctx.prev_emitted_at_time);
    let mut passed_time_idle = candidate.creation_time.saturating_since(ctx.prev_idle_time);
    let passed_blocks = ctx.latest_block.saturating_sub(ctx.prev_emitted_at_block);

    // Top-tier whitelist: the exclusion is computed but deliberately not
    // honored (in-progress feature gate).
    let mut outside_top_tier = false;
    if candidate.creator == ctx.local_validator {
        outside_top_tier = !is_in_top_tier(candidate.creator, sorted_ids);
    }
    if ENFORCE_TOP_TIER_GATE && outside_top_tier {
        // Non-whitelisted validators only get the staleness escape hatch.
        if passed_time >= intervals.max {
            return EmissionDecision::Emit;
        }
        return EmissionDecision::Defer(DeferReason::OutsideTopTier);
    }

    // Stake-tier idle-time blending: top-weight validators are treated
    // as never idle and emit right after a transaction originates.
    if ctx.stake_ratio < 35 * DECIMAL_UNIT / 100 {
        passed_time_idle = passed_time;
    } else if ctx.stake_ratio < 7 * DECIMAL_UNIT / 10 {
        passed_time_idle = (passed_time_idle + passed_time) / 2;
    }
    if passed_time_idle > passed_time {
        passed_time_idle = passed_time;
    }

    let adjusted_passed_time = adjust_elapsed(passed_time, metric);
    let adjusted_passed_idle_time = adjust_elapsed(passed_time_idle, metric);

    // Forbid emitting if not enough power and power is decreasing.
    if candidate.gas_power_left.min() <= ctx.rules.emergency_threshold {
        if let Some(parent) = self_parent {
            if candidate.gas_power_left.min() < parent.gas_power_left.min() {
                return EmissionDecision::Blocked(BlockReason::EmergencyGasPower);
            }
        }
    }

    // Enforce emitting if too much time/blocks passed since the
    // previous event; bounds staleness regardless of other throttling.
    {
        let slack = ctx.rules.block_missed_slack;
        let mut max_blocks = slack / 2 + 1;
        if slack > max_blocks && max_blocks < slack.saturating_sub(5) {
            max_blocks = slack - 5;
        }
        if passed_time >= intervals.max
            || (passed_blocks >= max_blocks.saturating_mul(4) / 5 && metric >= DECIMAL_UNIT / 2)
            || passed_blocks >= max_blocks
        {
            return EmissionDecision::Emit;
        }
    }

    // Slow down emitting if power is low. Local timing heuristic only,
    // so floating point is fine here (no determinism requirement).
    {
        let threshold = (ctx.rules.no_txs_threshold + ctx.rules.emergency_threshold) / 2;
        if threshold > 0 && candidate.gas_power_left.min() <= threshold {
            let min_t = intervals.min.as_secs_f64();
            let max_t = intervals.max.as_secs_f64();
            let factor = candidate.gas_power_left.min() as f64 / threshold as f64;
            let adjusted_interval = Duration::from_secs_f64(max_t - (max_t - min_t) * factor);
            if passed_time < adjusted_interval {
                return EmissionDecision::Defer(DeferReason::LowGasPower);
            }
        }
    }

    // Slow down emitting if there is nothing to confirm or originate.
    if passed_time < intervals.max && ctx.idle && !candidate.carries_txs {
        return EmissionDecision::Defer(DeferReason::NoWork);
    }

    // Emitting is controlled by the efficiency metric.
    {
        if passed_time < intervals.min {
            return EmissionDecision::Defer(DeferReason::MinInterval);
        }
        if adjusted_passed_time < intervals.min && !ctx.idle {
            return EmissionDecision::Defer(DeferReason::MetricTooLow);
        }
        if adjusted_passed_idle_time < intervals.confirming && !ctx.idle && !candidate.carries_txs {
            return EmissionDecision::Defer(DeferReason::ConfirmingInterval);
        }
    }

    EmissionDecision::Emit
}
