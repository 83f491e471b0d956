//! Emission service: glues the ports, the emitter state, and the
//! admission predicate into the periodic decision loop.
//!
//! The service has the only timer in the subsystem; the domain layer is
//! purely reactive and is handed a consistent snapshot per decision.

use crate::config::EmitterConfig;
use crate::domain::{
    is_allowed_to_emit, AdmissionContext, EmissionDecision, EmitterState, QuorumProgressEstimator,
};
use crate::error::Result;
use crate::metrics::Metrics;
use crate::ports::{CandidateSource, ConsensusReader, EventSink};
use shared_types::Timestamp;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// The emission decision engine service.
pub struct EmitterService {
    config: EmitterConfig,
    state: EmitterState,
    estimator: QuorumProgressEstimator,
    world: Arc<dyn ConsensusReader>,
    source: Arc<dyn CandidateSource>,
    sink: Arc<dyn EventSink>,
    metrics: Arc<Metrics>,
    active: AtomicBool,
}

impl EmitterService {
    /// Create the service, validating the interval configuration up
    /// front so the decision path can assume it well-formed.
    pub fn new(
        config: EmitterConfig,
        world: Arc<dyn ConsensusReader>,
        source: Arc<dyn CandidateSource>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self> {
        config.intervals.validate()?;
        Ok(Self {
            config,
            state: EmitterState::new(Timestamp::now()),
            estimator: QuorumProgressEstimator::default(),
            world,
            source,
            sink,
            metrics: Arc::new(Metrics::new()),
            active: AtomicBool::new(false),
        })
    }

    /// Shared metrics handle.
    pub fn metrics(&self) -> Arc<Metrics> {
        Arc::clone(&self.metrics)
    }

    /// Direct access to the emitter state (epoch swaps, idle rechecks
    /// from external triggers).
    pub fn state(&self) -> &EmitterState {
        &self.state
    }

    /// One pass of the decision loop. Returns the decision taken, or
    /// `None` when no candidate could be built.
    pub async fn tick(&self) -> Result<Option<EmissionDecision>> {
        let validators = self.world.validators();
        if validators.epoch() != self.state.epoch() {
            info!(epoch = validators.epoch(), "applying new validator epoch");
            self.state.apply_epoch(&validators);
        }

        self.recheck_idle_time();

        let Some(candidate) = self.source.build_candidate().await? else {
            return Ok(None);
        };
        let Some(validator_idx) = validators.get_idx(candidate.creator) else {
            debug!(
                creator = candidate.creator,
                "candidate creator not in current validator set"
            );
            return Ok(None);
        };

        let progress = self.world.sequence_progress(candidate.creator);
        let raw = self.estimator.update_metric(
            progress.median_seq,
            progress.current_seq,
            candidate.seq,
            validator_idx,
            &validators,
        );
        let metric = self.estimator.event_metric(raw, candidate.seq);

        let snapshot = self.state.snapshot(candidate.creator);
        let latest_block = self.world.latest_block_index();
        let ctx = AdmissionContext {
            local_validator: self.config.validator_id,
            prev_emitted_at_time: snapshot.prev_emitted_at_time,
            prev_idle_time: snapshot.prev_idle_time,
            prev_emitted_at_block: snapshot.prev_emitted_at_block,
            stake_ratio: snapshot.stake_ratio,
            idle: self.source.is_idle(),
            latest_block,
            rules: self.world.get_rules(),
            intervals: self.config.intervals,
        };

        let self_parent = self.source.self_parent();
        let decision = is_allowed_to_emit(
            &candidate,
            self_parent.as_ref(),
            metric,
            validators.sorted_ids(),
            &ctx,
        );

        match decision {
            EmissionDecision::Emit => {
                self.sink.broadcast(candidate.clone()).await?;
                self.state.commit_emission(candidate.creation_time, latest_block);
                self.metrics.record_emitted();
                debug!(seq = candidate.seq, metric, "emitted event");
            }
            EmissionDecision::Blocked(reason) => {
                self.metrics.record_emergency_block();
                if self.state.should_warn_low_power(self.config.power_warn_interval) {
                    let stake_pct = 100.0 * validators.get(candidate.creator) as f64
                        / validators.total_weight().max(1) as f64;
                    warn!(
                        ?reason,
                        power = %candidate.gas_power_left,
                        self_parent_power = %self_parent
                            .map(|p| p.gas_power_left.to_string())
                            .unwrap_or_default(),
                        stake_pct,
                        "not enough power to emit event, waiting"
                    );
                }
            }
            EmissionDecision::Defer(reason) => {
                self.metrics.record_deferral();
                trace!(?reason, seq = candidate.seq, metric, "deferred emission");
            }
        }
        Ok(Some(decision))
    }

    /// Refresh the idle marker if there is no pending work.
    pub fn recheck_idle_time(&self) {
        let idle = self.source.is_idle();
        self.state.recheck_idle_time(idle, Timestamp::now());
        if idle {
            self.metrics.record_idle_recheck();
        }
    }

    /// Drive the decision loop until [`EmitterService::stop`] is called.
    pub async fn run(self: Arc<Self>) {
        self.active.store(true, Ordering::SeqCst);
        let mut ticker = tokio::time::interval(self.config.tick_interval);
        info!(
            validator = self.config.validator_id,
            tick = ?self.config.tick_interval,
            "emitter service started"
        );
        while self.active.load(Ordering::SeqCst) {
            ticker.tick().await;
            if let Err(err) = self.tick().await {
                warn!(%err, "emission tick failed");
            }
        }
        info!("emitter service stopped");
    }

    /// Signal the running loop to exit after the current tick.
    pub fn stop(&self) {
        self.active.store(false, Ordering::SeqCst);
    }
}
