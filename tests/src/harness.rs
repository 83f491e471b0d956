//! Scripted in-memory implementations of the emitter ports.
//!
//! Each knob is a shared cell so a test can reshape the world between
//! ticks: advance blocks, swap epochs, toggle idleness, or starve the
//! candidate source.

use async_trait::async_trait;
use parking_lot::Mutex;
use photon_emitter::{
    CandidateSource, ConsensusReader, EventSink, ProgressSnapshot, Result, RuleSnapshot,
};
use shared_types::{
    BlockIndex, CandidateEvent, EmittedEvent, ValidatorId, ValidatorInfo, ValidatorSet,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Build a validator set where validator `i+1` has `weights[i]` stake.
pub fn validator_set(epoch: u64, weights: &[u64]) -> ValidatorSet {
    let validators = weights
        .iter()
        .enumerate()
        .map(|(i, &weight)| ValidatorInfo {
            id: i as ValidatorId + 1,
            weight,
        })
        .collect();
    ValidatorSet::new(epoch, validators)
}

/// Scripted consensus-engine view.
pub struct ScriptedWorld {
    /// Current epoch's validator set
    pub validators: Mutex<Arc<ValidatorSet>>,
    /// Latest finalized block index
    pub latest_block: Mutex<BlockIndex>,
    /// Sequence progress returned for every validator
    pub progress: Mutex<ProgressSnapshot>,
    /// Current protocol rules
    pub rules: Mutex<RuleSnapshot>,
}

impl ScriptedWorld {
    /// World with the given validator set and default rules.
    pub fn new(set: ValidatorSet) -> Self {
        Self {
            validators: Mutex::new(Arc::new(set)),
            latest_block: Mutex::new(0),
            progress: Mutex::new(ProgressSnapshot::default()),
            rules: Mutex::new(RuleSnapshot {
                emergency_threshold: 1_000,
                no_txs_threshold: 10_000,
                block_missed_slack: 50,
            }),
        }
    }
}

impl ConsensusReader for ScriptedWorld {
    fn get_rules(&self) -> RuleSnapshot {
        *self.rules.lock()
    }

    fn latest_block_index(&self) -> BlockIndex {
        *self.latest_block.lock()
    }

    fn sequence_progress(&self, _validator: ValidatorId) -> ProgressSnapshot {
        *self.progress.lock()
    }

    fn validators(&self) -> Arc<ValidatorSet> {
        Arc::clone(&self.validators.lock())
    }
}

/// Scripted candidate builder.
pub struct ScriptedSource {
    /// Candidate handed out on every build call
    pub candidate: Mutex<Option<CandidateEvent>>,
    /// Self-parent reference
    pub self_parent: Mutex<Option<EmittedEvent>>,
    /// Whether local work is pending
    pub idle: AtomicBool,
}

impl ScriptedSource {
    /// Source with no candidate and pending work.
    pub fn new() -> Self {
        Self {
            candidate: Mutex::new(None),
            self_parent: Mutex::new(None),
            idle: AtomicBool::new(false),
        }
    }
}

impl Default for ScriptedSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CandidateSource for ScriptedSource {
    async fn build_candidate(&self) -> Result<Option<CandidateEvent>> {
        Ok(self.candidate.lock().clone())
    }

    fn self_parent(&self) -> Option<EmittedEvent> {
        *self.self_parent.lock()
    }

    fn is_idle(&self) -> bool {
        self.idle.load(Ordering::SeqCst)
    }
}

/// Sink recording every broadcast event.
#[derive(Default)]
pub struct RecordingSink {
    /// Broadcast events in order
    pub broadcasts: Mutex<Vec<CandidateEvent>>,
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn broadcast(&self, event: CandidateEvent) -> Result<()> {
        self.broadcasts.lock().push(event);
        Ok(())
    }
}
