//! Outbound ports (driven side - SPI)
//!
//! The consensus engine, the candidate builder, and the gossip layer
//! are external collaborators consumed through these narrow contracts.

use crate::domain::ProgressSnapshot;
use crate::error::Result;
use async_trait::async_trait;
use shared_types::{BlockIndex, CandidateEvent, EmittedEvent, ValidatorId, ValidatorSet};
use std::sync::Arc;

/// Protocol-wide economic parameters, read-only from this subsystem's
/// perspective, replaced wholesale between epochs.
#[derive(Clone, Copy, Debug)]
pub struct RuleSnapshot {
    /// Gas power at or below this is an emergency
    pub emergency_threshold: u64,
    /// Gas power bound for the no-transactions slowdown band
    pub no_txs_threshold: u64,
    /// How many blocks may elapse without an own event before liveness
    /// enforcement triggers
    pub block_missed_slack: u64,
}

/// Port: read-only queries against the consensus/ordering engine.
///
/// These are synchronous lookups into in-memory consensus state; the
/// decision path never blocks on I/O.
pub trait ConsensusReader: Send + Sync {
    /// Current protocol rules
    fn get_rules(&self) -> RuleSnapshot;

    /// Latest finalized block index
    fn latest_block_index(&self) -> BlockIndex;

    /// Median observed sequence progress and this validator's own
    /// current position
    fn sequence_progress(&self, validator: ValidatorId) -> ProgressSnapshot;

    /// The current epoch's validator set
    fn validators(&self) -> Arc<ValidatorSet>;
}

/// Port: build candidate events from local pending work.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Assemble the next candidate event, if one can be built
    async fn build_candidate(&self) -> Result<Option<CandidateEvent>>;

    /// The creator's immediately preceding own event, if any
    fn self_parent(&self) -> Option<EmittedEvent>;

    /// Whether there is no pending local work (nothing to confirm or
    /// originate)
    fn is_idle(&self) -> bool;
}

/// Port: hand an admitted event to the gossip layer.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Broadcast a sealed event
    async fn broadcast(&self, event: CandidateEvent) -> Result<()>;
}
