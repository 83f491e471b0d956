//! Hexagonal architecture ports for the emission subsystem.

pub mod outbound;

pub use outbound::{CandidateSource, ConsensusReader, EventSink, RuleSnapshot};
