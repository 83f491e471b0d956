//! # Photon-DAG - Event Emission Engine
//!
//! **Bounded Context:** Event Emission & Admission Control
//!
//! ## Purpose
//!
//! Decides, for a validator about to create a new DAG event, whether
//! emitting it *now* is permitted. The decision fuses:
//!
//! - per-validator gas-power budget enforcement,
//! - stake-weighted quorum progress estimation (fixed-point),
//! - anti-spam / anti-starvation timing heuristics,
//! - emergency and liveness overrides.
//!
//! ## Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Service (Outer)                                    │
//! │  - EmitterService: tokio tick loop, port glue       │
//! └─────────────────────────────────────────────────────┘
//!                         │
//! ┌─────────────────────────────────────────────────────┐
//! │  Ports (Middle)                                     │
//! │  - ConsensusReader, CandidateSource, EventSink      │
//! └─────────────────────────────────────────────────────┘
//!                         │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain (Inner - Pure Logic)                        │
//! │  - PieceFunc / fixed-point Metric                   │
//! │  - QuorumProgressEstimator                          │
//! │  - is_allowed_to_emit (admission predicate)         │
//! │  - EmitterState (world lock)                        │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Critical Invariants
//!
//! 1. **Fixed-point boundary**: every consensus-comparable value stays
//!    in integer fixed-point; floats only touch local timing heuristics.
//! 2. **Snapshot consistency**: all mutable state feeding one decision
//!    is read under a single lock acquisition.
//! 3. **Precedence**: emergency power block > liveness override >
//!    slowdown/throttle defers > fallthrough emit.
//! 4. **Bounded staleness**: `passed_time >= intervals.max` always
//!    emits unless the emergency block fires first.
//! 5. **Epoch atomicity**: stake ratios are recomputed wholesale when
//!    the validator set changes; no mixed-epoch reads.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Pure domain logic
pub mod domain;
/// Hexagonal ports
pub mod ports;

mod config;
mod error;
mod metrics;
mod service;

pub use config::{EmitIntervals, EmitterConfig};
pub use error::{EmitterError, Result};
pub use metrics::Metrics;
pub use service::EmitterService;

// Re-export commonly used domain types
pub use domain::{
    is_allowed_to_emit, AdmissionContext, BlockReason, DeferReason, Dot, EmissionDecision,
    EmitterState, Metric, PieceFunc, ProgressSnapshot, QuorumProgressEstimator, StateSnapshot,
    DECIMAL_UNIT, ENFORCE_TOP_TIER_GATE, TOP_TIER_SIZE,
};

pub use ports::{CandidateSource, ConsensusReader, EventSink, RuleSnapshot};
