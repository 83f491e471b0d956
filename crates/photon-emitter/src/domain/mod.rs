//! Pure domain logic: fixed-point metrics, quorum progress estimation,
//! the admission predicate, and the locked emitter state. No I/O.

pub mod admission;
pub mod piecefunc;
pub mod quorum;
pub mod state;

pub use admission::{
    is_allowed_to_emit, AdmissionContext, BlockReason, DeferReason, EmissionDecision,
    ENFORCE_TOP_TIER_GATE, TOP_TIER_SIZE,
};
pub use piecefunc::{Dot, Metric, PieceFunc, DECIMAL_UNIT};
pub use quorum::{ProgressSnapshot, QuorumProgressEstimator};
pub use state::{EmitterState, StateSnapshot};
