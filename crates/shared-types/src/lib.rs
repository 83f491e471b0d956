//! # Shared Types Crate
//!
//! Cross-subsystem domain primitives for Photon-DAG. All identifiers,
//! the stake-ordered validator set, event entities, and the gas-power
//! budget projection live here.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type consumed by more than one
//!   subsystem is defined here.
//! - **Epoch Immutability**: a [`ValidatorSet`] is frozen at construction;
//!   an epoch change replaces the whole structure, it is never mutated in
//!   place while referenced by in-flight computations.

pub mod event;
pub mod validators;

pub use event::*;
pub use validators::*;
