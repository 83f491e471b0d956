//! # Photon-DAG Test Suite
//!
//! Unified test crate containing:
//!
//! ```text
//! tests/src/
//! ├── harness.rs        # Scripted in-memory port implementations
//! └── integration/      # Cross-component emission scenarios
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p photon-tests
//! cargo test -p photon-tests integration::
//! ```

pub mod harness;

#[cfg(test)]
mod integration;
