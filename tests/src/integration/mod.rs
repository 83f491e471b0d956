//! Cross-component emission scenarios.

mod emitter_flow;
