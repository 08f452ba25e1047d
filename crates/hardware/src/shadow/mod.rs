//! Speculation (shadow) tracking.
//!
//! This module tracks which in-flight operations are conditional on an
//! unresolved branch. It includes:
//! 1. **Shadow Latches:** One latch per (unit, context) with its next-state function.
//! 2. **Shadow Matrix:** The latch array, producing per-unit `shadown` and `go_die`.
//! 3. **Branch Records:** Per-context side records resolved atomically into confirm/cancel.

/// Branch speculation records.
pub mod branch;

/// Shadow matrix.
pub mod matrix;

/// Shadow latch.
pub mod unit;

pub use branch::{BranchDecision, BranchResolution, BranchSide, BranchSpeculationRecord};
pub use matrix::{ShadowInputs, ShadowMatrix, ShadowOutputs};
pub use unit::{ShadowState, ShadowUnit, ShadowUnitInputs};
