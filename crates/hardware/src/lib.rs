//! Scoreboard scheduler library.
//!
//! This crate implements a CDC 6600 style scoreboard with shadow-based
//! speculation recovery, modelled as a tick-accurate synchronous circuit:
//! 1. **Matrices:** Per-(unit, register) dependency cells, OR-reducers, and the FU×FU issue order.
//! 2. **Shadows:** Per-(unit, context) speculation latches and per-context branch records.
//! 3. **Issue:** Per-class priority arbiters and the go-read/go-write group picker.
//! 4. **Scheduling:** The double-buffered scoreboard with its per-tick port signals.
//! 5. **Simulation:** An instruction-queue driver, trace replay, configuration, and statistics.

/// Common types (index newtypes, pending vectors, errors).
pub mod common;
/// Scoreboard configuration (defaults, hierarchical config structures).
pub mod config;
/// Issue arbitration and go-signal picking.
pub mod issue;
/// Dependency cells, reducers and matrices.
pub mod matrix;
/// Scoreboard composition, port signals and state dumps.
pub mod sched;
/// Shadow latches and branch speculation records.
pub mod shadow;
/// Instruction-queue driver and trace replay.
pub mod sim;
/// Scoreboard statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or `Config::from_json`.
pub use crate::config::Config;
/// Main scheduler type; construct with `Scoreboard::new`.
pub use crate::sched::{Scoreboard, TickInputs, TickOutputs};
