//! Simulation utilities.
//!
//! Provides a driver that runs an instruction stream through a scoreboard
//! with a simple function-unit model, and trace replay for comparing the
//! scoreboard's per-tick state against an oracle.

/// Instruction-queue driver.
pub mod driver;

/// Trace replay and state dumps.
pub mod trace;

pub use driver::{Driver, DriverEvent, Instruction};
pub use trace::{TickRecord, Trace};
