//! Error definitions.
//!
//! This module defines the error types returned across the crate. It provides:
//! 1. **Configuration Errors:** Fatal problems detected while building a scoreboard.
//! 2. **Scoreboard Errors:** Malformed per-tick inputs rejected at the API boundary.
//! 3. **Simulation Errors:** Failures of the driver and trace layers (I/O, parsing, stalls).
//!
//! Protocol violations such as a simultaneous issue and go on the same cell are
//! not errors: they are resolved by the reset-dominant latch rule and, at most,
//! logged.

use std::path::PathBuf;

use thiserror::Error;

use super::ids::{ClassId, ContextId, RegId, UnitId};

/// Construction-time configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The configuration declares no function units.
    #[error("scoreboard needs at least one function unit")]
    NoUnits,

    /// The register file has zero width.
    #[error("scoreboard needs at least one register")]
    NoRegisters,

    /// A unit class declares a count of zero.
    #[error("unit class `{0}` has no units")]
    EmptyClass(String),

    /// Two unit classes share a name.
    #[error("unit class `{0}` is declared more than once")]
    DuplicateClass(String),

    /// A matrix or unit count exceeds the addressable cell budget.
    #[error("{what} is too large")]
    TooLarge {
        /// Which dimension overflowed.
        what: &'static str,
    },

    /// A partial address window is empty or wider than an address.
    #[error("address window {start}..{end} must be non-empty and within 64 bits")]
    AddressBits {
        /// First compared bit.
        start: u32,
        /// One past the last compared bit.
        end: u32,
    },

    /// The driver watchdog limit is zero.
    #[error("stall limit must be at least one tick")]
    NoStallLimit,

    /// Two coupled structures disagree on a shared axis.
    #[error("{what}: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Which pair of structures disagrees.
        what: &'static str,
        /// Width required by the owning structure.
        expected: usize,
        /// Width actually supplied.
        found: usize,
    },

    /// The configuration document could not be parsed.
    #[error("malformed configuration: {0}")]
    Parse(String),
}

/// Per-tick input validation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScoreboardError {
    /// The scoreboard could not be built.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A unit index is outside `0..units`.
    #[error("{unit} is out of range ({units} units)")]
    UnitOutOfRange {
        /// Offending unit.
        unit: UnitId,
        /// Configured unit count.
        units: usize,
    },

    /// A register index is outside `0..registers`.
    #[error("{reg} is out of range ({registers} registers)")]
    RegisterOutOfRange {
        /// Offending register.
        reg: RegId,
        /// Configured register count.
        registers: usize,
    },

    /// A unit class index is outside the configured class list.
    #[error("{class} is out of range ({classes} classes)")]
    ClassOutOfRange {
        /// Offending class.
        class: ClassId,
        /// Configured class count.
        classes: usize,
    },

    /// A speculation context index is outside `0..shadow_width`.
    #[error("{context} is out of range (shadow width {width})")]
    ContextOutOfRange {
        /// Offending context.
        context: ContextId,
        /// Configured shadow width.
        width: usize,
    },
}

/// Errors raised by the driver and trace replay.
#[derive(Debug, Error)]
pub enum SimError {
    /// The scoreboard rejected an input.
    #[error(transparent)]
    Scoreboard(#[from] ScoreboardError),

    /// No progress was made for `idle_ticks` consecutive ticks.
    #[error("no progress for {idle_ticks} ticks (stalled at tick {tick})")]
    Stalled {
        /// Tick at which the watchdog fired.
        tick: u64,
        /// Consecutive ticks without an event.
        idle_ticks: u64,
    },

    /// A trace or configuration file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A trace document could not be parsed.
    #[error("malformed trace: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result alias for scoreboard operations.
pub type Result<T, E = ScoreboardError> = std::result::Result<T, E>;
