//! The clocked scoreboard and its port signals.
//!
//! This module ties the matrices, shadows and arbiters together. It includes:
//! 1. **Signals:** Per-tick input and output port bundles.
//! 2. **Scoreboard:** The double-buffered composition with its evaluate/commit passes.
//! 3. **Snapshot:** A serialisable dump of the latched state for tracing and replay.

/// The scoreboard.
pub mod scoreboard;

/// Port signals.
pub mod signals;

/// State dumps.
pub mod snapshot;

pub use scoreboard::{Evaluation, Scoreboard, ScoreboardState};
pub use signals::{
    IssueGrant, IssueRequest, IssueStall, IssueTarget, ShadowTag, TickInputs, TickOutputs,
};
pub use snapshot::{RecordSnapshot, Snapshot};
