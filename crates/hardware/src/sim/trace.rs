//! Event-trace loading, replay and state dumping.
//!
//! This module replays a recorded sequence of port inputs against a fresh
//! scoreboard. It performs:
//! 1. **Trace loading:** Reads a JSON trace (config plus per-tick inputs) from a string or file.
//! 2. **Replay:** Ticks the scoreboard once per entry, capturing outputs and latched state.
//! 3. **Dumping:** Renders the captured records as pretty JSON for comparison against an oracle.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::{ScoreboardError, SimError};
use crate::config::Config;
use crate::sched::{Scoreboard, Snapshot, TickInputs, TickOutputs};

/// A recorded input sequence.
///
/// # Examples
///
/// ```
/// use shadowboard_core::sim::Trace;
///
/// let json = r#"{
///     "config": { "matrix": { "registers": 4 }, "units": [ { "name": "alu", "count": 2 } ] },
///     "ticks": [
///         { "issue": { "target": { "class": 0 }, "dest": [1] } },
///         { "go_read": [0] },
///         { "go_write": [0] }
///     ]
/// }"#;
///
/// let records = Trace::from_json(json).unwrap().replay().unwrap();
/// assert_eq!(records.len(), 3);
/// assert!(records[2].outputs.writable.get(0));
/// assert_eq!(records[2].state.matrix[0], "....");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    /// Scoreboard configuration.
    #[serde(default)]
    pub config: Config,
    /// Inputs, one entry per tick.
    #[serde(default)]
    pub ticks: Vec<TickInputs>,
}

/// Outputs and resulting state of one replayed tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TickRecord {
    /// Outputs computed during the tick.
    pub outputs: TickOutputs,
    /// State latched at the end of the tick.
    pub state: Snapshot,
}

impl Trace {
    /// Parses a JSON trace and validates its configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Parse`] for malformed JSON and
    /// [`SimError::Scoreboard`] for an invalid configuration.
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let trace: Self = serde_json::from_str(json)?;
        trace
            .config
            .validate()
            .map_err(ScoreboardError::from)?;
        Ok(trace)
    }

    /// Reads and parses a JSON trace file.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if the file cannot be read, otherwise as
    /// [`Trace::from_json`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| SimError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = json.len(), "loaded trace");
        Self::from_json(&json)
    }

    /// Replays every tick against a fresh scoreboard.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Scoreboard`] for the first tick whose inputs do
    /// not fit the configuration.
    pub fn replay(&self) -> Result<Vec<TickRecord>, SimError> {
        let mut scoreboard = Scoreboard::new(&self.config)?;
        self.ticks
            .iter()
            .map(|inputs| -> Result<TickRecord, SimError> {
                let outputs = scoreboard.tick(inputs)?;
                Ok(TickRecord {
                    outputs,
                    state: scoreboard.snapshot(),
                })
            })
            .collect()
    }

    /// Renders replayed records as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Parse`] if serialization fails.
    pub fn dump(records: &[TickRecord]) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(records)?)
    }
}
