//! Serialisable dump of the latched scoreboard state.
//!
//! Matrix rows are rendered one character per cell so a dump can be diffed
//! against an oracle by eye:
//! - `.` idle
//! - `r` read pending (FU×FU: waiting for the other unit to read)
//! - `w` write pending (FU×FU: waiting for the other unit to write)
//! - `x` both

use std::fmt;

use serde::Serialize;

use super::scoreboard::ScoreboardState;
use crate::common::PendingVector;
use crate::shadow::BranchSide;

const fn cell_char(read: bool, write: bool) -> char {
    match (read, write) {
        (false, false) => '.',
        (true, false) => 'r',
        (false, true) => 'w',
        (true, true) => 'x',
    }
}

/// Sides recorded in one speculation context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RecordSnapshot {
    /// Units on the taken side.
    pub taken: PendingVector,
    /// Units on the not-taken side.
    pub not_taken: PendingVector,
}

/// Latched state at a tick boundary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Tick whose inputs produced this state.
    pub tick: u64,
    /// FU×Reg rows.
    pub matrix: Vec<String>,
    /// FU×FU rows.
    pub order: Vec<String>,
    /// Busy latches.
    pub busy: PendingVector,
    /// Per unit, the contexts covering it.
    pub shadows: Vec<PendingVector>,
    /// Per context, the recorded branch sides.
    pub records: Vec<RecordSnapshot>,
}

impl Snapshot {
    /// Captures `state`.
    pub fn capture(state: &ScoreboardState, tick: u64) -> Self {
        let matrix = state
            .matrix
            .rows()
            .map(|row| {
                row.iter()
                    .map(|c| cell_char(c.read_pending, c.write_pending))
                    .collect()
            })
            .collect();
        let n = state.order.units();
        let order = (0..n)
            .map(|x| {
                (0..n)
                    .map(|y| {
                        let c = state.order.cell(x, y);
                        cell_char(c.wait_read, c.wait_write)
                    })
                    .collect()
            })
            .collect();
        let shadows = (0..state.shadows.units())
            .map(|u| state.shadows.contexts_of(u))
            .collect();
        let records = state
            .records
            .iter()
            .map(|r| RecordSnapshot {
                taken: r.side(BranchSide::Taken).clone(),
                not_taken: r.side(BranchSide::NotTaken).clone(),
            })
            .collect();
        Self {
            tick,
            matrix,
            order,
            busy: state.busy.clone(),
            shadows,
            records,
        }
    }

    /// True if every cell is idle in `unit`'s FU×Reg row.
    pub fn row_idle(&self, unit: usize) -> bool {
        self.matrix
            .get(unit)
            .is_none_or(|row| row.chars().all(|c| c == '.'))
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "tick {}", self.tick)?;
        for (u, row) in self.matrix.iter().enumerate() {
            let order = self.order.get(u).map_or("", String::as_str);
            let shadow = self.shadows.get(u).map(ToString::to_string).unwrap_or_default();
            writeln!(
                f,
                "  fu{u:<3} {} {row} | {order} | {shadow}",
                if self.busy.get(u) { 'B' } else { '-' }
            )?;
        }
        for (c, r) in self.records.iter().enumerate() {
            writeln!(f, "  ctx{c:<2} taken {} not_taken {}", r.taken, r.not_taken)?;
        }
        Ok(())
    }
}
