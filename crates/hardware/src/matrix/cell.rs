//! The (function unit, register) dependency cell.
//!
//! Each cell holds two independent latches recording that a unit has an
//! outstanding read claim and/or write claim on one register. The latches are
//! set by `issue` qualified by the operand role and cleared by the matching
//! go signal or by `go_die`. Reset dominates: if a go or die arrives in the
//! same tick as an issue, the cell ends up idle.

use serde::{Deserialize, Serialize};

/// Observable state of one role latch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    /// No claim.
    Idle,
    /// Claim outstanding, waiting for its go signal.
    Pending,
}

impl From<bool> for CellState {
    fn from(pending: bool) -> Self {
        if pending { Self::Pending } else { Self::Idle }
    }
}

/// Per-tick inputs seen by a single cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellInputs {
    /// The owning unit is being issued a new operation this tick.
    pub issue: bool,
    /// The register is one of the operation's destinations.
    pub dest: bool,
    /// The register is one of the operation's sources.
    pub src: bool,
    /// The owning unit has fetched its operands.
    pub go_read: bool,
    /// The owning unit has written its result.
    pub go_write: bool,
    /// The owning unit's operation is cancelled.
    pub go_die: bool,
}

/// One (unit, register) cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyCell {
    /// The unit still has to read this register.
    pub read_pending: bool,
    /// The unit still has to write this register.
    pub write_pending: bool,
}

impl DependencyCell {
    /// The idle cell.
    pub const IDLE: Self = Self {
        read_pending: false,
        write_pending: false,
    };

    /// Next-state function.
    #[must_use]
    pub const fn next(self, i: CellInputs) -> Self {
        let read_reset = i.go_read || i.go_die;
        let write_reset = i.go_write || i.go_die;
        Self {
            read_pending: !read_reset && (self.read_pending || (i.issue && i.src)),
            write_pending: !write_reset && (self.write_pending || (i.issue && i.dest)),
        }
    }

    /// State of the read latch.
    pub fn read_state(self) -> CellState {
        self.read_pending.into()
    }

    /// State of the write latch.
    pub fn write_state(self) -> CellState {
        self.write_pending.into()
    }

    /// True if neither latch is set.
    pub const fn is_idle(self) -> bool {
        !self.read_pending && !self.write_pending
    }
}
