//! Function-unit × function-unit issue-order matrix.
//!
//! Cell (x, y) records that unit x, at the tick it issued, found unit y
//! already holding a claim that conflicts with x's operands:
//! - `wait_write`: y had a pending write on one of x's sources (x must read after y writes);
//! - `wait_read`: y had a pending read on one of x's destinations (x must write after y reads).
//!
//! The cells are filled from the FU×Reg matrix's *current* rows, so units
//! issued in the same tick never wait on each other. The diagonal is never
//! set. Reset dominates: y's go-read clears `wait_read`, y's go-write clears
//! `wait_write`, and a die on either unit or a go-write on x clears the cell.

use serde::{Deserialize, Serialize};

use super::fu_reg::MatrixInputs;
use super::reduce::RowPending;
use crate::common::{ConfigError, PendingVector};
use crate::config::cell_count;

/// One (x, y) ordering cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderCell {
    /// x waits for y to read (WAR).
    pub wait_read: bool,
    /// x waits for y to write (RAW).
    pub wait_write: bool,
}

/// The FU×FU issue-order matrix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FuFuMatrix {
    n_units: usize,
    cells: Vec<OrderCell>,
}

impl FuFuMatrix {
    /// Creates an empty matrix.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoUnits`] if `n_units` is zero and
    /// [`ConfigError::TooLarge`] if the cell count overflows.
    pub fn new(n_units: usize) -> Result<Self, ConfigError> {
        if n_units == 0 {
            return Err(ConfigError::NoUnits);
        }
        let cells = cell_count("issue-order matrix", n_units, n_units)?;
        Ok(Self {
            n_units,
            cells: vec![OrderCell::default(); cells],
        })
    }

    /// Number of units on each axis.
    pub const fn units(&self) -> usize {
        self.n_units
    }

    /// One cell.
    pub fn cell(&self, x: usize, y: usize) -> OrderCell {
        self.cells[x * self.n_units + y]
    }

    /// Units x must wait on before it may write.
    pub fn waits_on_read(&self, x: usize) -> PendingVector {
        self.row(x).iter().map(|c| c.wait_read).collect()
    }

    /// Units x must wait on before it may read.
    pub fn waits_on_write(&self, x: usize) -> PendingVector {
        self.row(x).iter().map(|c| c.wait_write).collect()
    }

    /// True if no ordering is recorded.
    pub fn is_empty(&self) -> bool {
        self.cells
            .iter()
            .all(|c| !c.wait_read && !c.wait_write)
    }

    /// Next-state function.
    ///
    /// `rows` are the FU×Reg row reductions of the same snapshot `inputs`
    /// is applied to.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DimensionMismatch`] if `rows` or `inputs` do not
    /// share this matrix's unit axis.
    pub fn commit(&self, rows: &[RowPending], inputs: &MatrixInputs) -> Result<Self, ConfigError> {
        for (what, found) in [
            ("fu-reg rows", rows.len()),
            ("issue vector units", inputs.issue.len()),
            ("operand mask units", inputs.operands.len()),
        ] {
            if found != self.n_units {
                return Err(ConfigError::DimensionMismatch {
                    what,
                    expected: self.n_units,
                    found,
                });
            }
        }
        let n = self.n_units;
        let mut cells = Vec::with_capacity(n * n);
        for x in 0..n {
            let issue_x = inputs.issue.get(x);
            let ops = &inputs.operands[x];
            let row_reset = inputs.go_die.get(x) || inputs.go_write.get(x);
            for y in 0..n {
                let old = self.cell(x, y);
                if x == y || row_reset {
                    cells.push(OrderCell::default());
                    continue;
                }
                let die_y = inputs.go_die.get(y);
                let read_reset = inputs.go_read.get(y) || die_y;
                let write_reset = inputs.go_write.get(y) || die_y;
                let set_read = issue_x && rows[y].reads.intersects(&ops.dest);
                let set_write = issue_x && rows[y].writes.intersects(&ops.src);
                cells.push(OrderCell {
                    wait_read: !read_reset && (old.wait_read || set_read),
                    wait_write: !write_reset && (old.wait_write || set_write),
                });
            }
        }
        Ok(Self { n_units: n, cells })
    }

    fn row(&self, x: usize) -> &[OrderCell] {
        &self.cells[x * self.n_units..(x + 1) * self.n_units]
    }
}
