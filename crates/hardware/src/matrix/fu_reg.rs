//! Function-unit × register dependency matrix.
//!
//! The matrix is the hazard-detection engine proper. It owns one
//! [`DependencyCell`] per (unit, register) pair, stored flat in row-major
//! order, and evaluates two per-unit signals from the current state:
//! 1. **Readable:** no competing unit has a pending write on any register the unit still reads.
//! 2. **Writable:** the unit holds a destination claim, no competing unit has a pending
//!    write (WAW) or read (WAR) on its destinations, its own reads have drained, and no
//!    shadow covers it.
//!
//! Which units count as competitors is chosen by [`Competitors`]: every other
//! unit, or only the units ordered ahead of it by a [`FuFuMatrix`]. The WAW term
//! always ranges over every other unit.
//!
//! Evaluation is a pure function of the current state; [`DependencyMatrix::commit`]
//! returns the next state without touching the current one.

use super::cell::{CellInputs, DependencyCell};
use super::fu_fu::FuFuMatrix;
use super::reduce::{GlobalPendingReducer, PendingAggregator, RegisterReservation, RowPending};
use crate::common::{ConfigError, PendingVector};
use crate::config::cell_count;

/// Unary destination and source masks for one operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperandMask {
    /// Registers the operation writes.
    pub dest: PendingVector,
    /// Registers the operation reads.
    pub src: PendingVector,
}

impl OperandMask {
    /// Decodes register index lists into masks.
    ///
    /// # Panics
    ///
    /// Panics if an index is not below `n_regs`.
    pub fn new<D, S>(n_regs: usize, dests: D, srcs: S) -> Self
    where
        D: IntoIterator<Item = usize>,
        S: IntoIterator<Item = usize>,
    {
        Self {
            dest: PendingVector::from_indices(n_regs, dests),
            src: PendingVector::from_indices(n_regs, srcs),
        }
    }

    /// An operation with no operands.
    pub fn empty(n_regs: usize) -> Self {
        Self {
            dest: PendingVector::zeros(n_regs),
            src: PendingVector::zeros(n_regs),
        }
    }
}

/// Latched inputs applied at a tick boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatrixInputs {
    /// Units being issued this tick.
    pub issue: PendingVector,
    /// Operand masks, one per unit; only read for units in `issue`.
    pub operands: Vec<OperandMask>,
    /// Units that fetched their operands.
    pub go_read: PendingVector,
    /// Units that wrote their results.
    pub go_write: PendingVector,
    /// Units whose operations are cancelled.
    pub go_die: PendingVector,
}

impl MatrixInputs {
    /// Inputs with nothing asserted.
    pub fn idle(n_units: usize, n_regs: usize) -> Self {
        Self {
            issue: PendingVector::zeros(n_units),
            operands: vec![OperandMask::empty(n_regs); n_units],
            go_read: PendingVector::zeros(n_units),
            go_write: PendingVector::zeros(n_units),
            go_die: PendingVector::zeros(n_units),
        }
    }

    /// Adds an issue of `mask` to `unit`.
    ///
    /// # Panics
    ///
    /// Panics if `unit` is out of range.
    #[must_use]
    pub fn issue(mut self, unit: usize, mask: OperandMask) -> Self {
        self.issue.set(unit, true);
        self.operands[unit] = mask;
        self
    }

    /// Asserts go-read for `unit`.
    #[must_use]
    pub fn go_read(mut self, unit: usize) -> Self {
        self.go_read.set(unit, true);
        self
    }

    /// Asserts go-write for `unit`.
    #[must_use]
    pub fn go_write(mut self, unit: usize) -> Self {
        self.go_write.set(unit, true);
        self
    }

    /// Asserts go-die for `unit`.
    #[must_use]
    pub fn go_die(mut self, unit: usize) -> Self {
        self.go_die.set(unit, true);
        self
    }

    fn cell_inputs(&self, unit: usize, reg: usize) -> CellInputs {
        let issue = self.issue.get(unit);
        let ops = &self.operands[unit];
        CellInputs {
            issue,
            dest: issue && ops.dest.get(reg),
            src: issue && ops.src.get(reg),
            go_read: self.go_read.get(unit),
            go_write: self.go_write.get(unit),
            go_die: self.go_die.get(unit),
        }
    }
}

/// Which units compete with a given unit in the RAW and WAR terms.
#[derive(Clone, Copy, Debug)]
pub enum Competitors<'a> {
    /// Every other unit competes.
    AllOthers,
    /// Only units that held a conflicting claim when the unit issued.
    Ordered(&'a FuFuMatrix),
}

/// Combinational outputs of one evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatrixOutputs {
    /// Per-unit row reductions.
    pub rows: Vec<RowPending>,
    /// Per-unit OR of read latches.
    pub rd_pend: PendingVector,
    /// Per-unit OR of write latches.
    pub wr_pend: PendingVector,
    /// Per-register OR of read latches.
    pub col_read_pending: PendingVector,
    /// Per-register OR of write latches.
    pub col_write_pending: PendingVector,
    /// OR over every unit's write row.
    pub global_write_pending: PendingVector,
    /// Per-unit readable signal.
    pub readable: PendingVector,
    /// Per-unit writable signal.
    pub writable: PendingVector,
}

/// The FU×Reg dependency matrix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DependencyMatrix {
    n_units: usize,
    n_regs: usize,
    cells: Vec<DependencyCell>,
}

impl DependencyMatrix {
    /// Creates an idle matrix.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoUnits`] or [`ConfigError::NoRegisters`] for a zero dimension
    /// and [`ConfigError::TooLarge`] if the cell count overflows.
    pub fn new(n_units: usize, n_regs: usize) -> Result<Self, ConfigError> {
        if n_units == 0 {
            return Err(ConfigError::NoUnits);
        }
        if n_regs == 0 {
            return Err(ConfigError::NoRegisters);
        }
        let cells = cell_count("dependency matrix", n_units, n_regs)?;
        Ok(Self {
            n_units,
            n_regs,
            cells: vec![DependencyCell::IDLE; cells],
        })
    }

    /// Number of function units (rows).
    pub const fn units(&self) -> usize {
        self.n_units
    }

    /// Number of registers (columns).
    pub const fn registers(&self) -> usize {
        self.n_regs
    }

    /// One cell.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub fn cell(&self, unit: usize, reg: usize) -> DependencyCell {
        assert!(reg < self.n_regs, "register {reg} out of range");
        self.cells[unit * self.n_regs + reg]
    }

    /// A unit's row.
    pub fn row(&self, unit: usize) -> &[DependencyCell] {
        &self.cells[unit * self.n_regs..(unit + 1) * self.n_regs]
    }

    /// A register's column, in unit order.
    pub fn column(&self, reg: usize) -> impl Iterator<Item = &DependencyCell> + '_ {
        self.cells.iter().skip(reg).step_by(self.n_regs)
    }

    /// Every row, in unit order.
    pub fn rows(&self) -> impl Iterator<Item = &[DependencyCell]> + '_ {
        self.cells.chunks(self.n_regs)
    }

    /// True if no cell is pending.
    pub fn is_idle(&self) -> bool {
        self.cells.iter().all(|c| c.is_idle())
    }

    /// Row reductions for every unit.
    pub fn row_pending(&self) -> Vec<RowPending> {
        self.rows().map(PendingAggregator::reduce).collect()
    }

    /// Evaluates readable/writable and the pending vectors.
    ///
    /// `shadown` gates writable: a unit whose bit is clear is never writable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DimensionMismatch`] if `shadown` or an ordering
    /// matrix does not share this matrix's unit axis.
    pub fn evaluate(
        &self,
        competitors: Competitors<'_>,
        shadown: &PendingVector,
    ) -> Result<MatrixOutputs, ConfigError> {
        self.check_units("shadow mask units", shadown.len())?;
        let rows = self.row_pending();
        let reads: Vec<PendingVector> = rows.iter().map(|r| r.reads.clone()).collect();
        let writes: Vec<PendingVector> = rows.iter().map(|r| r.writes.clone()).collect();

        let waw = GlobalPendingReducer::exclusive(&writes, self.n_regs);
        let (raw, war): (Vec<PendingVector>, Vec<PendingVector>) = match competitors {
            Competitors::AllOthers => (
                waw.clone(),
                GlobalPendingReducer::exclusive(&reads, self.n_regs),
            ),
            Competitors::Ordered(order) => {
                self.check_units("fu-fu matrix units", order.units())?;
                (0..self.n_units)
                    .map(|u| {
                        (
                            GlobalPendingReducer::reduce_selected(
                                &writes,
                                &order.waits_on_write(u),
                                self.n_regs,
                            ),
                            GlobalPendingReducer::reduce_selected(
                                &reads,
                                &order.waits_on_read(u),
                                self.n_regs,
                            ),
                        )
                    })
                    .unzip()
            }
        };

        let readable = rows
            .iter()
            .zip(&raw)
            .map(|(row, raw)| !raw.intersects(&row.reads))
            .collect();
        let writable = rows
            .iter()
            .enumerate()
            .map(|(u, row)| {
                row.write_pending()
                    && !waw[u].intersects(&row.writes)
                    && !war[u].intersects(&row.writes)
                    && !row.read_pending()
                    && shadown.get(u)
            })
            .collect();

        let columns: Vec<_> = (0..self.n_regs)
            .map(|r| RegisterReservation::reduce(self.column(r), self.n_units))
            .collect();

        Ok(MatrixOutputs {
            rd_pend: rows.iter().map(RowPending::read_pending).collect(),
            wr_pend: rows.iter().map(RowPending::write_pending).collect(),
            col_read_pending: columns.iter().map(|c| c.read_pending()).collect(),
            col_write_pending: columns.iter().map(|c| c.write_pending()).collect(),
            global_write_pending: GlobalPendingReducer::reduce(&writes, self.n_regs),
            readable,
            writable,
            rows,
        })
    }

    /// Next-state function. Every cell updates from this snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DimensionMismatch`] if `inputs` was built for
    /// different dimensions.
    pub fn commit(&self, inputs: &MatrixInputs) -> Result<Self, ConfigError> {
        self.check_inputs(inputs)?;
        let cells = self
            .cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let (u, r) = (i / self.n_regs, i % self.n_regs);
                cell.next(inputs.cell_inputs(u, r))
            })
            .collect();
        Ok(Self {
            n_units: self.n_units,
            n_regs: self.n_regs,
            cells,
        })
    }

    pub(crate) fn check_inputs(&self, inputs: &MatrixInputs) -> Result<(), ConfigError> {
        self.check_units("issue vector units", inputs.issue.len())?;
        self.check_units("operand mask units", inputs.operands.len())?;
        self.check_units("go-read vector units", inputs.go_read.len())?;
        self.check_units("go-write vector units", inputs.go_write.len())?;
        self.check_units("go-die vector units", inputs.go_die.len())?;
        for ops in &inputs.operands {
            for found in [ops.dest.len(), ops.src.len()] {
                if found != self.n_regs {
                    return Err(ConfigError::DimensionMismatch {
                        what: "operand mask registers",
                        expected: self.n_regs,
                        found,
                    });
                }
            }
        }
        Ok(())
    }

    fn check_units(&self, what: &'static str, found: usize) -> Result<(), ConfigError> {
        if found == self.n_units {
            Ok(())
        } else {
            Err(ConfigError::DimensionMismatch {
                what,
                expected: self.n_units,
                found,
            })
        }
    }
}
