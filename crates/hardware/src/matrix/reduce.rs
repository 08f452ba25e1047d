//! OR-reducers over dependency cells.
//!
//! Three pure, same-tick reductions turn cell state into hazard vectors:
//! 1. **PendingAggregator:** a unit's row, reduced to the registers it still has to read and write.
//! 2. **RegisterReservation:** a register's column, reduced to the units that claim it.
//! 3. **GlobalPendingReducer:** per-unit vectors combined into one global vector, either over
//!    every unit, over every unit except the one asking, or over a selected subset.

use super::cell::DependencyCell;
use crate::common::PendingVector;

/// A unit's row, reduced over its cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowPending {
    /// Registers the unit still has to read.
    pub reads: PendingVector,
    /// Registers the unit still has to write.
    pub writes: PendingVector,
}

impl RowPending {
    /// An empty row over `n_regs` registers.
    pub fn empty(n_regs: usize) -> Self {
        Self {
            reads: PendingVector::zeros(n_regs),
            writes: PendingVector::zeros(n_regs),
        }
    }

    /// OR over the row's read latches.
    pub fn read_pending(&self) -> bool {
        self.reads.any()
    }

    /// OR over the row's write latches.
    pub fn write_pending(&self) -> bool {
        self.writes.any()
    }
}

/// Row reducer (one per function unit).
#[derive(Clone, Copy, Debug, Default)]
pub struct PendingAggregator;

impl PendingAggregator {
    /// Reduces one row of cells.
    pub fn reduce(row: &[DependencyCell]) -> RowPending {
        RowPending {
            reads: row.iter().map(|c| c.read_pending).collect(),
            writes: row.iter().map(|c| c.write_pending).collect(),
        }
    }
}

/// A register's column, reduced over its cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnPending {
    /// Units with an outstanding read of the register.
    pub readers: PendingVector,
    /// Units with an outstanding write of the register.
    pub writers: PendingVector,
}

impl ColumnPending {
    /// OR over the column's read latches.
    pub fn read_pending(&self) -> bool {
        self.readers.any()
    }

    /// OR over the column's write latches.
    pub fn write_pending(&self) -> bool {
        self.writers.any()
    }
}

/// Column reducer (one per register).
#[derive(Clone, Copy, Debug, Default)]
pub struct RegisterReservation;

impl RegisterReservation {
    /// Reduces one column of cells, given in unit order.
    pub fn reduce<'a, I>(column: I, n_units: usize) -> ColumnPending
    where
        I: IntoIterator<Item = &'a DependencyCell>,
    {
        let mut readers = PendingVector::zeros(n_units);
        let mut writers = PendingVector::zeros(n_units);
        for (u, cell) in column.into_iter().enumerate().take(n_units) {
            if cell.read_pending {
                readers.set(u, true);
            }
            if cell.write_pending {
                writers.set(u, true);
            }
        }
        ColumnPending { readers, writers }
    }
}

/// Global feedback reducer.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlobalPendingReducer;

impl GlobalPendingReducer {
    /// OR over every vector.
    pub fn reduce<'a, I>(vectors: I, width: usize) -> PendingVector
    where
        I: IntoIterator<Item = &'a PendingVector>,
    {
        vectors
            .into_iter()
            .fold(PendingVector::zeros(width), |mut acc, v| {
                acc.or_assign(v);
                acc
            })
    }

    /// For every index `i`, the OR of all vectors except `vectors[i]`.
    ///
    /// Computed with prefix and suffix ORs so the cost stays linear in the
    /// number of vectors.
    pub fn exclusive(vectors: &[PendingVector], width: usize) -> Vec<PendingVector> {
        let n = vectors.len();
        let mut prefix = Vec::with_capacity(n + 1);
        prefix.push(PendingVector::zeros(width));
        for v in vectors {
            let next = prefix.last().map_or_else(|| v.clone(), |p| p | v);
            prefix.push(next);
        }
        let mut out = vec![PendingVector::zeros(width); n];
        let mut suffix = PendingVector::zeros(width);
        for i in (0..n).rev() {
            out[i] = &prefix[i] | &suffix;
            suffix.or_assign(&vectors[i]);
        }
        out
    }

    /// OR over the vectors whose index is set in `selected`.
    pub fn reduce_selected(
        vectors: &[PendingVector],
        selected: &PendingVector,
        width: usize,
    ) -> PendingVector {
        Self::reduce(selected.iter_ones().filter_map(|i| vectors.get(i)), width)
    }
}
