//! Hazard-detection matrices.
//!
//! This module contains the dependency-tracking state of the scoreboard. It includes:
//! 1. **Cells:** The per-(unit, register) read/write latch pair.
//! 2. **Reducers:** Row, column and global OR-reductions over cells.
//! 3. **FU×Reg Matrix:** The cell array with its readable/writable evaluation.
//! 4. **FU×FU Matrix:** The issue-order record deciding which units compete.
//! 5. **LD/ST Matrix:** Memory ordering between loads and stores, gated by partial address matches.

/// Dependency cell.
pub mod cell;

/// Issue-order matrix.
pub mod fu_fu;

/// Dependency matrix.
pub mod fu_reg;

/// Load/store dependency matrix.
pub mod ldst;

/// OR-reducers.
pub mod reduce;

pub use cell::{CellInputs, CellState, DependencyCell};
pub use fu_fu::{FuFuMatrix, OrderCell};
pub use fu_reg::{Competitors, DependencyMatrix, MatrixInputs, MatrixOutputs, OperandMask};
pub use ldst::{LdStCell, LdStInputs, LdStMatrix, LdStOutputs, MemOp, PartialAddrMatch};
pub use reduce::{
    ColumnPending, GlobalPendingReducer, PendingAggregator, RegisterReservation, RowPending,
};
