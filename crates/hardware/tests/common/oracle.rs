//! Brute-force reference for the matrix reductions.
//!
//! Every check here walks the dependency cells pairwise, unit against unit,
//! instead of going through the OR-reducers. Property tests compare the
//! reduced outputs against these.

use shadowboard_core::common::PendingVector;
use shadowboard_core::matrix::{DependencyMatrix, FuFuMatrix};

/// Readable, with every other unit competing.
pub fn readable_all_others(m: &DependencyMatrix) -> PendingVector {
    (0..m.units())
        .map(|u| {
            (0..m.registers()).all(|r| {
                !m.cell(u, r).read_pending
                    || (0..m.units()).all(|v| v == u || !m.cell(v, r).write_pending)
            })
        })
        .collect()
}

/// Readable, with only the units `u` waits on for a write competing.
pub fn readable_ordered(m: &DependencyMatrix, order: &FuFuMatrix) -> PendingVector {
    (0..m.units())
        .map(|u| {
            (0..m.registers()).all(|r| {
                !m.cell(u, r).read_pending
                    || (0..m.units()).all(|v| {
                        v == u || !order.cell(u, v).wait_write || !m.cell(v, r).write_pending
                    })
            })
        })
        .collect()
}

/// Writable, with every other unit competing.
pub fn writable_all_others(m: &DependencyMatrix, shadown: &PendingVector) -> PendingVector {
    (0..m.units())
        .map(|u| {
            let row = m.row(u);
            let claims = row.iter().any(|c| c.write_pending);
            let reads_left = row.iter().any(|c| c.read_pending);
            let contested = (0..m.registers()).any(|r| {
                m.cell(u, r).write_pending
                    && (0..m.units()).any(|v| {
                        v != u && (m.cell(v, r).write_pending || m.cell(v, r).read_pending)
                    })
            });
            claims && !reads_left && !contested && shadown.get(u)
        })
        .collect()
}

/// Units other than `u` holding a write claim on a register `u` also claims.
pub fn write_rivals(m: &DependencyMatrix, u: usize) -> Vec<usize> {
    (0..m.units())
        .filter(|&v| {
            v != u
                && (0..m.registers())
                    .any(|r| m.cell(u, r).write_pending && m.cell(v, r).write_pending)
        })
        .collect()
}

/// Number of units holding a write claim on each register.
pub fn writers_per_register(m: &DependencyMatrix) -> Vec<usize> {
    (0..m.registers())
        .map(|r| m.column(r).filter(|c| c.write_pending).count())
        .collect()
}
