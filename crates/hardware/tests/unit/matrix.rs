//! # Dependency Matrix Tests
//!
//! Tests for the FU×Reg matrix evaluated with every other unit competing,
//! its reducers, and the reset-dominant cell behaviour seen through the
//! whole matrix.

use pretty_assertions::assert_eq;
use shadowboard_core::common::PendingVector;
use shadowboard_core::matrix::{
    Competitors, DependencyCell, DependencyMatrix, GlobalPendingReducer, MatrixInputs,
    OperandMask, PendingAggregator, RegisterReservation,
};

use crate::common::oracle;

fn ones(n: usize) -> PendingVector {
    PendingVector::ones(n)
}

fn writable(m: &DependencyMatrix) -> PendingVector {
    m.evaluate(Competitors::AllOthers, &ones(m.units()))
        .unwrap()
        .writable
}

/// Two units both claim r1 at t0; unit 0 writes at t1; unit 1 may write at t2.
#[test]
fn test_scenario_competing_writers() {
    let t0 = DependencyMatrix::new(2, 4).unwrap();
    assert!(!writable(&t0).get(1));

    let t1 = t0
        .commit(
            &MatrixInputs::idle(2, 4)
                .issue(0, OperandMask::new(4, [1], []))
                .issue(1, OperandMask::new(4, [1], [])),
        )
        .unwrap();
    assert!(!writable(&t1).get(1));
    assert!(!writable(&t1).get(0));

    let t2 = t1.commit(&MatrixInputs::idle(2, 4).go_write(0)).unwrap();
    assert!(t2.row(0).iter().all(|c| c.is_idle()));
    assert!(writable(&t2).get(1));
}

#[test]
fn test_reader_blocks_writer_until_go_read() {
    let m = DependencyMatrix::new(2, 4)
        .unwrap()
        .commit(
            &MatrixInputs::idle(2, 4)
                .issue(0, OperandMask::new(4, [], [2]))
                .issue(1, OperandMask::new(4, [2], [])),
        )
        .unwrap();
    let out = m.evaluate(Competitors::AllOthers, &ones(2)).unwrap();
    assert!(out.readable.get(0));
    assert!(!out.writable.get(1));

    let m = m.commit(&MatrixInputs::idle(2, 4).go_read(0)).unwrap();
    assert!(writable(&m).get(1));
}

#[test]
fn test_unit_with_unread_sources_is_not_writable() {
    let m = DependencyMatrix::new(1, 4)
        .unwrap()
        .commit(&MatrixInputs::idle(1, 4).issue(0, OperandMask::new(4, [0], [3])))
        .unwrap();
    assert!(!writable(&m).get(0));
    let m = m.commit(&MatrixInputs::idle(1, 4).go_read(0)).unwrap();
    assert!(writable(&m).get(0));
}

#[test]
fn test_shadowed_unit_is_never_writable() {
    let m = DependencyMatrix::new(1, 4)
        .unwrap()
        .commit(&MatrixInputs::idle(1, 4).issue(0, OperandMask::new(4, [0], [])))
        .unwrap();
    let out = m
        .evaluate(Competitors::AllOthers, &PendingVector::zeros(1))
        .unwrap();
    assert!(!out.writable.get(0));
}

#[test]
fn test_go_die_clears_row_over_simultaneous_issue() {
    let m = DependencyMatrix::new(2, 4)
        .unwrap()
        .commit(&MatrixInputs::idle(2, 4).issue(0, OperandMask::new(4, [1], [2, 3])))
        .unwrap();
    let m = m
        .commit(
            &MatrixInputs::idle(2, 4)
                .issue(0, OperandMask::new(4, [0], []))
                .go_die(0),
        )
        .unwrap();
    assert!(m.is_idle());
}

#[test]
fn test_go_die_on_idle_row_is_noop() {
    let m = DependencyMatrix::new(2, 4)
        .unwrap()
        .commit(&MatrixInputs::idle(2, 4).issue(1, OperandMask::new(4, [1], [])))
        .unwrap();
    let next = m.commit(&MatrixInputs::idle(2, 4).go_die(0)).unwrap();
    assert_eq!(next, m);
}

#[test]
fn test_column_and_global_reductions() {
    let m = DependencyMatrix::new(3, 4)
        .unwrap()
        .commit(
            &MatrixInputs::idle(3, 4)
                .issue(0, OperandMask::new(4, [1], [2]))
                .issue(2, OperandMask::new(4, [3], [2])),
        )
        .unwrap();
    let out = m.evaluate(Competitors::AllOthers, &ones(3)).unwrap();
    assert_eq!(out.col_read_pending.to_string(), "0010");
    assert_eq!(out.col_write_pending.to_string(), "0101");
    assert_eq!(out.global_write_pending, out.col_write_pending);
    assert_eq!(out.rd_pend.to_string(), "101");
    assert_eq!(out.wr_pend.to_string(), "101");

    let column = RegisterReservation::reduce(m.column(2), 3);
    assert_eq!(column.readers.to_string(), "101");
    assert!(column.writers.none());
}

#[test]
fn test_row_aggregation_matches_cells() {
    let row = [
        DependencyCell::IDLE,
        DependencyCell {
            read_pending: true,
            write_pending: false,
        },
        DependencyCell {
            read_pending: true,
            write_pending: true,
        },
    ];
    let pending = PendingAggregator::reduce(&row);
    assert_eq!(pending.reads.to_string(), "011");
    assert_eq!(pending.writes.to_string(), "001");
    assert!(pending.read_pending());
    assert!(pending.write_pending());
}

#[test]
fn test_exclusive_reduction_skips_own_row() {
    let rows = vec![
        PendingVector::from_indices(4, [0]),
        PendingVector::from_indices(4, [1]),
        PendingVector::from_indices(4, [0, 3]),
    ];
    let others = GlobalPendingReducer::exclusive(&rows, 4);
    assert_eq!(others[0].to_string(), "1101");
    assert_eq!(others[1].to_string(), "1001");
    assert_eq!(others[2].to_string(), "1100");
}

#[test]
fn test_evaluate_matches_pairwise_oracle() {
    let m = DependencyMatrix::new(3, 4)
        .unwrap()
        .commit(
            &MatrixInputs::idle(3, 4)
                .issue(0, OperandMask::new(4, [0], [1]))
                .issue(1, OperandMask::new(4, [1], [2]))
                .issue(2, OperandMask::new(4, [3], [])),
        )
        .unwrap();
    let shadown = PendingVector::from_indices(3, [0, 2]);
    let out = m.evaluate(Competitors::AllOthers, &shadown).unwrap();
    assert_eq!(out.readable, oracle::readable_all_others(&m));
    assert_eq!(out.writable, oracle::writable_all_others(&m, &shadown));
    assert!(out.writable.get(2));
}

#[test]
fn test_evaluate_rejects_mismatched_shadow_mask() {
    let m = DependencyMatrix::new(2, 4).unwrap();
    assert!(m.evaluate(Competitors::AllOthers, &ones(3)).is_err());
}
