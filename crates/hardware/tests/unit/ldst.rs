//! # LD/ST Matrix Tests
//!
//! Memory ordering between loads and stores: which operation holds which,
//! how address matching gates the hold, and how completion and die clear it.

use pretty_assertions::assert_eq;
use shadowboard_core::matrix::{
    LdStCell, LdStInputs, LdStMatrix, LdStOutputs, MemOp, PartialAddrMatch,
};

const UNITS: usize = 3;

fn step(m: &LdStMatrix, inputs: &LdStInputs) -> LdStMatrix {
    m.commit(inputs).unwrap()
}

fn idle() -> LdStInputs {
    LdStInputs::idle(UNITS)
}

fn addrs(latched: &[(usize, u64)]) -> PartialAddrMatch {
    let mut addrs = PartialAddrMatch::new(UNITS, PartialAddrMatch::DEFAULT_BITS).unwrap();
    for &(unit, addr) in latched {
        addrs.latch(unit, Some(addr)).unwrap();
    }
    addrs
}

fn outputs(m: &LdStMatrix, latched: &[(usize, u64)]) -> LdStOutputs {
    m.evaluate(&addrs(latched).match_rows()).unwrap()
}

/// Unit 0 loads, then unit 1 stores.
fn load_then_store() -> LdStMatrix {
    let m = LdStMatrix::new(UNITS).unwrap();
    let m = step(&m, &idle().issue(0, MemOp::Load));
    step(&m, &idle().issue(1, MemOp::Store))
}

#[test]
fn test_store_waits_for_earlier_load_to_same_address() {
    let m = load_then_store();
    assert!(m.cell(1, 0).load_holds_store);
    assert!(!m.cell(0, 1).store_holds_load);

    let out = outputs(&m, &[(0, 0x100), (1, 0x100)]);
    assert_eq!(out.store_held.to_string(), "010");
    assert_eq!(out.loadable.to_string(), "100");
    assert_eq!(out.storable.to_string(), "000");

    let m = step(&m, &idle().done(0));
    assert_eq!(m.cell(1, 0), LdStCell::default());
    let out = outputs(&m, &[(1, 0x100)]);
    assert_eq!(out.storable.to_string(), "010");
}

#[test]
fn test_load_waits_for_earlier_store() {
    let m = LdStMatrix::new(UNITS).unwrap();
    let m = step(&m, &idle().issue(2, MemOp::Store));
    let m = step(&m, &idle().issue(0, MemOp::Load));
    assert_eq!(m.waits_on_stores(0).to_string(), "001");

    let out = outputs(&m, &[(0, 0x2f8), (2, 0x2f0)]);
    assert_eq!(out.load_held.to_string(), "100");
    assert_eq!(out.loadable.to_string(), "000");
    assert_eq!(out.storable.to_string(), "001");
}

#[test]
fn test_distinct_addresses_do_not_hold() {
    let m = load_then_store();
    let out = outputs(&m, &[(0, 0x100), (1, 0x200)]);
    assert!(out.store_held.none());
    assert_eq!(out.storable.to_string(), "010");
}

#[test]
fn test_unlatched_address_does_not_hold() {
    let m = load_then_store();
    let out = outputs(&m, &[(1, 0x100)]);
    assert!(out.store_held.none());
}

#[test]
fn test_window_alias_serialises() {
    // Equal on bits 4..12, different above the page offset.
    let m = load_then_store();
    let out = outputs(&m, &[(0, 0x1_0340), (1, 0x7_0348)]);
    assert_eq!(out.store_held.to_string(), "010");
}

#[test]
fn test_loads_never_hold_loads() {
    let m = LdStMatrix::new(UNITS).unwrap();
    let m = step(&m, &idle().issue(0, MemOp::Load));
    let m = step(&m, &idle().issue(1, MemOp::Load));
    assert_eq!(m.cell(1, 0), LdStCell::default());
    let out = outputs(&m, &[(0, 0x40), (1, 0x40)]);
    assert_eq!(out.loadable.to_string(), "110");
}

#[test]
fn test_completion_in_issue_tick_wins_over_set() {
    let m = LdStMatrix::new(UNITS).unwrap();
    let m = step(&m, &idle().issue(0, MemOp::Load));
    let m = step(&m, &idle().issue(1, MemOp::Store).done(0));
    assert_eq!(m.cell(1, 0), LdStCell::default());
    assert_eq!(m.loads().to_string(), "000");
    assert_eq!(m.stores().to_string(), "010");
}

#[test]
fn test_die_in_issue_tick_leaves_unit_idle() {
    let m = LdStMatrix::new(UNITS).unwrap();
    let m = step(&m, &idle().issue(0, MemOp::Store).go_die(0));
    assert!(m.is_empty());
}

#[test]
fn test_die_clears_row_and_column() {
    let m = load_then_store();
    let m = step(&m, &idle().issue(2, MemOp::Load));
    assert!(m.cell(2, 1).store_holds_load);

    let m = step(&m, &idle().go_die(1));
    for x in 0..UNITS {
        assert_eq!(m.cell(x, 1), LdStCell::default());
        assert_eq!(m.cell(1, x), LdStCell::default());
    }
    assert_eq!(m.loads().to_string(), "101");
    assert!(m.stores().none());
}
