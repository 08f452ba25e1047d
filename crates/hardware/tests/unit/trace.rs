//! # Trace Tests
//!
//! Tests for loading traces from disk, replaying them and dumping the
//! per-tick records.

use std::io::Write;

use pretty_assertions::assert_eq;
use shadowboard_core::common::SimError;
use shadowboard_core::sched::{IssueRequest, TickInputs};
use shadowboard_core::sim::Trace;
use tempfile::NamedTempFile;

use crate::common::builder::ConfigBuilder;
use crate::common::harness::init_tracing;

const COMPETING_WRITERS: &str = r#"{
    "config": {
        "matrix": { "registers": 4, "shadow_width": 1 },
        "units": [ { "name": "fu", "count": 2 } ]
    },
    "ticks": [
        { "issue": { "target": { "unit": 0 }, "dest": [1] } },
        { "issue": { "target": { "unit": 1 }, "src": [1], "dest": [2] } },
        { "go_read": [], "go_write": [0] },
        { "go_read": [1] },
        { "go_write": [1] }
    ]
}"#;

#[test]
fn test_load_and_replay_from_file() {
    init_tracing();
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(COMPETING_WRITERS.as_bytes()).unwrap();
    let trace = Trace::load(file.path()).unwrap();
    assert_eq!(trace.ticks.len(), 5);

    let records = trace.replay().unwrap();
    assert_eq!(records.len(), 5);
    assert_eq!(records[1].state.matrix, vec![".w..", ".rw."]);
    assert_eq!(records[1].state.order, vec!["..", "w."]);
    assert!(records[2].outputs.writable.get(0));
    assert!(!records[2].outputs.readable.get(1));
    assert!(records[3].outputs.readable.get(1));
    assert!(records[4].state.matrix.iter().all(|row| row == "...."));
    assert_eq!(records[4].state.tick, 5);
}

#[test]
fn test_dump_is_json_array_of_records() {
    let records = Trace::from_json(COMPETING_WRITERS).unwrap().replay().unwrap();
    let dump = Trace::dump(&records).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&dump).unwrap();
    let array = parsed.as_array().unwrap();
    assert_eq!(array.len(), 5);
    assert_eq!(array[0]["outputs"]["grant"]["unit"], 0);
    assert_eq!(array[1]["state"]["matrix"][1], ".rw.");
    assert_eq!(array[2]["outputs"]["writable"], "10");
}

#[test]
fn test_built_trace_serializes_and_reloads() {
    let trace = Trace {
        config: ConfigBuilder::new().build(),
        ticks: vec![
            TickInputs::default().with_issue(IssueRequest::to_class(0.into()).dest([3])),
            TickInputs::default().with_go_read(0),
            TickInputs::default().with_go_write(0),
        ],
    };
    let json = serde_json::to_string(&trace).unwrap();
    let reloaded = Trace::from_json(&json).unwrap();
    assert_eq!(reloaded, trace);
    let records = reloaded.replay().unwrap();
    assert!(records.last().unwrap().outputs.writable.get(0));
}

#[test]
fn test_malformed_trace_is_parse_error() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"{ \"ticks\": [ { \"go_read\": \"zero\" } ] }").unwrap();
    assert!(matches!(Trace::load(file.path()), Err(SimError::Parse(_))));
}

#[test]
fn test_empty_trace_replays_nothing() {
    let records = Trace::from_json("{}").unwrap().replay().unwrap();
    assert!(records.is_empty());
}
