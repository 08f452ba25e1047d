//! # Property Tests
//!
//! Random tick sequences against a small scoreboard, checking after every
//! tick that:
//! - no register is ever claimed by two writers at once;
//! - go-read and go-write always clear the unit's latches by the next tick;
//! - cancelling an idle unit leaves it idle;
//! - a branch resolution splits its recorded units cleanly into confirmed and
//!   cancelled, and cancelled rows are idle on the next tick;
//! - readable and writable agree with the pairwise oracle.

use proptest::collection::vec;
use proptest::option;
use proptest::prelude::*;
use shadowboard_core::common::{ClassId, UnitId};
use shadowboard_core::matrix::Competitors;
use shadowboard_core::sched::{IssueRequest, ScoreboardState, TickInputs, TickOutputs};
use shadowboard_core::shadow::BranchSide;

use crate::common::builder::ConfigBuilder;
use crate::common::harness::TestContext;
use crate::common::oracle;

const UNITS: usize = 3;
const REGS: usize = 4;

fn issue_strategy() -> impl Strategy<Value = Option<IssueRequest>> {
    option::of((
        vec(0..REGS, 0..=1),
        vec(0..REGS, 0..=2),
        option::of(any::<bool>()),
    ))
    .prop_map(|req| {
        req.map(|(dest, src, side)| {
            let req = IssueRequest::to_class(ClassId(0)).dest(dest).src(src);
            match side {
                Some(taken) => req.shadow(0, BranchSide::of(taken)),
                None => req,
            }
        })
    })
}

fn tick_strategy() -> impl Strategy<Value = TickInputs> {
    (
        issue_strategy(),
        vec(0..UNITS, 0..=2),
        vec(0..UNITS, 0..=2),
        option::weighted(0.1, 0..UNITS),
        option::weighted(0.2, any::<bool>()),
    )
        .prop_map(|(issue, go_read, go_write, go_die, branch)| {
            let mut inputs = TickInputs {
                issue,
                go_read: go_read.into_iter().map(UnitId).collect(),
                go_write: go_write.into_iter().map(UnitId).collect(),
                ..TickInputs::default()
            };
            if let Some(unit) = go_die {
                inputs = inputs.with_go_die(unit);
            }
            if let Some(taken) = branch {
                inputs = inputs.with_branch(0, taken);
            }
            inputs
        })
}

/// Drops go signals the current outputs do not allow.
fn respect_protocol(mut inputs: TickInputs, view: &TickOutputs) -> TickInputs {
    inputs.go_read.retain(|u| view.readable.get(u.index()));
    inputs.go_write.retain(|u| view.writable.get(u.index()));
    inputs
}

fn context() -> TestContext {
    TestContext::new(
        &ConfigBuilder::new()
            .units(UNITS)
            .registers(REGS)
            .shadow_width(1)
            .build(),
    )
}

fn row_idle(state: &ScoreboardState, unit: usize) -> bool {
    state.matrix.row(unit).iter().all(|c| c.is_idle())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_single_writer_per_register(ticks in vec(tick_strategy(), 1..40)) {
        let mut ctx = context();
        for inputs in ticks {
            let view = ctx.view();
            let _ = ctx.tick(respect_protocol(inputs, &view));
            let writers = oracle::writers_per_register(&ctx.board.state().matrix);
            prop_assert!(writers.iter().all(|&n| n <= 1), "writers per register: {:?}", writers);
        }
    }

    #[test]
    fn prop_go_signals_clear_latches(ticks in vec(tick_strategy(), 1..40)) {
        let mut ctx = context();
        for inputs in ticks {
            let idle_before: Vec<bool> =
                (0..UNITS).map(|u| row_idle(ctx.board.state(), u)).collect();
            let out = ctx.tick(inputs.clone());
            let state = ctx.board.state();
            for u in &inputs.go_read {
                prop_assert!(state.matrix.row(u.index()).iter().all(|c| !c.read_pending));
            }
            for u in &inputs.go_write {
                prop_assert!(state.matrix.row(u.index()).iter().all(|c| !c.write_pending));
                prop_assert!(!state.busy.get(u.index()));
            }
            for u in out.go_die.iter_ones() {
                prop_assert!(row_idle(state, u));
                prop_assert!(!state.busy.get(u));
                prop_assert!(state.shadows.contexts_of(u).none());
            }
            let issued = out.grant.unit.map(UnitId::index);
            for (u, was_idle) in idle_before.into_iter().enumerate() {
                if was_idle && issued != Some(u) {
                    prop_assert!(row_idle(state, u), "idle fu{} picked up a claim", u);
                }
            }
        }
    }

    #[test]
    fn prop_resolution_partitions_record(ticks in vec(tick_strategy(), 1..40)) {
        let mut ctx = context();
        for inputs in ticks {
            let view = ctx.view();
            let inputs = respect_protocol(inputs, &view);
            let before = ctx.board.state().records[0].clone();
            let out = ctx.tick(inputs.clone());
            if inputs.branch.is_empty() {
                prop_assert!(out.confirmed.none());
                prop_assert!(out.cancelled.none());
                continue;
            }
            let recorded = before.side(BranchSide::Taken) | before.side(BranchSide::NotTaken);
            prop_assert!(!out.confirmed.intersects(&out.cancelled));
            prop_assert_eq!(&out.confirmed | &out.cancelled, recorded);
            let state = ctx.board.state();
            for u in out.cancelled.iter_ones() {
                prop_assert!(out.go_die.get(u));
                prop_assert!(row_idle(state, u));
            }
        }
    }

    #[test]
    fn prop_outputs_match_pairwise_oracle(ticks in vec(tick_strategy(), 1..40)) {
        let mut ctx = context();
        for inputs in ticks {
            let view = ctx.view();
            let state = ctx.board.state();

            let expected_readable =
                &oracle::readable_ordered(&state.matrix, &state.order) & &state.busy;
            prop_assert_eq!(&view.readable, &expected_readable);

            for u in 0..UNITS {
                if !oracle::write_rivals(&state.matrix, u).is_empty() {
                    prop_assert!(!view.writable.get(u), "fu{} writable with a rival writer", u);
                }
            }

            let unordered = state
                .matrix
                .evaluate(Competitors::AllOthers, &view.shadown)
                .unwrap();
            prop_assert_eq!(unordered.readable, oracle::readable_all_others(&state.matrix));
            prop_assert_eq!(
                unordered.writable,
                oracle::writable_all_others(&state.matrix, &view.shadown)
            );

            let _ = ctx.tick(respect_protocol(inputs, &view));
        }
    }

    #[test]
    fn prop_idle_ticks_drain_to_quiescence(ticks in vec(tick_strategy(), 1..30)) {
        let mut ctx = context();
        for inputs in ticks {
            let view = ctx.view();
            let _ = ctx.tick(respect_protocol(inputs, &view));
        }
        // Cancel everything still in flight and resolve the context.
        let mut drain = TickInputs::default().with_branch(0, true);
        drain.go_die = (0..UNITS).map(UnitId).collect();
        let _ = ctx.tick(drain);
        prop_assert!(ctx.board.state().is_quiescent());
    }
}
