//! The scoreboard: hazard matrices, shadows and issue logic under one clock.
//!
//! A [`Scoreboard`] composes the FU×Reg dependency matrix, the FU×FU
//! issue-order matrix, the shadow matrix, one branch speculation record per
//! context, the per-unit busy latches and the per-class issue arbiters.
//!
//! Every tick runs in two passes over an immutable snapshot:
//! 1. **Evaluate:** resolve branches, compute shadow outputs and cancellations,
//!    evaluate readable/writable, and arbitrate the issue request.
//! 2. **Commit:** compute the next state of every component from the same
//!    snapshot into a fresh [`ScoreboardState`], then swap it in.
//!
//! Nothing asserted during a tick is visible in that tick's outputs; a
//! go-write in tick *k* releases its register for readers in tick *k*+1.

use tracing::{debug, trace, warn};

use super::signals::{IssueGrant, IssueRequest, IssueStall, IssueTarget, TickInputs, TickOutputs};
use super::snapshot::Snapshot;
use crate::common::{ConfigError, ContextId, PendingVector, Result, ScoreboardError, UnitId};
use crate::config::Config;
use crate::issue::IssueUnitArray;
use crate::matrix::{
    Competitors, DependencyMatrix, FuFuMatrix, GlobalPendingReducer, MatrixInputs, OperandMask,
};
use crate::shadow::{
    BranchDecision, BranchSide, BranchSpeculationRecord, ShadowInputs, ShadowMatrix,
};
use crate::stats::ScoreboardStats;

/// All latched state, replaced wholesale at each tick boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreboardState {
    /// FU×Reg dependency cells.
    pub matrix: DependencyMatrix,
    /// FU×FU issue order.
    pub order: FuFuMatrix,
    /// Shadow latches.
    pub shadows: ShadowMatrix,
    /// One branch record per speculation context.
    pub records: Vec<BranchSpeculationRecord>,
    /// Per-unit busy latches.
    pub busy: PendingVector,
}

impl ScoreboardState {
    /// Idle state for `config`.
    ///
    /// # Errors
    ///
    /// Returns any error [`Config::validate`] reports.
    pub fn new(config: &Config) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let units = config.unit_count();
        let width = config.matrix.shadow_width;
        Ok(Self {
            matrix: DependencyMatrix::new(units, config.matrix.registers)?,
            order: FuFuMatrix::new(units)?,
            shadows: ShadowMatrix::new(units, width)?,
            records: vec![BranchSpeculationRecord::new(units); width],
            busy: PendingVector::zeros(units),
        })
    }

    /// True if no unit is busy and every latch is clear.
    pub fn is_quiescent(&self) -> bool {
        self.busy.none()
            && self.matrix.is_idle()
            && self.order.is_empty()
            && self.shadows.is_clear()
            && self.records.iter().all(BranchSpeculationRecord::is_empty)
    }
}

/// Latch inputs decided during evaluation, applied by commit.
#[derive(Clone, Debug)]
struct Latches {
    matrix: MatrixInputs,
    shadow: ShadowInputs,
    resolved: Vec<bool>,
    record_taken: Vec<PendingVector>,
    record_not_taken: Vec<PendingVector>,
    grant: PendingVector,
}

/// Result of the evaluate pass.
#[derive(Clone, Debug)]
pub struct Evaluation {
    /// Outputs for this tick.
    pub outputs: TickOutputs,
    /// Go signals asserted against the hazard outputs.
    pub warnings: u64,
    latches: Latches,
}

/// The scoreboard.
#[derive(Debug)]
pub struct Scoreboard {
    config: Config,
    arbiters: IssueUnitArray,
    state: ScoreboardState,
    tick: u64,
    stats: ScoreboardStats,
}

impl Scoreboard {
    /// Builds an idle scoreboard.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreboardError::Config`] if the configuration is invalid.
    pub fn new(config: &Config) -> Result<Self> {
        let state = ScoreboardState::new(config)?;
        Self::from_parts(config, state)
    }

    /// Builds a scoreboard around existing state.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DimensionMismatch`] if any component disagrees
    /// with the configuration on the unit, register or context axis.
    pub fn from_parts(config: &Config, state: ScoreboardState) -> Result<Self> {
        let arbiters = IssueUnitArray::from_config(config)?;
        let units = config.unit_count();
        let width = config.matrix.shadow_width;
        let checks = [
            ("fu-reg matrix units", units, state.matrix.units()),
            (
                "fu-reg matrix registers",
                config.matrix.registers,
                state.matrix.registers(),
            ),
            ("fu-fu matrix units", units, state.order.units()),
            ("shadow matrix units", units, state.shadows.units()),
            ("shadow matrix width", width, state.shadows.width()),
            ("branch record count", width, state.records.len()),
            ("busy vector units", units, state.busy.len()),
        ];
        for (what, expected, found) in checks {
            if expected != found {
                return Err(ConfigError::DimensionMismatch {
                    what,
                    expected,
                    found,
                }
                .into());
            }
        }
        for record in &state.records {
            let found = record.side(BranchSide::Taken).len();
            if found != units {
                return Err(ConfigError::DimensionMismatch {
                    what: "branch record units",
                    expected: units,
                    found,
                }
                .into());
            }
        }
        Ok(Self {
            config: config.clone(),
            arbiters,
            state,
            tick: 0,
            stats: ScoreboardStats::default(),
        })
    }

    /// Configuration the scoreboard was built from.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Number of function units.
    pub const fn units(&self) -> usize {
        self.state.matrix.units()
    }

    /// Number of registers.
    pub const fn registers(&self) -> usize {
        self.state.matrix.registers()
    }

    /// Number of speculation contexts.
    pub const fn shadow_width(&self) -> usize {
        self.state.shadows.width()
    }

    /// Issue arbiters.
    pub const fn arbiters(&self) -> &IssueUnitArray {
        &self.arbiters
    }

    /// Current latched state.
    pub const fn state(&self) -> &ScoreboardState {
        &self.state
    }

    /// Ticks committed so far.
    pub const fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Event counters.
    pub const fn stats(&self) -> &ScoreboardStats {
        &self.stats
    }

    /// Dump of the current latched state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state, self.tick)
    }

    /// Outputs of the current state with no inputs asserted.
    ///
    /// # Errors
    ///
    /// Propagates internal dimension errors; none occur for a scoreboard
    /// built through [`Scoreboard::new`] or [`Scoreboard::from_parts`].
    pub fn view(&self) -> Result<TickOutputs> {
        Ok(self.evaluate(&TickInputs::default())?.outputs)
    }

    /// Runs one tick: evaluate, commit, swap.
    ///
    /// # Errors
    ///
    /// Returns an out-of-range error if any index in `inputs` does not fit
    /// the configuration. The state is left untouched in that case.
    pub fn tick(&mut self, inputs: &TickInputs) -> Result<TickOutputs> {
        let eval = self.evaluate(inputs)?;
        let next = self.commit(&eval)?;
        self.stats.record(
            &eval.outputs,
            eval.latches.matrix.go_read.count_ones(),
            eval.latches.matrix.go_write.count_ones(),
            eval.warnings,
        );
        self.state = next;
        self.tick += 1;
        if self.config.general.trace_ticks || cfg!(feature = "always-trace") {
            trace!(snapshot = %self.snapshot(), "tick committed");
        }
        Ok(eval.outputs)
    }

    /// Evaluate pass: outputs and latch inputs from the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns an out-of-range error if any index in `inputs` does not fit
    /// the configuration.
    pub fn evaluate(&self, inputs: &TickInputs) -> Result<Evaluation> {
        self.validate(inputs)?;
        let units = self.units();
        let regs = self.registers();
        let width = self.shadow_width();
        let state = &self.state;

        let mut resolved = vec![false; width];
        let mut decisions = vec![BranchDecision::none(units); width];
        for res in &inputs.branch {
            let c = res.context.index();
            if resolved[c] {
                warn!(
                    context = %res.context,
                    "context resolved twice in one tick; last outcome wins"
                );
            }
            resolved[c] = true;
            decisions[c] = state.records[c].resolve(res.taken);
            debug!(
                tick = self.tick,
                context = %res.context,
                taken = res.taken,
                confirm = %decisions[c].confirm,
                cancel = %decisions[c].cancel,
                "branch resolved"
            );
        }
        let confirmed = GlobalPendingReducer::reduce(decisions.iter().map(|d| &d.confirm), units);
        let cancelled = GlobalPendingReducer::reduce(decisions.iter().map(|d| &d.cancel), units);
        let fail: Vec<PendingVector> = decisions.iter().map(|d| d.cancel.clone()).collect();

        let shadow = state.shadows.outputs(&fail)?;
        let mut go_die =
            PendingVector::from_indices(units, inputs.go_die.iter().map(|u| u.index()));
        go_die.or_assign(&shadow.go_die);
        if go_die.any() {
            debug!(tick = self.tick, units = %go_die, "cancelling");
        }

        let hazards = state
            .matrix
            .evaluate(Competitors::Ordered(&state.order), &shadow.shadown)?;
        let readable = &hazards.readable & &state.busy;
        let writable: PendingVector = (0..units)
            .map(|u| {
                let row = &hazards.rows[u];
                let no_claims =
                    !row.write_pending() && !row.read_pending() && shadow.shadown.get(u);
                state.busy.get(u) && (hazards.writable.get(u) || no_claims)
            })
            .collect();

        let go_read = PendingVector::from_indices(units, inputs.go_read.iter().map(|u| u.index()));
        let go_write =
            PendingVector::from_indices(units, inputs.go_write.iter().map(|u| u.index()));
        let mut warnings = 0;
        for u in go_read.iter_ones() {
            if !readable.get(u) {
                warn!(
                    tick = self.tick,
                    unit = %UnitId(u),
                    "go-read on a unit that is not readable"
                );
                warnings += 1;
            }
        }
        for u in go_write.iter_ones() {
            if !writable.get(u) {
                warn!(
                    tick = self.tick,
                    unit = %UnitId(u),
                    "go-write on a unit that is not writable"
                );
                warnings += 1;
            }
        }

        let grant = inputs.issue.as_ref().map_or_else(IssueGrant::default, |req| {
            self.arbitrate(req, &hazards.global_write_pending)
        });

        let mut matrix_inputs = MatrixInputs::idle(units, regs);
        let mut shadow_inputs = ShadowInputs::idle(units, width);
        let mut record_taken = vec![PendingVector::zeros(units); width];
        let mut record_not_taken = vec![PendingVector::zeros(units); width];
        let mut granted = PendingVector::zeros(units);
        if let (Some(unit), Some(req)) = (grant.unit, inputs.issue.as_ref()) {
            let u = unit.index();
            granted.set(u, true);
            let mask = OperandMask::new(
                regs,
                req.dest.iter().map(|r| r.index()),
                req.src.iter().map(|r| r.index()),
            );
            matrix_inputs = matrix_inputs.issue(u, mask);
            let contexts = PendingVector::from_indices(
                width,
                req.shadows.iter().map(|t| t.context.index()),
            );
            shadow_inputs = shadow_inputs.issue(u, contexts);
            for tag in &req.shadows {
                let c = tag.context.index();
                match tag.side {
                    BranchSide::Taken => record_taken[c].set(u, true),
                    BranchSide::NotTaken => record_not_taken[c].set(u, true),
                }
            }
        }
        matrix_inputs.go_read = go_read;
        matrix_inputs.go_write = go_write;
        matrix_inputs.go_die = go_die.clone();
        for (c, d) in decisions.into_iter().enumerate() {
            shadow_inputs = shadow_inputs.resolve(c, d.confirm, d.cancel);
        }
        shadow_inputs = shadow_inputs.die(go_die.clone());

        let outputs = TickOutputs {
            tick: self.tick,
            readable,
            writable,
            busy: state.busy.clone(),
            shadown: shadow.shadown,
            go_die,
            col_read_pending: hazards.col_read_pending,
            col_write_pending: hazards.col_write_pending,
            grant,
            class_busy: self.arbiters.class_busy(&state.busy),
            confirmed,
            cancelled,
        };
        Ok(Evaluation {
            outputs,
            warnings,
            latches: Latches {
                matrix: matrix_inputs,
                shadow: shadow_inputs,
                resolved,
                record_taken,
                record_not_taken,
                grant: granted,
            },
        })
    }

    /// Commit pass: next state from the current snapshot and `eval`.
    ///
    /// # Errors
    ///
    /// Propagates internal dimension errors; none occur for an evaluation
    /// produced by this scoreboard.
    pub fn commit(&self, eval: &Evaluation) -> Result<ScoreboardState> {
        let state = &self.state;
        let l = &eval.latches;
        let rows = state.matrix.row_pending();
        let die = &l.matrix.go_die;

        let mut busy = &state.busy | &l.grant;
        busy.clear_bits(&l.matrix.go_write);
        busy.clear_bits(die);

        let records = state
            .records
            .iter()
            .enumerate()
            .map(|(c, r)| r.next(l.resolved[c], &l.record_taken[c], &l.record_not_taken[c], die))
            .collect();

        Ok(ScoreboardState {
            matrix: state.matrix.commit(&l.matrix)?,
            order: state.order.commit(&rows, &l.matrix)?,
            shadows: state.shadows.commit(&l.shadow)?,
            records,
            busy,
        })
    }

    fn arbitrate(&self, req: &IssueRequest, global_write_pending: &PendingVector) -> IssueGrant {
        let dest =
            PendingVector::from_indices(self.registers(), req.dest.iter().map(|r| r.index()));
        let busy = &self.state.busy;
        let decision = if dest.intersects(global_write_pending) {
            Err(IssueStall::WriteAfterWrite)
        } else {
            match req.target {
                IssueTarget::Unit(unit) if busy.get(unit.index()) => Err(IssueStall::UnitBusy),
                IssueTarget::Unit(unit) => Ok(unit),
                IssueTarget::Class(class) => self
                    .arbiters
                    .class(class)
                    .and_then(|a| a.arbitrate(busy, true).unit)
                    .ok_or(IssueStall::ClassBusy),
            }
        };
        match decision {
            Ok(unit) => {
                debug!(tick = self.tick, %unit, target = ?req.target, "issued");
                IssueGrant {
                    unit: Some(unit),
                    stall: None,
                }
            }
            Err(stall) => {
                debug!(tick = self.tick, %stall, target = ?req.target, "issue stalled");
                IssueGrant {
                    unit: None,
                    stall: Some(stall),
                }
            }
        }
    }

    fn validate(&self, inputs: &TickInputs) -> Result<()> {
        let units = self.units();
        let regs = self.registers();
        let width = self.shadow_width();
        let unit_ok = |unit: UnitId| {
            if unit.index() < units {
                Ok(())
            } else {
                Err(ScoreboardError::UnitOutOfRange { unit, units })
            }
        };
        let context_ok = |context: ContextId| {
            if context.index() < width {
                Ok(())
            } else {
                Err(ScoreboardError::ContextOutOfRange { context, width })
            }
        };
        for &unit in inputs.go_read.iter().chain(&inputs.go_write).chain(&inputs.go_die) {
            unit_ok(unit)?;
        }
        for res in &inputs.branch {
            context_ok(res.context)?;
        }
        if let Some(req) = &inputs.issue {
            match req.target {
                IssueTarget::Unit(unit) => unit_ok(unit)?,
                IssueTarget::Class(class) => {
                    if self.arbiters.class(class).is_none() {
                        return Err(ScoreboardError::ClassOutOfRange {
                            class,
                            classes: self.arbiters.len(),
                        });
                    }
                }
            }
            if let Some(&reg) = req.dest.iter().chain(&req.src).find(|r| r.index() >= regs) {
                return Err(ScoreboardError::RegisterOutOfRange {
                    reg,
                    registers: regs,
                });
            }
            for tag in &req.shadows {
                context_ok(tag.context)?;
            }
        }
        Ok(())
    }
}
