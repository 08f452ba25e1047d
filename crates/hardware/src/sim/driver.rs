//! Driver: owns a scoreboard and a simple function-unit model side by side.
//!
//! The driver feeds an in-order instruction queue into a [`Scoreboard`] and
//! plays the part of the function units. Each unit moves through
//! Read → Execute(latency) → Write; the driver raises read and write
//! requests, picks go signals with the [`GroupPicker`] from the scoreboard's
//! readable/writable outputs, applies scheduled branch outcomes and reports
//! what happened as [`DriverEvent`]s.
//!
//! A watchdog turns a scheduler that stops making progress into
//! [`SimError::Stalled`] instead of an endless loop.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::{ClassId, ContextId, PendingVector, RegId, SimError, UnitId};
use crate::config::Config;
use crate::issue::GroupPicker;
use crate::sched::{IssueRequest, IssueTarget, Scoreboard, ShadowTag, TickInputs};
use crate::shadow::BranchResolution;

/// One queued operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    /// Unit class that executes it.
    pub class: ClassId,
    /// Destination registers.
    #[serde(default)]
    pub dest: Vec<RegId>,
    /// Source registers.
    #[serde(default)]
    pub src: Vec<RegId>,
    /// Execute latency; defaults to the class latency.
    #[serde(default)]
    pub latency: Option<u64>,
    /// Speculation contexts it is issued under.
    #[serde(default)]
    pub shadows: Vec<ShadowTag>,
}

impl Instruction {
    /// An operation for `class` with the given operands.
    pub fn new<D, S>(class: usize, dest: D, src: S) -> Self
    where
        D: IntoIterator<Item = usize>,
        S: IntoIterator<Item = usize>,
    {
        Self {
            class: ClassId(class),
            dest: dest.into_iter().map(RegId).collect(),
            src: src.into_iter().map(RegId).collect(),
            latency: None,
            shadows: Vec::new(),
        }
    }

    /// Overrides the execute latency.
    #[must_use]
    pub const fn with_latency(mut self, latency: u64) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Issues the operation under `tag`.
    #[must_use]
    pub fn with_shadow(mut self, tag: ShadowTag) -> Self {
        self.shadows.push(tag);
        self
    }

    fn request(&self) -> IssueRequest {
        IssueRequest {
            target: IssueTarget::Class(self.class),
            dest: self.dest.clone(),
            src: self.src.clone(),
            shadows: self.shadows.clone(),
        }
    }
}

/// Something the driver observed in one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DriverEvent {
    /// Instruction `index` was issued to `unit`.
    Issued {
        /// Tick.
        tick: u64,
        /// Unit.
        unit: UnitId,
        /// Program index.
        index: usize,
    },
    /// `unit` fetched the operands of instruction `index`.
    Read {
        /// Tick.
        tick: u64,
        /// Unit.
        unit: UnitId,
        /// Program index.
        index: usize,
    },
    /// `unit` wrote the result of instruction `index`.
    Wrote {
        /// Tick.
        tick: u64,
        /// Unit.
        unit: UnitId,
        /// Program index.
        index: usize,
    },
    /// Instruction `index` on `unit` was cancelled.
    Cancelled {
        /// Tick.
        tick: u64,
        /// Unit.
        unit: UnitId,
        /// Program index.
        index: usize,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Read,
    Execute(u64),
    Write,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Slot {
    index: usize,
    phase: Phase,
}

/// Top-level driver: scoreboard plus unit model.
#[derive(Debug)]
pub struct Driver {
    scoreboard: Scoreboard,
    program: Vec<Instruction>,
    queue: VecDeque<usize>,
    slots: Vec<Option<Slot>>,
    branches: BTreeMap<u64, Vec<BranchResolution>>,
    idle_ticks: u64,
}

impl Driver {
    /// Creates a driver over `program`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Scoreboard`] if the configuration is invalid.
    pub fn new(config: &Config, program: Vec<Instruction>) -> Result<Self, SimError> {
        let scoreboard = Scoreboard::new(config)?;
        let units = scoreboard.units();
        Ok(Self {
            scoreboard,
            queue: (0..program.len()).collect(),
            program,
            slots: vec![None; units],
            branches: BTreeMap::new(),
            idle_ticks: 0,
        })
    }

    /// Schedules a branch outcome for `context` at tick `at`.
    pub fn schedule_branch(&mut self, at: u64, context: usize, taken: bool) {
        self.branches.entry(at).or_default().push(BranchResolution {
            context: ContextId(context),
            taken,
        });
    }

    /// The driven scoreboard.
    pub const fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    /// The program being run.
    pub fn program(&self) -> &[Instruction] {
        &self.program
    }

    /// True once every instruction has been written or cancelled.
    pub fn is_done(&self) -> bool {
        self.queue.is_empty() && self.slots.iter().all(Option::is_none)
    }

    /// Runs one tick.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Stalled`] when the watchdog fires and propagates
    /// scoreboard input errors.
    pub fn step(&mut self) -> Result<Vec<DriverEvent>, SimError> {
        let tick = self.scoreboard.tick_count();
        let units = self.scoreboard.units();
        let view = self.scoreboard.view()?;

        let in_phase = |want: Phase| -> PendingVector {
            self.slots
                .iter()
                .map(|s| s.is_some_and(|s| s.phase == want))
                .collect()
        };
        let go = GroupPicker::pick(
            &view.readable,
            &in_phase(Phase::Read),
            &view.writable,
            &in_phase(Phase::Write),
        );

        let mut inputs = TickInputs {
            issue: self.queue.front().map(|&i| self.program[i].request()),
            go_read: go.go_read.iter_ones().map(UnitId).collect(),
            go_write: go.go_write.iter_ones().map(UnitId).collect(),
            ..TickInputs::default()
        };
        if let Some(branches) = self.branches.remove(&tick) {
            inputs.branch = branches;
        }
        let out = self.scoreboard.tick(&inputs)?;

        let mut events = Vec::new();
        let mut progressed = false;
        for u in 0..units {
            let Some(slot) = self.slots[u] else { continue };
            let unit = UnitId(u);
            let index = slot.index;
            if out.go_die.get(u) {
                self.slots[u] = None;
                events.push(DriverEvent::Cancelled { tick, unit, index });
                continue;
            }
            self.slots[u] = match slot.phase {
                Phase::Read if go.go_read.get(u) => {
                    events.push(DriverEvent::Read { tick, unit, index });
                    let latency = self.latency(index, u);
                    Some(Slot {
                        index,
                        phase: if latency == 0 {
                            Phase::Write
                        } else {
                            Phase::Execute(latency)
                        },
                    })
                }
                Phase::Write if go.go_write.get(u) => {
                    events.push(DriverEvent::Wrote { tick, unit, index });
                    None
                }
                Phase::Execute(remaining) => {
                    progressed = true;
                    Some(Slot {
                        index,
                        phase: if remaining <= 1 {
                            Phase::Write
                        } else {
                            Phase::Execute(remaining - 1)
                        },
                    })
                }
                _ => Some(slot),
            };
        }
        if let Some(unit) = out.grant.unit
            && let Some(index) = self.queue.pop_front()
        {
            self.slots[unit.index()] = Some(Slot {
                index,
                phase: Phase::Read,
            });
            events.push(DriverEvent::Issued { tick, unit, index });
        }

        if events.is_empty() && !progressed && !self.is_done() {
            self.idle_ticks += 1;
            if self.idle_ticks >= self.scoreboard.config().general.stall_limit {
                debug!(tick, idle_ticks = self.idle_ticks, "driver stalled");
                return Err(SimError::Stalled {
                    tick,
                    idle_ticks: self.idle_ticks,
                });
            }
        } else {
            self.idle_ticks = 0;
        }
        Ok(events)
    }

    /// Runs until every instruction has been written or cancelled.
    ///
    /// # Errors
    ///
    /// Returns the first error [`Driver::step`] reports.
    pub fn run(&mut self) -> Result<Vec<DriverEvent>, SimError> {
        let mut events = Vec::new();
        while !self.is_done() {
            events.extend(self.step()?);
        }
        Ok(events)
    }

    fn latency(&self, index: usize, unit: usize) -> u64 {
        self.program[index]
            .latency
            .or_else(|| self.scoreboard.config().unit_latency(unit))
            .unwrap_or(1)
    }
}
