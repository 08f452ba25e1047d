//! Per-tick port signals.
//!
//! These are the scoreboard's external interface. Each tick the caller
//! supplies a [`TickInputs`] (an optional issue request, go signals from the
//! function units and branch resolutions) and receives a [`TickOutputs`]
//! computed from the state committed at the previous tick boundary.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::{ClassId, ContextId, PendingVector, RegId, UnitId};
use crate::shadow::{BranchResolution, BranchSide};

/// Where an issue request should go.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueTarget {
    /// A specific unit.
    Unit(UnitId),
    /// Any free unit of a class.
    Class(ClassId),
}

/// Speculation context an operation is issued under, and on which side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShadowTag {
    /// Context.
    pub context: ContextId,
    /// Branch side the operation belongs to.
    pub side: BranchSide,
}

/// A request to issue one operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRequest {
    /// Unit or class to issue to.
    pub target: IssueTarget,
    /// Destination registers.
    #[serde(default)]
    pub dest: Vec<RegId>,
    /// Source registers.
    #[serde(default)]
    pub src: Vec<RegId>,
    /// Contexts the operation is speculative in.
    #[serde(default)]
    pub shadows: Vec<ShadowTag>,
}

impl IssueRequest {
    /// A request for any free unit of `class`.
    pub const fn to_class(class: ClassId) -> Self {
        Self {
            target: IssueTarget::Class(class),
            dest: Vec::new(),
            src: Vec::new(),
            shadows: Vec::new(),
        }
    }

    /// A request for `unit` specifically.
    pub const fn to_unit(unit: UnitId) -> Self {
        Self {
            target: IssueTarget::Unit(unit),
            dest: Vec::new(),
            src: Vec::new(),
            shadows: Vec::new(),
        }
    }

    /// Adds destination registers.
    #[must_use]
    pub fn dest<I: IntoIterator<Item = usize>>(mut self, regs: I) -> Self {
        self.dest.extend(regs.into_iter().map(RegId));
        self
    }

    /// Adds source registers.
    #[must_use]
    pub fn src<I: IntoIterator<Item = usize>>(mut self, regs: I) -> Self {
        self.src.extend(regs.into_iter().map(RegId));
        self
    }

    /// Marks the operation speculative in `context`, on `side`.
    #[must_use]
    pub fn shadow(mut self, context: usize, side: BranchSide) -> Self {
        self.shadows.push(ShadowTag {
            context: ContextId(context),
            side,
        });
        self
    }
}

/// Inputs for one tick.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInputs {
    /// Operation to issue, if any.
    #[serde(default)]
    pub issue: Option<IssueRequest>,
    /// Units that fetched their operands.
    #[serde(default)]
    pub go_read: Vec<UnitId>,
    /// Units that wrote their results.
    #[serde(default)]
    pub go_write: Vec<UnitId>,
    /// Units cancelled externally (exceptions).
    #[serde(default)]
    pub go_die: Vec<UnitId>,
    /// Branch outcomes.
    #[serde(default)]
    pub branch: Vec<BranchResolution>,
}

impl TickInputs {
    /// Sets the issue request.
    #[must_use]
    pub fn with_issue(mut self, request: IssueRequest) -> Self {
        self.issue = Some(request);
        self
    }

    /// Adds a go-read.
    #[must_use]
    pub fn with_go_read(mut self, unit: usize) -> Self {
        self.go_read.push(UnitId(unit));
        self
    }

    /// Adds a go-write.
    #[must_use]
    pub fn with_go_write(mut self, unit: usize) -> Self {
        self.go_write.push(UnitId(unit));
        self
    }

    /// Adds an external go-die.
    #[must_use]
    pub fn with_go_die(mut self, unit: usize) -> Self {
        self.go_die.push(UnitId(unit));
        self
    }

    /// Adds a branch resolution.
    #[must_use]
    pub fn with_branch(mut self, context: usize, taken: bool) -> Self {
        self.branch.push(BranchResolution {
            context: ContextId(context),
            taken,
        });
        self
    }

    /// True if nothing is asserted.
    pub fn is_idle(&self) -> bool {
        self.issue.is_none()
            && self.go_read.is_empty()
            && self.go_write.is_empty()
            && self.go_die.is_empty()
            && self.branch.is_empty()
    }
}

/// Reason an issue request was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStall {
    /// A destination register already has a pending writer.
    WriteAfterWrite,
    /// Every unit of the requested class is busy.
    ClassBusy,
    /// The requested unit is busy.
    UnitBusy,
}

impl fmt::Display for IssueStall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::WriteAfterWrite => "write-after-write",
            Self::ClassBusy => "class busy",
            Self::UnitBusy => "unit busy",
        })
    }
}

/// Outcome of this tick's issue request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IssueGrant {
    /// Unit the operation was issued to.
    pub unit: Option<UnitId>,
    /// Why the request was refused.
    pub stall: Option<IssueStall>,
}

impl IssueGrant {
    /// True if the operation was accepted.
    pub const fn issued(&self) -> bool {
        self.unit.is_some()
    }
}

/// Outputs of one tick.
///
/// Every vector is computed from the state committed at the previous tick
/// boundary together with this tick's inputs; none of the inputs' latched
/// effects are visible until the next tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TickOutputs {
    /// Tick the outputs belong to.
    pub tick: u64,
    /// Per-unit: busy and free of RAW hazards on its sources.
    pub readable: PendingVector,
    /// Per-unit: busy and allowed to complete.
    pub writable: PendingVector,
    /// Per-unit busy latch.
    pub busy: PendingVector,
    /// Per-unit: not covered by any speculation context.
    pub shadown: PendingVector,
    /// Per-unit: cancelled this tick (external or shadow).
    pub go_die: PendingVector,
    /// Per-register: some unit still has to read it.
    pub col_read_pending: PendingVector,
    /// Per-register: some unit still has to write it.
    pub col_write_pending: PendingVector,
    /// Result of the issue request.
    pub grant: IssueGrant,
    /// Per-class: every unit busy.
    pub class_busy: PendingVector,
    /// Units confirmed by a branch resolution this tick.
    pub confirmed: PendingVector,
    /// Units cancelled by a branch resolution this tick.
    pub cancelled: PendingVector,
}
