//! Branch speculation records.
//!
//! One record exists per speculation context. At issue time each
//! speculative unit is recorded on the side of the branch it belongs to.
//! When the branch resolves, every recorded unit is confirmed or cancelled in
//! the same tick and the record starts over.

use serde::{Deserialize, Serialize};

use crate::common::{ContextId, PendingVector};

/// Side of a branch an operation was issued on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchSide {
    /// Valid if the branch is taken.
    Taken,
    /// Valid if the branch is not taken.
    NotTaken,
}

impl BranchSide {
    /// Side matching an outcome.
    pub const fn of(taken: bool) -> Self {
        if taken { Self::Taken } else { Self::NotTaken }
    }
}

/// A branch outcome for one context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BranchResolution {
    /// Context being resolved.
    pub context: ContextId,
    /// Actual outcome.
    pub taken: bool,
}

/// Per-unit decisions of one resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BranchDecision {
    /// Units whose results may now be written.
    pub confirm: PendingVector,
    /// Units whose operations must vanish.
    pub cancel: PendingVector,
}

impl BranchDecision {
    /// No unit affected.
    pub fn none(n_units: usize) -> Self {
        Self {
            confirm: PendingVector::zeros(n_units),
            cancel: PendingVector::zeros(n_units),
        }
    }
}

/// Which units sit on which side of one context's branch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BranchSpeculationRecord {
    taken: PendingVector,
    not_taken: PendingVector,
}

impl BranchSpeculationRecord {
    /// An empty record over `n_units` units.
    pub fn new(n_units: usize) -> Self {
        Self {
            taken: PendingVector::zeros(n_units),
            not_taken: PendingVector::zeros(n_units),
        }
    }

    /// Units recorded on `side`.
    pub const fn side(&self, side: BranchSide) -> &PendingVector {
        match side {
            BranchSide::Taken => &self.taken,
            BranchSide::NotTaken => &self.not_taken,
        }
    }

    /// True if no unit is recorded.
    pub fn is_empty(&self) -> bool {
        self.taken.none() && self.not_taken.none()
    }

    /// Decisions for an outcome.
    ///
    /// A unit recorded on both sides is cancelled. A unit on neither side is
    /// unaffected.
    pub fn resolve(&self, taken: bool) -> BranchDecision {
        let (matching, opposite) = if taken {
            (&self.taken, &self.not_taken)
        } else {
            (&self.not_taken, &self.taken)
        };
        let mut confirm = matching.clone();
        confirm.clear_bits(opposite);
        let decision = BranchDecision {
            confirm,
            cancel: opposite.clone(),
        };
        debug_assert!(
            !decision.confirm.intersects(&decision.cancel),
            "unit both confirmed and cancelled"
        );
        decision
    }

    /// Next-state function.
    ///
    /// `taken` and `not_taken` are the units newly recorded this tick. On a
    /// resolution the old record is discarded and only new entries survive;
    /// units in `die` are dropped in every case.
    #[must_use]
    pub fn next(
        &self,
        resolved: bool,
        taken: &PendingVector,
        not_taken: &PendingVector,
        die: &PendingVector,
    ) -> Self {
        let carry = |old: &PendingVector, new: &PendingVector| {
            let mut v = if resolved { new.clone() } else { old | new };
            v.clear_bits(die);
            v
        };
        Self {
            taken: carry(&self.taken, taken),
            not_taken: carry(&self.not_taken, not_taken),
        }
    }
}
