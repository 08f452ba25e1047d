//! Issue arbitration.
//!
//! Function units are grouped into classes of interchangeable units, each
//! occupying a contiguous range of unit ids. An [`IssueArbiter`] per class
//! grants at most one free unit per tick by fixed priority (lowest id wins)
//! and reports when the whole class is busy so the issuing stage can retry.

use std::ops::Range;

use crate::common::{ClassId, ConfigError, PendingVector, UnitId};
use crate::config::Config;

/// Fixed-priority one-hot selector.
#[derive(Clone, Copy, Debug, Default)]
pub struct PriorityPicker;

impl PriorityPicker {
    /// Keeps only the lowest set bit of `candidates`.
    pub fn pick(candidates: &PendingVector) -> PendingVector {
        let out = candidates.first_one().map_or_else(
            || PendingVector::zeros(candidates.len()),
            |i| PendingVector::single(candidates.len(), i),
        );
        debug_assert!(out.count_ones() <= 1, "priority picker granted more than one");
        out
    }
}

/// Outcome of arbitrating one class for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClassGrant {
    /// The granted unit, if any.
    pub unit: Option<UnitId>,
    /// Every unit of the class is busy.
    pub all_busy: bool,
}

/// Arbiter for one class of units.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssueArbiter {
    name: String,
    units: Range<usize>,
}

impl IssueArbiter {
    /// Creates an arbiter over `units`.
    pub fn new(name: impl Into<String>, units: Range<usize>) -> Self {
        Self {
            name: name.into(),
            units,
        }
    }

    /// Class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit ids owned by the class.
    pub fn units(&self) -> Range<usize> {
        self.units.clone()
    }

    /// True if `unit` belongs to the class.
    pub fn contains(&self, unit: UnitId) -> bool {
        self.units.contains(&unit.index())
    }

    /// Grants the lowest-numbered free unit when `want` is asserted.
    pub fn arbitrate(&self, busy: &PendingVector, want: bool) -> ClassGrant {
        let free: PendingVector = self.units.clone().map(|u| !busy.get(u)).collect();
        let all_busy = free.none();
        let mut requested = free;
        if !want {
            requested.clear();
        }
        let grant = PriorityPicker::pick(&requested);
        ClassGrant {
            unit: grant.first_one().map(|i| UnitId(self.units.start + i)),
            all_busy,
        }
    }
}

/// Arbiters for every configured class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssueUnitArray {
    arbiters: Vec<IssueArbiter>,
    n_units: usize,
}

impl IssueUnitArray {
    /// Builds one arbiter per configured class.
    ///
    /// # Errors
    ///
    /// Returns any error [`Config::validate`] reports.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut start = 0;
        let arbiters = config
            .units
            .iter()
            .map(|class| {
                let arbiter = IssueArbiter::new(class.name.clone(), start..start + class.count);
                start += class.count;
                arbiter
            })
            .collect();
        Ok(Self {
            arbiters,
            n_units: start,
        })
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.arbiters.len()
    }

    /// True if there are no classes.
    pub fn is_empty(&self) -> bool {
        self.arbiters.is_empty()
    }

    /// Total units across classes.
    pub const fn units(&self) -> usize {
        self.n_units
    }

    /// The arbiter of `class`.
    pub fn class(&self, class: ClassId) -> Option<&IssueArbiter> {
        self.arbiters.get(class.index())
    }

    /// The class owning `unit`.
    pub fn class_of(&self, unit: UnitId) -> Option<ClassId> {
        self.arbiters
            .iter()
            .position(|a| a.contains(unit))
            .map(ClassId)
    }

    /// Per-class "every unit busy" vector.
    pub fn class_busy(&self, busy: &PendingVector) -> PendingVector {
        self.arbiters
            .iter()
            .map(|a| a.arbitrate(busy, false).all_busy)
            .collect()
    }

    /// Iterates over the arbiters in class order.
    pub fn iter(&self) -> impl Iterator<Item = &IssueArbiter> + '_ {
        self.arbiters.iter()
    }
}
