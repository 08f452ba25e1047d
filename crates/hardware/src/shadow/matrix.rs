//! Units × contexts shadow matrix.
//!
//! The matrix holds one [`ShadowUnit`] per (function unit, speculation
//! context), stored flat with the context axis innermost. It produces two
//! per-unit outputs from the current latches and this tick's resolutions:
//! - `shadown`: no context covers the unit (gates the unit's write);
//! - `go_die`: some covering context failed (forces the unit's rows clear).
//!
//! A width of zero disables shadowing: `shadown` is constantly set and
//! `go_die` constantly clear.

use super::unit::{ShadowState, ShadowUnit, ShadowUnitInputs};
use crate::common::{ConfigError, PendingVector};
use crate::config::cell_count;

/// Per-tick shadow outputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShadowOutputs {
    /// Per-unit: not covered by any context.
    pub shadown: PendingVector,
    /// Per-unit: cancelled by a failing context.
    pub go_die: PendingVector,
}

/// Latched inputs applied at a tick boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShadowInputs {
    /// Units being issued.
    pub issue: PendingVector,
    /// Per unit, the contexts its issued operation is speculative in.
    pub enable: Vec<PendingVector>,
    /// Per context, the units confirmed this tick.
    pub good: Vec<PendingVector>,
    /// Per context, the units cancelled this tick.
    pub fail: Vec<PendingVector>,
    /// Units being cancelled for any reason.
    pub die: PendingVector,
}

impl ShadowInputs {
    /// Inputs with nothing asserted.
    pub fn idle(n_units: usize, width: usize) -> Self {
        Self {
            issue: PendingVector::zeros(n_units),
            enable: vec![PendingVector::zeros(width); n_units],
            good: vec![PendingVector::zeros(n_units); width],
            fail: vec![PendingVector::zeros(n_units); width],
            die: PendingVector::zeros(n_units),
        }
    }

    /// Issues `unit` under the contexts set in `contexts`.
    #[must_use]
    pub fn issue(mut self, unit: usize, contexts: PendingVector) -> Self {
        self.issue.set(unit, true);
        self.enable[unit] = contexts;
        self
    }

    /// Applies a resolution of `context`.
    #[must_use]
    pub fn resolve(mut self, context: usize, good: PendingVector, fail: PendingVector) -> Self {
        self.good[context] = good;
        self.fail[context] = fail;
        self
    }

    /// Cancels every unit in `die`.
    #[must_use]
    pub fn die(mut self, die: PendingVector) -> Self {
        self.die = die;
        self
    }
}

/// The shadow matrix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShadowMatrix {
    n_units: usize,
    width: usize,
    latches: Vec<ShadowUnit>,
}

impl ShadowMatrix {
    /// Creates a matrix with every latch clear.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoUnits`] if `n_units` is zero and
    /// [`ConfigError::TooLarge`] if the latch count overflows.
    pub fn new(n_units: usize, width: usize) -> Result<Self, ConfigError> {
        if n_units == 0 {
            return Err(ConfigError::NoUnits);
        }
        let latches = cell_count("shadow matrix", n_units, width)?;
        Ok(Self {
            n_units,
            width,
            latches: vec![ShadowUnit::default(); latches],
        })
    }

    /// Number of units.
    pub const fn units(&self) -> usize {
        self.n_units
    }

    /// Number of contexts.
    pub const fn width(&self) -> usize {
        self.width
    }

    /// State of one latch.
    pub fn state(&self, unit: usize, context: usize) -> ShadowState {
        self.latch(unit, context).state()
    }

    /// Contexts currently covering `unit`.
    pub fn contexts_of(&self, unit: usize) -> PendingVector {
        (0..self.width).map(|c| self.latch(unit, c).active).collect()
    }

    /// Units currently covered by `context`.
    pub fn units_in(&self, context: usize) -> PendingVector {
        (0..self.n_units)
            .map(|u| self.latch(u, context).active)
            .collect()
    }

    /// True if no latch is set.
    pub fn is_clear(&self) -> bool {
        self.latches.iter().all(|l| !l.active)
    }

    /// Outputs for this tick, given each context's failing units.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DimensionMismatch`] if `fail` does not have one
    /// unit vector per context.
    pub fn outputs(&self, fail: &[PendingVector]) -> Result<ShadowOutputs, ConfigError> {
        self.check_contexts("fail vectors", fail)?;
        let shadown = (0..self.n_units)
            .map(|u| (0..self.width).all(|c| !self.latch(u, c).active))
            .collect();
        let go_die = (0..self.n_units)
            .map(|u| (0..self.width).any(|c| self.latch(u, c).go_die(fail[c].get(u))))
            .collect();
        Ok(ShadowOutputs { shadown, go_die })
    }

    /// Next-state function.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DimensionMismatch`] if `inputs` was built for
    /// different dimensions.
    pub fn commit(&self, inputs: &ShadowInputs) -> Result<Self, ConfigError> {
        self.check_contexts("good vectors", &inputs.good)?;
        self.check_contexts("fail vectors", &inputs.fail)?;
        for (what, found) in [
            ("issue vector units", inputs.issue.len()),
            ("enable masks", inputs.enable.len()),
            ("die vector units", inputs.die.len()),
        ] {
            if found != self.n_units {
                return Err(ConfigError::DimensionMismatch {
                    what,
                    expected: self.n_units,
                    found,
                });
            }
        }
        let mut latches = Vec::with_capacity(self.latches.len());
        for u in 0..self.n_units {
            for c in 0..self.width {
                latches.push(self.latch(u, c).next(ShadowUnitInputs {
                    issue: inputs.issue.get(u),
                    enable: inputs.enable[u].get(c),
                    good: inputs.good[c].get(u),
                    fail: inputs.fail[c].get(u),
                    die: inputs.die.get(u),
                }));
            }
        }
        Ok(Self {
            n_units: self.n_units,
            width: self.width,
            latches,
        })
    }

    fn latch(&self, unit: usize, context: usize) -> ShadowUnit {
        self.latches[unit * self.width + context]
    }

    fn check_contexts(&self, what: &'static str, v: &[PendingVector]) -> Result<(), ConfigError> {
        if v.len() != self.width {
            return Err(ConfigError::DimensionMismatch {
                what,
                expected: self.width,
                found: v.len(),
            });
        }
        match v.iter().find(|p| p.len() != self.n_units) {
            Some(p) => Err(ConfigError::DimensionMismatch {
                what,
                expected: self.n_units,
                found: p.len(),
            }),
            None => Ok(()),
        }
    }
}
