//! A single shadow latch.
//!
//! One `ShadowUnit` exists per (function unit, speculation context). It is
//! set when the unit is issued with the context enabled and cleared when the
//! context resolves. A failing resolution asserts `go_die` for the tick in
//! which it arrives.

use serde::{Deserialize, Serialize};

/// Observable state of a shadow latch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShadowState {
    /// No speculation covers the unit in this context.
    Clear,
    /// Awaiting resolution.
    Shadowed,
}

/// Per-tick inputs of one latch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShadowUnitInputs {
    /// The owning unit is being issued.
    pub issue: bool,
    /// The issued operation is speculative in this context.
    pub enable: bool,
    /// The context resolved in the unit's favour.
    pub good: bool,
    /// The context resolved against the unit.
    pub fail: bool,
    /// The unit's operation is being cancelled.
    pub die: bool,
}

/// One shadow latch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShadowUnit {
    /// Set while the unit awaits this context's resolution.
    pub active: bool,
}

impl ShadowUnit {
    /// Current state.
    pub fn state(self) -> ShadowState {
        if self.active {
            ShadowState::Shadowed
        } else {
            ShadowState::Clear
        }
    }

    /// Cancel request produced this tick.
    pub const fn go_die(self, fail: bool) -> bool {
        self.active && fail
    }

    /// Next-state function.
    ///
    /// Resolution only clears a latch that was already set; an issue in the
    /// resolving tick starts a fresh shadow. A die always clears.
    #[must_use]
    pub const fn next(self, i: ShadowUnitInputs) -> Self {
        let held = self.active && !i.good && !i.fail;
        Self {
            active: !i.die && (held || (i.issue && i.enable)),
        }
    }
}
