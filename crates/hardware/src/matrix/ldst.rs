//! Load/store memory-dependence matrix.
//!
//! Register cells cannot see memory hazards: a load and a store with no
//! register in common may still touch the same address. This matrix orders
//! memory operations among themselves. Cell (x, y) is set when x issues and
//! finds y with the opposite kind of access outstanding:
//! - `load_holds_store`: x is a store and y an earlier load (WAR on memory);
//! - `store_holds_load`: x is a load and y an earlier store (RAW on memory).
//!
//! A set cell only holds x back while the two addresses also match. Matching
//! is partial ([`PartialAddrMatch`] compares a window of address bits), so
//! distinct addresses may be reported as a clash; that only serialises them.
//!
//! Like the FU×FU matrix, cells are filled from the *current* pending
//! vectors, so operations issued in the same tick never hold each other.
//! Reset dominates: completion or die of either unit clears the cell.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::common::{ConfigError, PendingVector, ScoreboardError, UnitId};
use crate::config::cell_count;

/// Kind of memory access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemOp {
    /// Reads memory.
    Load,
    /// Writes memory.
    Store,
}

/// One (x, y) memory-ordering cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LdStCell {
    /// Store x waits for load y.
    pub load_holds_store: bool,
    /// Load x waits for store y.
    pub store_holds_load: bool,
}

/// Per-tick inputs of the matrix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LdStInputs {
    /// Units issued a load this tick.
    pub issue_load: PendingVector,
    /// Units issued a store this tick.
    pub issue_store: PendingVector,
    /// Units whose memory access completed this tick.
    pub done: PendingVector,
    /// Cancelled units.
    pub go_die: PendingVector,
}

impl LdStInputs {
    /// No signal asserted.
    pub fn idle(n_units: usize) -> Self {
        Self {
            issue_load: PendingVector::zeros(n_units),
            issue_store: PendingVector::zeros(n_units),
            done: PendingVector::zeros(n_units),
            go_die: PendingVector::zeros(n_units),
        }
    }

    /// Issues `op` to `unit`.
    #[must_use]
    pub fn issue(mut self, unit: usize, op: MemOp) -> Self {
        match op {
            MemOp::Load => self.issue_load.set(unit, true),
            MemOp::Store => self.issue_store.set(unit, true),
        }
        self
    }

    /// Completes `unit`'s access.
    #[must_use]
    pub fn done(mut self, unit: usize) -> Self {
        self.done.set(unit, true);
        self
    }

    /// Cancels `unit`.
    #[must_use]
    pub fn go_die(mut self, unit: usize) -> Self {
        self.go_die.set(unit, true);
        self
    }
}

/// Combinational outputs for one tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LdStOutputs {
    /// Loads held back by an earlier store to a matching address.
    pub load_held: PendingVector,
    /// Stores held back by an earlier load to a matching address.
    pub store_held: PendingVector,
    /// Pending loads free to access memory.
    pub loadable: PendingVector,
    /// Pending stores free to access memory.
    pub storable: PendingVector,
}

/// The LD/ST dependency matrix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LdStMatrix {
    n_units: usize,
    cells: Vec<LdStCell>,
    loads: PendingVector,
    stores: PendingVector,
}

impl LdStMatrix {
    /// Creates an idle matrix.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoUnits`] if `n_units` is zero and
    /// [`ConfigError::TooLarge`] if the cell count overflows.
    pub fn new(n_units: usize) -> Result<Self, ConfigError> {
        if n_units == 0 {
            return Err(ConfigError::NoUnits);
        }
        let cells = cell_count("ld/st matrix", n_units, n_units)?;
        Ok(Self {
            n_units,
            cells: vec![LdStCell::default(); cells],
            loads: PendingVector::zeros(n_units),
            stores: PendingVector::zeros(n_units),
        })
    }

    /// Number of units on each axis.
    pub const fn units(&self) -> usize {
        self.n_units
    }

    /// One cell.
    pub fn cell(&self, x: usize, y: usize) -> LdStCell {
        self.cells[x * self.n_units + y]
    }

    /// Units with a load outstanding.
    pub const fn loads(&self) -> &PendingVector {
        &self.loads
    }

    /// Units with a store outstanding.
    pub const fn stores(&self) -> &PendingVector {
        &self.stores
    }

    /// Loads that store x waits on.
    pub fn waits_on_loads(&self, x: usize) -> PendingVector {
        self.row(x).iter().map(|c| c.load_holds_store).collect()
    }

    /// Stores that load x waits on.
    pub fn waits_on_stores(&self, x: usize) -> PendingVector {
        self.row(x).iter().map(|c| c.store_holds_load).collect()
    }

    /// True if nothing is outstanding.
    pub fn is_empty(&self) -> bool {
        self.loads.none() && self.stores.none()
    }

    /// Outputs of the current state, given one address-match row per unit.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DimensionMismatch`] if `matches` is not an
    /// `n_units` × `n_units` mask.
    pub fn evaluate(&self, matches: &[PendingVector]) -> Result<LdStOutputs, ConfigError> {
        self.check("address match rows", matches.len())?;
        for row in matches {
            self.check("address match columns", row.len())?;
        }
        let load_held: PendingVector = (0..self.n_units)
            .map(|x| self.waits_on_stores(x).intersects(&matches[x]))
            .collect();
        let store_held: PendingVector = (0..self.n_units)
            .map(|x| self.waits_on_loads(x).intersects(&matches[x]))
            .collect();
        let mut loadable = self.loads.clone();
        loadable.clear_bits(&load_held);
        let mut storable = self.stores.clone();
        storable.clear_bits(&store_held);
        Ok(LdStOutputs {
            load_held,
            store_held,
            loadable,
            storable,
        })
    }

    /// Next-state function.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DimensionMismatch`] if an input vector does
    /// not span this matrix's units.
    pub fn commit(&self, inputs: &LdStInputs) -> Result<Self, ConfigError> {
        self.check("load issue vector", inputs.issue_load.len())?;
        self.check("store issue vector", inputs.issue_store.len())?;
        self.check("done vector", inputs.done.len())?;
        self.check("die vector", inputs.go_die.len())?;

        let n = self.n_units;
        let reset = &inputs.done | &inputs.go_die;
        let mut cells = Vec::with_capacity(n * n);
        for x in 0..n {
            for y in 0..n {
                if x == y || reset.get(x) || reset.get(y) {
                    cells.push(LdStCell::default());
                    continue;
                }
                let old = self.cell(x, y);
                let set_lhs = inputs.issue_store.get(x) && self.loads.get(y);
                let set_shl = inputs.issue_load.get(x) && self.stores.get(y);
                cells.push(LdStCell {
                    load_holds_store: old.load_holds_store || set_lhs,
                    store_holds_load: old.store_holds_load || set_shl,
                });
            }
        }
        let mut loads = &self.loads | &inputs.issue_load;
        loads.clear_bits(&reset);
        let mut stores = &self.stores | &inputs.issue_store;
        stores.clear_bits(&reset);
        Ok(Self {
            n_units: n,
            cells,
            loads,
            stores,
        })
    }

    const fn check(&self, what: &'static str, found: usize) -> Result<(), ConfigError> {
        if found == self.n_units {
            Ok(())
        } else {
            Err(ConfigError::DimensionMismatch {
                what,
                expected: self.n_units,
                found,
            })
        }
    }

    fn row(&self, x: usize) -> &[LdStCell] {
        &self.cells[x * self.n_units..(x + 1) * self.n_units]
    }
}

/// Partial address comparator.
///
/// Each unit latches an address, or none. Two units match when both hold an
/// address and the addresses agree on the `bits` window. A unit never
/// matches itself.
///
/// # Examples
///
/// ```
/// use shadowboard_core::matrix::PartialAddrMatch;
///
/// let mut addrs = PartialAddrMatch::new(3, PartialAddrMatch::DEFAULT_BITS).unwrap();
/// addrs.latch(0, Some(0x1230)).unwrap();
/// addrs.latch(1, Some(0x9238)).unwrap();
/// addrs.latch(2, Some(0x1240)).unwrap();
/// assert_eq!(addrs.matches(0).to_string(), "010");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartialAddrMatch {
    bits: Range<u32>,
    addrs: Vec<Option<u64>>,
}

impl PartialAddrMatch {
    /// Bits 4..12: above a misaligned doubleword, below the 4 KiB page offset.
    pub const DEFAULT_BITS: Range<u32> = 4..12;

    /// Creates a comparator with no addresses latched.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoUnits`] if `n_units` is zero and
    /// [`ConfigError::AddressBits`] if `bits` is empty or reaches past bit 63.
    pub fn new(n_units: usize, bits: Range<u32>) -> Result<Self, ConfigError> {
        if n_units == 0 {
            return Err(ConfigError::NoUnits);
        }
        if bits.is_empty() || bits.end > u64::BITS {
            return Err(ConfigError::AddressBits {
                start: bits.start,
                end: bits.end,
            });
        }
        Ok(Self {
            bits,
            addrs: vec![None; n_units],
        })
    }

    /// Number of units.
    pub fn units(&self) -> usize {
        self.addrs.len()
    }

    /// The compared bit window.
    pub fn bits(&self) -> Range<u32> {
        self.bits.clone()
    }

    /// Latches `addr` for `unit`; `None` takes the unit out of matching.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreboardError::UnitOutOfRange`] for an unknown unit.
    pub fn latch(&mut self, unit: usize, addr: Option<u64>) -> Result<(), ScoreboardError> {
        let units = self.addrs.len();
        let slot = self
            .addrs
            .get_mut(unit)
            .ok_or(ScoreboardError::UnitOutOfRange {
                unit: UnitId(unit),
                units,
            })?;
        *slot = addr;
        Ok(())
    }

    /// Units whose address clashes with `x`'s.
    pub fn matches(&self, x: usize) -> PendingVector {
        let n = self.addrs.len();
        let Some(own) = self.addrs.get(x).copied().flatten() else {
            return PendingVector::zeros(n);
        };
        let key = self.key(own);
        self.addrs
            .iter()
            .enumerate()
            .map(|(y, &addr)| y != x && addr.is_some_and(|a| self.key(a) == key))
            .collect()
    }

    /// One match row per unit, the mask [`LdStMatrix::evaluate`] takes.
    pub fn match_rows(&self) -> Vec<PendingVector> {
        (0..self.addrs.len()).map(|x| self.matches(x)).collect()
    }

    const fn key(&self, addr: u64) -> u64 {
        let width = self.bits.end - self.bits.start;
        let mask = if width == u64::BITS {
            u64::MAX
        } else {
            (1u64 << width) - 1
        };
        (addr >> self.bits.start) & mask
    }
}
