//! Configuration system for the scoreboard.
//!
//! This module defines the configuration structures used to size and
//! parameterize a scoreboard. It provides:
//! 1. **Defaults:** Baseline widths (register file, shadow contexts) and the default unit mix.
//! 2. **Structures:** Hierarchical config for general, matrix, and unit-class settings.
//! 3. **Validation:** Rejection of zero-sized or ambiguous layouts before any matrix is built.
//!
//! Configuration is supplied as JSON (`Config::from_json`) or built with `Config::default()`.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::common::ConfigError;

/// Default configuration constants.
mod defaults {
    /// Stall watchdog limit in ticks.
    ///
    /// The driver gives up when this many consecutive ticks pass with
    /// outstanding work and no issue, go or die event.
    pub const STALL_LIMIT: u64 = 256;

    /// Architectural register count (columns of the dependency matrix).
    pub const REGISTERS: usize = 32;

    /// Number of concurrent speculation contexts.
    pub const SHADOW_WIDTH: usize = 1;

    /// Upper bound on the cells of any one matrix.
    pub const MAX_CELLS: usize = 1 << 30;

    /// Execute latency of a unit class, in ticks.
    pub const LATENCY: u64 = 1;

    /// Default unit mix as (name, count, latency).
    pub const UNITS: &[(&str, usize, u64)] = &[
        ("alu", 2, 1),
        ("mul", 1, 3),
        ("ldst", 1, 2),
        ("branch", 1, 1),
    ];
}

/// Root configuration.
///
/// # Examples
///
/// ```
/// use shadowboard_core::Config;
///
/// let json = r#"{
///     "matrix": { "registers": 8, "shadow_width": 2 },
///     "units": [
///         { "name": "alu", "count": 2 },
///         { "name": "mul", "count": 1, "latency": 4 }
///     ]
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.unit_count(), 3);
/// assert_eq!(config.matrix.shadow_width, 2);
/// assert_eq!(config.class_range(1), Some(2..3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// General simulation settings
    #[serde(default)]
    pub general: GeneralConfig,
    /// Matrix dimensions
    #[serde(default)]
    pub matrix: MatrixConfig,
    /// Function unit classes, in unit-id order
    #[serde(default = "Config::default_units")]
    pub units: Vec<UnitClassConfig>,
}

impl Config {
    fn default_units() -> Vec<UnitClassConfig> {
        defaults::UNITS
            .iter()
            .map(|&(name, count, latency)| UnitClassConfig {
                name: name.to_owned(),
                count,
                latency,
            })
            .collect()
    }

    /// Parses and validates a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and any error
    /// [`Config::validate`] reports.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration describes a buildable scoreboard.
    ///
    /// # Errors
    ///
    /// Returns an error for zero registers, zero units, an empty class, a
    /// duplicated class name, a zero stall limit, or a unit count whose
    /// matrices would not fit the cell budget.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.matrix.registers == 0 {
            return Err(ConfigError::NoRegisters);
        }
        if self.units.is_empty() {
            return Err(ConfigError::NoUnits);
        }
        if self.general.stall_limit == 0 {
            return Err(ConfigError::NoStallLimit);
        }
        for (i, class) in self.units.iter().enumerate() {
            if class.count == 0 {
                return Err(ConfigError::EmptyClass(class.name.clone()));
            }
            if self.units[..i].iter().any(|c| c.name == class.name) {
                return Err(ConfigError::DuplicateClass(class.name.clone()));
            }
        }
        let units =
            checked_sum(&self.units).ok_or(ConfigError::TooLarge { what: "unit count" })?;
        let _ = cell_count("dependency matrix", units, self.matrix.registers)?;
        let _ = cell_count("issue-order matrix", units, units)?;
        let _ = cell_count("shadow matrix", units, self.matrix.shadow_width)?;
        Ok(())
    }

    /// Total number of function units across all classes.
    ///
    /// Saturates for configurations [`Config::validate`] rejects as too large.
    pub fn unit_count(&self) -> usize {
        self.units
            .iter()
            .fold(0, |acc: usize, c| acc.saturating_add(c.count))
    }

    /// Unit-id range occupied by class `class`.
    pub fn class_range(&self, class: usize) -> Option<Range<usize>> {
        let start = checked_sum(self.units.get(..class)?)?;
        let count = self.units.get(class)?.count;
        Some(start..start.checked_add(count)?)
    }

    /// Looks up a class index by name.
    pub fn class_index(&self, name: &str) -> Option<usize> {
        self.units.iter().position(|c| c.name == name)
    }

    /// Execute latency of the class owning `unit`.
    pub fn unit_latency(&self, unit: usize) -> Option<u64> {
        let mut base: usize = 0;
        for class in &self.units {
            base = base.saturating_add(class.count);
            if unit < base {
                return Some(class.latency);
            }
        }
        None
    }
}

fn checked_sum(classes: &[UnitClassConfig]) -> Option<usize> {
    classes
        .iter()
        .try_fold(0usize, |acc, c| acc.checked_add(c.count))
}

/// Cells of a `rows` × `cols` matrix, if within the cell budget.
pub(crate) fn cell_count(
    what: &'static str,
    rows: usize,
    cols: usize,
) -> Result<usize, ConfigError> {
    rows.checked_mul(cols)
        .filter(|&cells| cells <= defaults::MAX_CELLS)
        .ok_or(ConfigError::TooLarge { what })
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            matrix: MatrixConfig::default(),
            units: Self::default_units(),
        }
    }
}

/// General simulation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Emit a full state snapshot at `trace` level on every tick
    #[serde(default)]
    pub trace_ticks: bool,

    /// Consecutive idle ticks tolerated by the driver before it reports a stall
    #[serde(default = "GeneralConfig::default_stall_limit")]
    pub stall_limit: u64,
}

impl GeneralConfig {
    fn default_stall_limit() -> u64 {
        defaults::STALL_LIMIT
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            trace_ticks: false,
            stall_limit: defaults::STALL_LIMIT,
        }
    }
}

/// Matrix dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixConfig {
    /// Number of architectural registers
    #[serde(default = "MatrixConfig::default_registers")]
    pub registers: usize,

    /// Number of speculation contexts; zero disables shadowing
    #[serde(default = "MatrixConfig::default_shadow_width")]
    pub shadow_width: usize,
}

impl MatrixConfig {
    fn default_registers() -> usize {
        defaults::REGISTERS
    }

    fn default_shadow_width() -> usize {
        defaults::SHADOW_WIDTH
    }
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            registers: defaults::REGISTERS,
            shadow_width: defaults::SHADOW_WIDTH,
        }
    }
}

/// A class of interchangeable function units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitClassConfig {
    /// Class name, unique within a configuration
    pub name: String,
    /// Number of units in the class
    pub count: usize,
    /// Execute latency in ticks, used by the driver's unit model
    #[serde(default = "UnitClassConfig::default_latency")]
    pub latency: u64,
}

impl UnitClassConfig {
    fn default_latency() -> u64 {
        defaults::LATENCY
    }

    /// Creates a class with the default latency.
    pub fn new(name: impl Into<String>, count: usize) -> Self {
        Self {
            name: name.into(),
            count,
            latency: defaults::LATENCY,
        }
    }
}
