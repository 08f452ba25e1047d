//! Issue and go-signal arbitration.
//!
//! This module decides which units are handed work and which units may
//! proceed. It includes:
//! 1. **Issue Arbiters:** Per-class fixed-priority selection of a free unit.
//! 2. **Group Picker:** Per-tick selection of one go-read and one go-write.

/// Issue arbiters.
pub mod arbiter;

/// Go-signal picker.
pub mod picker;

pub use arbiter::{ClassGrant, IssueArbiter, IssueUnitArray, PriorityPicker};
pub use picker::{GoSignals, GroupPicker};
