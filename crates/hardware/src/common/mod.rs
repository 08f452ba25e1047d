//! Common types shared by every scoreboard component.
//!
//! This module provides the building blocks used across the crate. It includes:
//! 1. **Index Types:** Newtypes for unit, register, class and context indices.
//! 2. **Pending Vectors:** The fixed-width bit vector every derived signal is carried in.
//! 3. **Error Handling:** Configuration, input-validation and simulation errors.

/// Error types.
pub mod error;

/// Index newtypes.
pub mod ids;

/// Fixed-width bit vectors.
pub mod vector;

pub use error::{ConfigError, Result, ScoreboardError, SimError};
pub use ids::{ClassId, ContextId, RegId, UnitId};
pub use vector::PendingVector;
