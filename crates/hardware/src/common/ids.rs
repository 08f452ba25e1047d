//! Index newtypes for the scoreboard's axes.
//!
//! Every matrix in the scoreboard is indexed by small integers: function
//! units along one axis, registers (or units again) along the other. The
//! newtypes keep the two axes from being mixed up at API boundaries while
//! remaining plain `usize` underneath.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Index of a function unit (a row of the dependency matrix).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UnitId(pub usize);

/// Index of an architectural register (a column of the dependency matrix).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RegId(pub usize);

/// Index of a class of interchangeable function units.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ClassId(pub usize);

/// Index of a speculation (shadow) context.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ContextId(pub usize);

macro_rules! index_impls {
    ($ty:ident, $prefix:literal) => {
        impl $ty {
            /// Returns the raw index.
            #[inline]
            pub const fn index(self) -> usize {
                self.0
            }
        }

        impl From<usize> for $ty {
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

index_impls!(UnitId, "fu");
index_impls!(RegId, "r");
index_impls!(ClassId, "class");
index_impls!(ContextId, "ctx");
