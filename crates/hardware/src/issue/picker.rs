//! Go-signal picking.
//!
//! Units that are ready to read or to write raise a request; the group
//! picker grants at most one go-read and one go-write per tick, lowest unit
//! id first.

use super::arbiter::PriorityPicker;
use crate::common::PendingVector;

/// Go signals chosen for one tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GoSignals {
    /// One-hot (or empty) go-read vector.
    pub go_read: PendingVector,
    /// One-hot (or empty) go-write vector.
    pub go_write: PendingVector,
}

/// Picks go-read and go-write among requesting units.
#[derive(Clone, Copy, Debug, Default)]
pub struct GroupPicker;

impl GroupPicker {
    /// Grants one readable read request and one writable write request.
    pub fn pick(
        readable: &PendingVector,
        read_req: &PendingVector,
        writable: &PendingVector,
        write_req: &PendingVector,
    ) -> GoSignals {
        GoSignals {
            go_read: PriorityPicker::pick(&(readable & read_req)),
            go_write: PriorityPicker::pick(&(writable & write_req)),
        }
    }
}
