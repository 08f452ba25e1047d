//! Scoreboard statistics collection and reporting.
//!
//! This module tracks event counts for a running scoreboard. It provides:
//! 1. **Throughput:** Ticks elapsed and operations issued.
//! 2. **Stalls:** Refused issue requests, broken down by cause.
//! 3. **Go Signals:** Reads, writes and cancellations applied.
//! 4. **Speculation:** Branch confirmations and cancellations.
//! 5. **Protocol:** Advisory warnings for go signals asserted against the hazard outputs.

use std::fmt;

use serde::Serialize;

use crate::sched::signals::{IssueStall, TickOutputs};

/// Statistics structure tracking scoreboard events.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ScoreboardStats {
    /// Ticks evaluated.
    pub ticks: u64,
    /// Operations issued.
    pub issues: u64,
    /// Issue requests refused for a write-after-write hazard.
    pub stalls_waw: u64,
    /// Issue requests refused because the whole class was busy.
    pub stalls_class_busy: u64,
    /// Issue requests refused because the targeted unit was busy.
    pub stalls_unit_busy: u64,
    /// Go-read signals applied.
    pub go_reads: u64,
    /// Go-write signals applied.
    pub go_writes: u64,
    /// Units cancelled (external or shadow).
    pub go_dies: u64,
    /// Units confirmed by branch resolutions.
    pub confirmations: u64,
    /// Units cancelled by branch resolutions.
    pub cancellations: u64,
    /// Go signals asserted while the unit was not readable/writable.
    pub protocol_warnings: u64,
}

impl ScoreboardStats {
    /// Folds one tick into the counters.
    pub(crate) fn record(
        &mut self,
        outputs: &TickOutputs,
        go_reads: usize,
        go_writes: usize,
        warnings: u64,
    ) {
        self.ticks += 1;
        if outputs.grant.issued() {
            self.issues += 1;
        }
        match outputs.grant.stall {
            Some(IssueStall::WriteAfterWrite) => self.stalls_waw += 1,
            Some(IssueStall::ClassBusy) => self.stalls_class_busy += 1,
            Some(IssueStall::UnitBusy) => self.stalls_unit_busy += 1,
            None => {}
        }
        self.go_reads += go_reads as u64;
        self.go_writes += go_writes as u64;
        self.go_dies += outputs.go_die.count_ones() as u64;
        self.confirmations += outputs.confirmed.count_ones() as u64;
        self.cancellations += outputs.cancelled.count_ones() as u64;
        self.protocol_warnings += warnings;
    }

    /// Total refused issue requests.
    pub const fn stalls(&self) -> u64 {
        self.stalls_waw + self.stalls_class_busy + self.stalls_unit_busy
    }

    /// Issued operations per tick.
    #[allow(clippy::cast_precision_loss)]
    pub fn issue_rate(&self) -> f64 {
        if self.ticks == 0 {
            0.0
        } else {
            self.issues as f64 / self.ticks as f64
        }
    }
}

impl fmt::Display for ScoreboardStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "==========================================================")?;
        writeln!(f, "SCOREBOARD STATISTICS")?;
        writeln!(f, "==========================================================")?;
        writeln!(f, "sim_ticks                {}", self.ticks)?;
        writeln!(f, "sim_issues               {}", self.issues)?;
        writeln!(f, "sim_issue_rate           {:.4}", self.issue_rate())?;
        writeln!(f, "----------------------------------------------------------")?;
        writeln!(f, "STALLS")?;
        writeln!(f, "  stalls.waw             {}", self.stalls_waw)?;
        writeln!(f, "  stalls.class_busy      {}", self.stalls_class_busy)?;
        writeln!(f, "  stalls.unit_busy       {}", self.stalls_unit_busy)?;
        writeln!(f, "----------------------------------------------------------")?;
        writeln!(f, "GO SIGNALS")?;
        writeln!(f, "  go.read                {}", self.go_reads)?;
        writeln!(f, "  go.write               {}", self.go_writes)?;
        writeln!(f, "  go.die                 {}", self.go_dies)?;
        writeln!(f, "----------------------------------------------------------")?;
        writeln!(f, "SPECULATION")?;
        writeln!(f, "  branch.confirmed       {}", self.confirmations)?;
        writeln!(f, "  branch.cancelled       {}", self.cancellations)?;
        writeln!(f, "----------------------------------------------------------")?;
        write!(f, "protocol_warnings        {}", self.protocol_warnings)
    }
}
