//! # Common Test Infrastructure
//!
//! Builders, the scoreboard harness and the pairwise hazard oracle.

/// Configuration and input builders.
pub mod builder;

/// Scoreboard test harness.
pub mod harness;

/// Brute-force reference checks.
pub mod oracle;
