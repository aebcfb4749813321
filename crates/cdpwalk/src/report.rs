//! Human-readable console reports.
//!
//! Plain text on stdout; structured tracing stays on the log layer.

use cdpwalk_core::types::{FailureRecord, PendingEntry};

use crate::snapshot::SnapshotDiff;

/// Print the two-section baseline comparison.
pub fn print_diff(diff: &SnapshotDiff) {
    println!("--- Differences in Baseline ---");
    for line in &diff.removed {
        println!("{line}");
    }

    println!("--- Differences in Current ---");
    for line in &diff.added {
        println!("{line}");
    }
}

pub fn print_failures(failures: &[FailureRecord]) {
    println!("--- Failed to Connect to ---");
    for failure in failures {
        println!("{failure}");
    }
}

/// Non-follow mode: the neighbors that would have been visited.
pub fn print_pending(pending: &[PendingEntry]) {
    for entry in pending {
        println!("{} {} {}", entry.name, entry.ip, entry.capability);
    }
}
