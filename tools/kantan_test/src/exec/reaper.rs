//! Leak report cleanup.
//!
//! The supervisor leaves `<base>.xml` behind after every run. It is only
//! worth keeping when the run ended in a fault; otherwise it is removed.
//! Cleanup problems are logged and never change a unit's verdict.

use std::io;
use std::path::Path;

/// What happened to a leak report.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Reaped {
    Removed,
    Retained,
    /// The supervisor did not write a report.
    Missing,
    /// Removal failed; the error was logged.
    Failed,
}

pub fn reap(report: &Path, faulted: bool) -> Reaped {
    if faulted {
        tracing::debug!(path = %report.display(), "keeping leak report");
        return Reaped::Retained;
    }

    match std::fs::remove_file(report) {
        Ok(()) => Reaped::Removed,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %report.display(), "no leak report to remove");
            Reaped::Missing
        }
        Err(e) => {
            tracing::warn!(path = %report.display(), error = %e, "could not remove leak report");
            Reaped::Failed
        }
    }
}
