//! Test result types.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Verdict for a single unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TestVerdict {
    Success,
    /// Failed with a message.
    Failure(String),
    /// Not run, with a reason.
    Skipped(String),
}

impl TestVerdict {
    pub fn is_success(&self) -> bool {
        matches!(self, TestVerdict::Success)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, TestVerdict::Failure(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, TestVerdict::Skipped(_))
    }
}

/// Result of running a single unit.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitResult {
    pub name: String,
    pub verdict: TestVerdict,
    /// Captured stdout, kept for failures so it can be shown on request.
    pub raw_output: Option<String>,
    pub duration: Duration,
}

/// Verdict counters shared by every worker.
#[derive(Debug, Default)]
pub struct Tally {
    passed: AtomicUsize,
    failed: AtomicUsize,
    skipped: AtomicUsize,
}

impl Tally {
    pub fn record(&self, verdict: &TestVerdict) {
        let counter = match verdict {
            TestVerdict::Success => &self.passed,
            TestVerdict::Failure(_) => &self.failed,
            TestVerdict::Skipped(_) => &self.skipped,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn passed(&self) -> usize {
        self.passed.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn skipped(&self) -> usize {
        self.skipped.load(Ordering::Relaxed)
    }
}

/// Totals for a whole run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Units handed to the scheduler.
    pub scheduled: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration: Duration,
}

impl RunSummary {
    /// Units that reached a verdict.
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }

    /// Whether every scheduled unit reached a verdict. Anything else means
    /// the runner itself lost track of a unit.
    pub fn is_complete(&self) -> bool {
        self.total() == self.scheduled
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Process exit code: 0 when nothing failed and every unit was
    /// accounted for, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.has_failures() || !self.is_complete() {
            1
        } else {
            0
        }
    }
}
