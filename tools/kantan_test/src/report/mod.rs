//! Progress and summary reporting.

use parking_lot::Mutex;

use crate::result::{RunSummary, TestVerdict, UnitResult};

/// Receives each unit's result as soon as it is known.
///
/// Called concurrently from every worker.
pub trait Reporter: Sync {
    fn report(&self, result: &UnitResult);
}

/// Prints one line per unit to stdout.
#[derive(Clone, Debug, Default)]
pub struct ConsoleReporter {
    pub show_skipped: bool,
    /// Dump the compiler's raw output under each failure.
    pub print_fail_output: bool,
}

impl ConsoleReporter {
    /// The text printed for `result`, or `None` when it is not shown.
    pub fn format(&self, result: &UnitResult) -> Option<String> {
        match &result.verdict {
            TestVerdict::Success => Some(format!("PASS: {}", result.name)),
            TestVerdict::Skipped(reason) if self.show_skipped => {
                Some(format!("SKIP: {} - {reason}", result.name))
            }
            TestVerdict::Skipped(_) => None,
            TestVerdict::Failure(message) => {
                let mut text = format!("FAIL: {} - {message}", result.name);
                if self.print_fail_output {
                    if let Some(raw) = &result.raw_output {
                        text.push('\n');
                        text.push_str(raw.trim_end());
                    }
                }
                Some(text)
            }
        }
    }
}

impl Reporter for ConsoleReporter {
    fn report(&self, result: &UnitResult) {
        // One println per unit keeps concurrent lines from interleaving.
        if let Some(text) = self.format(result) {
            println!("{text}");
        }
    }
}

/// Keeps every result in memory, in arrival order.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    results: Mutex<Vec<UnitResult>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        CollectingReporter::default()
    }

    pub fn into_results(self) -> Vec<UnitResult> {
        self.results.into_inner()
    }
}

impl Reporter for CollectingReporter {
    fn report(&self, result: &UnitResult) {
        self.results.lock().push(result.clone());
    }
}

/// End-of-run summary lines.
pub fn format_summary(summary: &RunSummary, show_skipped: bool) -> String {
    let mut lines = vec![format!("passed: {}", summary.passed)];
    if summary.failed > 0 {
        lines.push(format!("failed: {}", summary.failed));
    }
    if summary.skipped > 0 && show_skipped {
        lines.push(format!("skipped: {}", summary.skipped));
    }
    if !summary.is_complete() {
        lines.push("some tests could not be executed".to_string());
    }
    lines.push(format!("finished in {:.2}s", summary.duration.as_secs_f64()));
    lines.join("\n")
}
