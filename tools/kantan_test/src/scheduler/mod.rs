//! Concurrent scheduler.
//!
//! Dispatches every registered unit exactly once onto a bounded worker pool
//! and tallies verdicts as they arrive. Completion order is whatever the
//! workers produce; nothing downstream depends on it.

use std::num::NonZeroUsize;
use std::time::Instant;

use rayon::prelude::*;

use crate::case::{Registry, TestCase};
use crate::diff::DiffOptions;
use crate::exec::Execute;
use crate::report::Reporter;
use crate::result::{RunSummary, Tally};
use crate::runner::run_unit;

/// Configuration for one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Upper bound on units in flight at once.
    pub workers: usize,
    pub diff: DiffOptions,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            workers: default_workers(),
            diff: DiffOptions::default(),
        }
    }
}

/// Two workers per available CPU. Units spend most of their time waiting on
/// a child process.
pub fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(1, NonZeroUsize::get) * 2
}

/// Run every unit in `registry` and report each verdict as it arrives.
///
/// Uses `build_scoped` so the pool is torn down before this returns; if the
/// pool cannot be built the units run sequentially instead.
pub fn run(
    registry: &Registry,
    executor: &dyn Execute,
    config: &SchedulerConfig,
    reporter: &dyn Reporter,
) -> RunSummary {
    let start = Instant::now();
    let cases = registry.cases();
    let tally = Tally::default();
    let workers = config.workers.max(1);

    tracing::info!(units = cases.len(), workers, "starting test run");

    let run_one = |case: &dyn TestCase| {
        let result = run_unit(case, executor, &config.diff);
        tally.record(&result.verdict);
        reporter.report(&result);
    };

    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|index| format!("kantan-test-{index}"))
        .build_scoped(rayon::ThreadBuilder::run, |pool| {
            pool.install(|| cases.par_iter().for_each(|case| run_one(&**case)));
        })
        .unwrap_or_else(|e| {
            tracing::warn!("failed to create thread pool ({e}), running sequentially");
            cases.iter().for_each(|case| run_one(&**case));
        });

    let summary = RunSummary {
        scheduled: cases.len(),
        passed: tally.passed(),
        failed: tally.failed(),
        skipped: tally.skipped(),
        duration: start.elapsed(),
    };

    if summary.is_complete() {
        tracing::info!(
            passed = summary.passed,
            failed = summary.failed,
            skipped = summary.skipped,
            "test run finished"
        );
    } else {
        tracing::error!(
            scheduled = summary.scheduled,
            finished = summary.total(),
            "some units never reached a verdict"
        );
    }
    summary
}
