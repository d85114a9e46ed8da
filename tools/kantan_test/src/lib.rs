//! Test runner for the Kantan compiler.
//!
//! Each test unit invokes the compiler binary once, decodes what it printed
//! through [`kantan_mi`], and compares the result against the unit's
//! expectation. Units run concurrently on a bounded worker pool; a failure,
//! crash or panic in one unit never affects another.
//!
//! # Pipeline
//!
//! ```text
//! discovery ─► Registry ─► scheduler ─┬─► runner::run_unit ─► exec ─► decode ─► diff
//!                                     └─► Reporter (one line per unit) + RunSummary
//! ```
//!
//! # Tracing
//!
//! Set `RUST_LOG` to see what the runner is doing:
//!
//! ```bash
//! RUST_LOG=kantan_test=debug kantan-test ./kantan tests/
//! ```

use std::sync::Once;

pub mod case;
pub mod diff;
pub mod discovery;
pub mod exec;
pub mod report;
pub mod result;
pub mod runner;
pub mod scheduler;

#[cfg(test)]
mod testing;

pub use case::{Precondition, Registry, TestCase};
pub use diff::{DiffOptions, Mismatch};
pub use discovery::{discover, DiscoveryError};
pub use exec::{
    ExecRequest, Execute, ExecutionFault, ExecutionResult, Executor, FaultKind, LeakCheck, SpawnError,
};
pub use report::{CollectingReporter, ConsoleReporter, Reporter};
pub use result::{RunSummary, TestVerdict, UnitResult};
pub use scheduler::{run, SchedulerConfig};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing subscriber for debugging.
///
/// Only installs a subscriber when `RUST_LOG` is set, so a normal run prints
/// nothing but the report. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .init();
        }
    });
}
