//! Evaluation of a single unit.
//!
//! Order is fixed: precondition, then the invocation, then the verdict.
//! Whatever goes wrong along the way, including a panic in the case's own
//! code, ends up as a verdict for this unit only.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use crate::case::TestCase;
use crate::diff::DiffOptions;
use crate::exec::{ExecRequest, Execute, ExecutionResult};
use crate::result::{TestVerdict, UnitResult};

/// Run one unit to a verdict.
pub fn run_unit(case: &dyn TestCase, executor: &dyn Execute, options: &DiffOptions) -> UnitResult {
    let start = Instant::now();
    let name = case.name().to_string();
    let _span = tracing::debug_span!("unit", name = %name).entered();

    let (verdict, raw_output) =
        match panic::catch_unwind(AssertUnwindSafe(|| evaluate(case, executor, options))) {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(%message, "unit panicked");
                (TestVerdict::Failure(format!("panicked: {message}")), None)
            }
        };

    tracing::debug!(?verdict, "unit finished");
    UnitResult {
        name,
        verdict,
        raw_output,
        duration: start.elapsed(),
    }
}

fn evaluate(
    case: &dyn TestCase,
    executor: &dyn Execute,
    options: &DiffOptions,
) -> (TestVerdict, Option<String>) {
    if let Some(precondition) = case.precondition() {
        if let Err(reason) = precondition.check() {
            return (TestVerdict::Skipped(reason), None);
        }
    }

    let args = case.options();
    let inputs = case.input_files();
    let base = case.report_base();
    let request = ExecRequest {
        base: &base,
        args: &args,
        inputs: &inputs,
        mode: case.mode(),
        timeout: None,
    };

    let result = match executor.execute(&request) {
        Ok(result) => result,
        Err(e) => return (TestVerdict::Failure(e.to_string()), None),
    };

    match result {
        ExecutionResult::Fault(fault) => (TestVerdict::Failure(fault.to_string()), Some(fault.raw)),
        ExecutionResult::DecodeFault(fault) => {
            (TestVerdict::Failure(fault.to_string()), Some(fault.raw))
        }
        ExecutionResult::Output(decoded) => match case.evaluate(&decoded, options) {
            Ok(()) => (TestVerdict::Success, None),
            Err(mismatch) => (
                TestVerdict::Failure(mismatch.to_string()),
                Some(decoded.raw().to_string()),
            ),
        },
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
