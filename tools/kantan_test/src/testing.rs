//! Test doubles shared by the unit tests.

use std::path::PathBuf;

use kantan_mi::{decode, DecodeMode, Decoded};

use crate::case::{Expectation, Precondition, SuccessExpectation, TestCase};
use crate::diff::{DiffOptions, Mismatch};
use crate::exec::{ExecRequest, Execute, ExecutionResult, SpawnError};

/// An executor that answers from a closure instead of spawning anything.
pub(crate) struct StubExecutor<F> {
    respond: F,
}

pub(crate) fn stub<F>(respond: F) -> StubExecutor<F>
where
    F: Fn(&ExecRequest<'_>) -> Result<ExecutionResult, SpawnError> + Sync,
{
    StubExecutor { respond }
}

impl<F> Execute for StubExecutor<F>
where
    F: Fn(&ExecRequest<'_>) -> Result<ExecutionResult, SpawnError> + Sync,
{
    fn execute(&self, request: &ExecRequest<'_>) -> Result<ExecutionResult, SpawnError> {
        (self.respond)(request)
    }
}

/// Decode `raw` as the compiler's structured output.
pub(crate) fn output(raw: &str, exit_code: i32) -> ExecutionResult {
    match decode(raw.to_string(), Some(exit_code), DecodeMode::Structured) {
        Ok(decoded) => ExecutionResult::Output(decoded),
        Err(fault) => ExecutionResult::DecodeFault(fault),
    }
}

pub(crate) fn clean() -> ExecutionResult {
    output(r#"{"errors":[]}"#, 0)
}

/// A hand-built case. Its report base is its name, so stub executors can
/// tell units apart.
pub(crate) struct StubCase {
    pub name: String,
    pub precondition: Option<Precondition>,
    pub expectation: Expectation,
    pub panics: bool,
}

impl StubCase {
    pub fn success(name: &str) -> Self {
        StubCase {
            name: name.to_string(),
            precondition: None,
            expectation: Expectation::Success(SuccessExpectation::default()),
            panics: false,
        }
    }
}

impl TestCase for StubCase {
    fn name(&self) -> &str {
        &self.name
    }

    fn mode(&self) -> DecodeMode {
        self.expectation.mode()
    }

    fn options(&self) -> Vec<String> {
        vec!["--mi".to_string()]
    }

    fn input_files(&self) -> Vec<PathBuf> {
        vec![PathBuf::from(format!("{}.kan", self.name))]
    }

    fn report_base(&self) -> PathBuf {
        PathBuf::from(&self.name)
    }

    fn precondition(&self) -> Option<&Precondition> {
        self.precondition.as_ref()
    }

    fn evaluate(&self, output: &Decoded, options: &DiffOptions) -> Result<(), Mismatch> {
        assert!(!self.panics, "evaluation of {} blew up", self.name);
        self.expectation.check(output, options)
    }
}
