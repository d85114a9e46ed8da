use super::*;
use pretty_assertions::assert_eq;

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use kantan_mi::Diagnostic;

use crate::case::{Expectation, Precondition};
use crate::exec::{ExecutionFault, FaultKind, SpawnError};
use crate::testing::{clean, output, stub, StubCase};

#[test]
fn test_success() {
    let executor = stub(|_| Ok(clean()));
    let result = run_unit(&StubCase::success("ok"), &executor, &DiffOptions::default());
    assert_eq!(result.name, "ok");
    assert_eq!(result.verdict, TestVerdict::Success);
    assert_eq!(result.raw_output, None);
}

#[test]
fn test_request_carries_the_case() {
    let executor = stub(|request| {
        assert_eq!(request.base, PathBuf::from("ir/basic-blocks").as_path());
        assert_eq!(request.args, ["--mi".to_string()]);
        assert_eq!(request.inputs, [PathBuf::from("ir/basic-blocks.kan")]);
        Ok(clean())
    });
    let result = run_unit(
        &StubCase::success("ir/basic-blocks"),
        &executor,
        &DiffOptions::default(),
    );
    assert!(result.verdict.is_success());
}

#[test]
fn test_mismatch_keeps_raw_output() {
    let raw = r#"{"errors":[{"type":"error","lnr":2,"col":5,"content":"No identifier 'x' in scope","file":"a.kan"}]}"#;
    let executor = stub(move |_| Ok(output(raw, 1)));
    let case = StubCase {
        expectation: Expectation::Errors(vec![Diagnostic::error(
            3,
            5,
            "No identifier 'x' in scope",
            "a.kan",
        )]),
        ..StubCase::success("sema/undefined")
    };

    let result = run_unit(&case, &executor, &DiffOptions::default());
    assert_eq!(
        result.verdict,
        TestVerdict::Failure("errors[0]: expected lnr 3, got 2".to_string())
    );
    assert_eq!(result.raw_output.as_deref(), Some(raw));
}

#[test]
fn test_execution_fault() {
    let executor = stub(|_| {
        Ok(ExecutionResult::Fault(ExecutionFault {
            kind: FaultKind::Aborted,
            raw: "partial".to_string(),
        }))
    });
    let result = run_unit(&StubCase::success("crash"), &executor, &DiffOptions::default());
    assert_eq!(result.verdict, TestVerdict::Failure("aborted".to_string()));
    assert_eq!(result.raw_output.as_deref(), Some("partial"));
}

#[test]
fn test_decode_fault() {
    let executor = stub(|_| Ok(output("not json", 0)));
    let result = run_unit(&StubCase::success("garbage"), &executor, &DiffOptions::default());
    match &result.verdict {
        TestVerdict::Failure(message) => {
            assert!(message.starts_with("could not decode compiler output"));
        }
        other => panic!("expected a failure, got {other:?}"),
    }
    assert_eq!(result.raw_output.as_deref(), Some("not json"));
}

#[test]
fn test_spawn_error_fails_the_unit() {
    let executor = stub(|_| {
        Err(SpawnError {
            program: PathBuf::from("/nonexistent/kantan"),
            source: io::Error::from(io::ErrorKind::NotFound),
        })
    });
    let result = run_unit(&StubCase::success("x"), &executor, &DiffOptions::default());
    match &result.verdict {
        TestVerdict::Failure(message) => {
            assert!(message.starts_with("could not execute '/nonexistent/kantan'"));
        }
        other => panic!("expected a failure, got {other:?}"),
    }
}

#[test]
fn test_unmet_precondition_skips_without_running() {
    let calls = AtomicUsize::new(0);
    let executor = stub(|_| {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(clean())
    });
    let case = StubCase {
        precondition: Some(Precondition::os("no-such-os")),
        ..StubCase::success("platform")
    };

    let result = run_unit(&case, &executor, &DiffOptions::default());
    assert_eq!(
        result.verdict,
        TestVerdict::Skipped("requires no-such-os".to_string())
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_panic_becomes_a_failure() {
    let executor = stub(|_| Ok(clean()));
    let case = StubCase {
        panics: true,
        ..StubCase::success("explodes")
    };

    let result = run_unit(&case, &executor, &DiffOptions::default());
    assert_eq!(
        result.verdict,
        TestVerdict::Failure("panicked: evaluation of explodes blew up".to_string())
    );
}
