use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use kantan_mi::Severity;

fn err(line: u32, column: u32, message: &str) -> Diagnostic {
    Diagnostic::error(line, column, message, "/t/a.kan")
}

#[test]
fn test_identical_diagnostics_match() {
    let diagnostics = vec![err(2, 5, "No identifier 'x' in scope"), err(4, 1, "Expected ';'")];
    assert_eq!(
        compare_diagnostics(&diagnostics, &diagnostics.clone(), &DiffOptions::default()),
        Ok(())
    );
}

#[test]
fn test_line_mismatch_message() {
    let expected = vec![err(3, 5, "No identifier 'x' in scope")];
    let actual = vec![err(2, 5, "No identifier 'x' in scope")];

    let mismatch = compare_diagnostics(&expected, &actual, &DiffOptions::default()).unwrap_err();
    assert_eq!(mismatch.to_string(), "errors[0]: expected lnr 3, got 2");
}

#[test]
fn test_count_mismatch() {
    let mismatch =
        compare_diagnostics(&[], &[err(1, 1, "boom")], &DiffOptions::default()).unwrap_err();
    assert_eq!(mismatch.to_string(), "errors: expected count 0, got 1");
}

#[test]
fn test_order_is_significant() {
    let a = err(1, 1, "first");
    let b = err(2, 1, "second");
    let mismatch = compare_diagnostics(
        &[a.clone(), b.clone()],
        &[b, a],
        &DiffOptions::default(),
    )
    .unwrap_err();
    assert_eq!(mismatch.path, "errors[0]");
    assert_eq!(mismatch.field.as_deref(), Some("lnr"));
}

#[test]
fn test_field_order_of_checks() {
    let expected = Diagnostic::new(Severity::Warning, 1, 1, "unused", "/t/a.kan");
    let actual = Diagnostic::new(Severity::Error, 9, 9, "other", "/t/b.kan");
    let mismatch = compare_diagnostics(&[expected], &[actual], &DiffOptions::default()).unwrap_err();
    assert_eq!(mismatch.to_string(), "errors[0]: expected type warning, got error");

    let mismatch = compare_diagnostics(
        &[err(1, 1, "Expected ';'")],
        &[err(1, 1, "Expected ')'")],
        &DiffOptions::default(),
    )
    .unwrap_err();
    assert_eq!(
        mismatch.to_string(),
        r#"errors[0]: expected content "Expected ';'", got "Expected ')'""#
    );

    let mismatch = compare_diagnostics(
        &[err(1, 1, "x")],
        &[Diagnostic::error(1, 1, "x", "/t/other.kan")],
        &DiffOptions::default(),
    )
    .unwrap_err();
    assert_eq!(mismatch.field.as_deref(), Some("file"));
}

#[test]
fn test_notes_ignored_when_actual_has_none() {
    let expected = vec![err(1, 9, "Modules cannot import themselves").with_note(Diagnostic::note("imported here"))];
    let actual = vec![err(1, 9, "Modules cannot import themselves")];
    assert_eq!(
        compare_diagnostics(&expected, &actual, &DiffOptions::default()),
        Ok(())
    );
}

#[test]
fn test_notes_compared_when_present() {
    let expected = vec![err(1, 9, "Duplicate definition").with_note(Diagnostic::note("first defined here"))];
    let actual = vec![err(1, 9, "Duplicate definition").with_note(Diagnostic::note("previously defined here"))];

    let mismatch = compare_diagnostics(&expected, &actual, &DiffOptions::default()).unwrap_err();
    assert_eq!(mismatch.path, "errors[0].notes[0]");
    assert_eq!(mismatch.field.as_deref(), Some("content"));

    // Unexpected notes count as a difference too.
    let mismatch = compare_diagnostics(
        &[err(1, 9, "Duplicate definition")],
        &actual,
        &DiffOptions::default(),
    )
    .unwrap_err();
    assert_eq!(mismatch.to_string(), "errors[0].notes: expected count 0, got 1");
}

#[test]
fn test_note_depth() {
    let nested = |text: &str| {
        err(1, 1, "outer").with_note(Diagnostic::note("middle").with_note(Diagnostic::note(text)))
    };
    let expected = vec![nested("inner")];
    let actual = vec![nested("different")];

    assert_eq!(
        compare_diagnostics(&expected, &actual, &DiffOptions::default()),
        Ok(())
    );
    let mismatch =
        compare_diagnostics(&expected, &actual, &DiffOptions { note_depth: 2 }).unwrap_err();
    assert_eq!(mismatch.path, "errors[0].notes[0].notes[0]");
    assert_eq!(
        compare_diagnostics(&expected, &actual, &DiffOptions { note_depth: 0 }),
        Ok(())
    );
}

#[test]
fn test_compare_text() {
    assert_eq!(compare_text("stdout", "a\nb\n", "a\nb\n"), Ok(()));
    assert_eq!(
        compare_text("stdout", "a\nb\n", "a\nc\n").unwrap_err().to_string(),
        r#"stdout line 2: expected "b", got "c""#
    );
    assert_eq!(
        compare_text("stdout", "a\n", "a\nb\n").unwrap_err().to_string(),
        r#"stdout line 2: expected end of output, got "b""#
    );
    assert_eq!(
        compare_text("stdout", "a\n", "a").unwrap_err().to_string(),
        r#"stdout: expected "a\n", got "a""#
    );
}

fn diagnostic_strategy() -> impl Strategy<Value = Diagnostic> {
    (0u32..50, 0u32..80, "[a-z ]{0,12}").prop_map(|(line, column, message)| {
        Diagnostic::error(line, column, message, "/t/a.kan")
    })
}

proptest! {
    #[test]
    fn prop_diagnostics_match_themselves(
        diagnostics in proptest::collection::vec(diagnostic_strategy(), 0..6)
    ) {
        prop_assert_eq!(
            compare_diagnostics(&diagnostics, &diagnostics, &DiffOptions::default()),
            Ok(())
        );
    }

    #[test]
    fn prop_changed_line_is_located(
        diagnostics in proptest::collection::vec(diagnostic_strategy(), 1..6),
        pick in any::<prop::sample::Index>(),
    ) {
        let index = pick.index(diagnostics.len());
        let mut actual = diagnostics.clone();
        actual[index].line += 1;

        let mismatch = compare_diagnostics(&diagnostics, &actual, &DiffOptions::default()).unwrap_err();
        prop_assert_eq!(mismatch.path, format!("errors[{index}]"));
        prop_assert_eq!(mismatch.field, Some("lnr".to_string()));
    }
}
