use super::*;
use pretty_assertions::assert_eq;

use kantan_mi::decode;

fn structured(raw: &str, exit_code: i32) -> Decoded {
    decode(raw.to_string(), Some(exit_code), DecodeMode::Structured).unwrap()
}

fn plain(text: &str) -> Decoded {
    decode(text.to_string(), Some(0), DecodeMode::Plain).unwrap()
}

fn check(expectation: &Expectation, output: &Decoded) -> Result<(), String> {
    expectation
        .check(output, &DiffOptions::default())
        .map_err(|m| m.to_string())
}

#[test]
fn test_success_with_no_snapshots() {
    let expectation = Expectation::Success(SuccessExpectation::default());
    assert_eq!(check(&expectation, &structured(r#"{"errors":[]}"#, 0)), Ok(()));
}

#[test]
fn test_success_rejects_diagnostics() {
    let expectation = Expectation::Success(SuccessExpectation::default());
    let output = structured(
        r#"{"errors":[{"type":"error","lnr":2,"col":5,"content":"No identifier 'x' in scope","file":"a.kan"}]}"#,
        1,
    );
    assert_eq!(
        check(&expectation, &output),
        Err("errors: expected count 0, got 1 (a.kan:2:5: error: No identifier 'x' in scope)".to_string())
    );
}

#[test]
fn test_success_rejects_failing_exit_code() {
    let expectation = Expectation::Success(SuccessExpectation::default());
    assert_eq!(
        check(&expectation, &structured(r#"{"errors":[]}"#, 3)),
        Err("process: expected exit code 0, got 3".to_string())
    );
}

#[test]
fn test_expected_errors() {
    let expectation = Expectation::Errors(vec![Diagnostic::error(
        3,
        5,
        "No identifier 'x' in scope",
        "a.kan",
    )]);
    let output = structured(
        r#"{"errors":[{"type":"error","lnr":2,"col":5,"content":"No identifier 'x' in scope","file":"a.kan","notes":[]}]}"#,
        1,
    );
    assert_eq!(
        check(&expectation, &output),
        Err("errors[0]: expected lnr 3, got 2".to_string())
    );
}

#[test]
fn test_modules_snapshot() {
    let snapshot: Value = serde_json::from_str(
        r#"[{"kind":"module","path":"a.kan","items":[{"kind":"func_def","name":"main","ret":"i32"}]}]"#,
    )
    .unwrap();
    let expectation = Expectation::Success(SuccessExpectation {
        modules: Some(snapshot),
        ..SuccessExpectation::default()
    });

    let same = structured(
        r#"{"errors":[],"modules":[{"path":"a.kan","kind":"module","items":[{"name":"main","kind":"func_def","ret":"i32"}]}]}"#,
        0,
    );
    assert_eq!(check(&expectation, &same), Ok(()));

    let different = structured(
        r#"{"errors":[],"modules":[{"kind":"module","path":"a.kan","items":[{"kind":"func_def","name":"main","ret":"void"}]}]}"#,
        0,
    );
    assert_eq!(
        check(&expectation, &different),
        Err(r#"modules[0]<module>.items[0]<func_def>.ret: expected "i32", got "void""#.to_string())
    );

    assert_eq!(
        check(&expectation, &structured(r#"{"errors":[]}"#, 0)),
        Err("modules: expected an AST dump, got nothing".to_string())
    );
}

const IR: &str = r#"[{"path":"a.kan","functions":[{"original_name":"main","blocks":{
    "bb0":{"statements":[],"terminator":{"kind":"return"}}}}]}]"#;

#[test]
fn test_ir_snapshot_catches_untyped_extras() {
    let expectation = Expectation::Success(SuccessExpectation {
        ir: Some(IrSnapshot::from_value(serde_json::from_str(IR).unwrap()).unwrap()),
        ..SuccessExpectation::default()
    });

    let same = structured(&format!(r#"{{"errors":[],"ir":{IR}}}"#), 0);
    assert_eq!(check(&expectation, &same), Ok(()));

    // Typed IR is identical; only an unmodelled key differs.
    let extra = IR.replace(r#""original_name":"main""#, r#""original_name":"main","inline":true"#);
    let output = structured(&format!(r#"{{"errors":[],"ir":{extra}}}"#), 0);
    assert_eq!(
        check(&expectation, &output),
        Err("ir[0].functions[0].inline: expected nothing, got true".to_string())
    );
}

#[test]
fn test_config_subset() {
    let mut config = Map::new();
    config.insert("target".to_string(), Value::from("x86_64-unknown-linux-sysv"));
    let expectation = Expectation::Success(SuccessExpectation {
        config: Some(config),
        ..SuccessExpectation::default()
    });

    let output = structured(
        r#"{"errors":[],"config":{"target":"x86_64-unknown-linux-sysv","invoke-linker":true}}"#,
        0,
    );
    assert_eq!(check(&expectation, &output), Ok(()));

    let output = structured(r#"{"errors":[],"config":{"invoke-linker":true}}"#, 0);
    assert_eq!(
        check(&expectation, &output),
        Err(r#"config.target: expected "x86_64-unknown-linux-sysv", got nothing"#.to_string())
    );
}

#[test]
fn test_text() {
    let expectation = Expectation::Text("USAGE: kantan\n".to_string());
    assert_eq!(expectation.mode(), DecodeMode::Plain);
    assert_eq!(check(&expectation, &plain("USAGE: kantan\n")), Ok(()));
    assert!(check(&expectation, &plain("usage: kantan\n")).is_err());
}

#[test]
fn test_mode_mismatch() {
    let expectation = Expectation::Text("x".to_string());
    assert_eq!(
        check(&expectation, &structured(r#"{"errors":[]}"#, 0)),
        Err("output: expected mode plain, got structured".to_string())
    );
}
