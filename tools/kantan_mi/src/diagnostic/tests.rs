use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn test_decode_wire_names() {
    let json = r#"{"type":"error","lnr":2,"col":5,"content":"No identifier 'x' in scope","file":"a.kan","notes":[]}"#;
    let diag: Diagnostic = serde_json::from_str(json).unwrap();
    assert_eq!(diag, Diagnostic::error(2, 5, "No identifier 'x' in scope", "a.kan"));
}

#[test]
fn test_notes_default_to_empty() {
    let json = r#"{"type":"warning","lnr":1,"col":1,"content":"unused","file":"a.kan"}"#;
    let diag: Diagnostic = serde_json::from_str(json).unwrap();
    assert_eq!(diag.severity, Severity::Warning);
    assert!(diag.notes.is_empty());
}

#[test]
fn test_nested_notes_keep_order() {
    let json = r#"{"type":"error","lnr":3,"col":1,"content":"mismatch","file":"a.kan",
        "notes":[{"type":"note","lnr":0,"col":0,"content":"first","file":""},
                 {"type":"note","lnr":0,"col":0,"content":"second","file":""}]}"#;
    let diag: Diagnostic = serde_json::from_str(json).unwrap();
    let messages: Vec<_> = diag.notes.iter().map(|n| n.message.as_str()).collect();
    assert_eq!(messages, ["first", "second"]);
}

#[test]
fn test_unknown_severity_is_rejected() {
    let json = r#"{"type":"fatal","lnr":1,"col":1,"content":"x","file":"a.kan"}"#;
    assert!(serde_json::from_str::<Diagnostic>(json).is_err());
}

#[test]
fn test_display() {
    let diag = Diagnostic::error(4, 2, "bad", "m.kan");
    assert_eq!(diag.to_string(), "m.kan:4:2: error: bad");
    assert_eq!(Diagnostic::note("hint").to_string(), ":0:0: note: hint");
}

proptest! {
    #[test]
    fn prop_round_trip_preserves_message_text(
        message in "\\PC*",
        line in 0u32..10_000,
        column in 0u32..500,
    ) {
        let diag = Diagnostic::error(line, column, message, "src/a.kan")
            .with_note(Diagnostic::note("tab\there \"quoted\" \\ back"));
        let encoded = serde_json::to_string(&diag).unwrap();
        let decoded: Diagnostic = serde_json::from_str(&encoded).unwrap();
        prop_assert_eq!(decoded, diag);
    }
}
