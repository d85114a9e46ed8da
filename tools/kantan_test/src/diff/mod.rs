//! Structural diff between expected and actual compiler artifacts.
//!
//! Every comparison stops at the first difference and reports it as a
//! [`Mismatch`] naming where it is, what was expected and what was found:
//!
//! ```text
//! errors[0]: expected lnr 3, got 2
//! modules[0]<module>.items[0]<func_def>.body.stmts[1]<return_stmt>.expr.ty: expected "i32", got "i64"
//! ir[0].functions[0]<main>.blocks[1]: expected label "bb1", got "bb2"
//! ```

use std::fmt;

use kantan_mi::Diagnostic;

pub mod ir;
pub mod json;

/// The first difference found by a comparison.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mismatch {
    /// Where the difference is, e.g. `errors[0]` or `ir[0].functions[1]`.
    pub path: String,
    /// Which property of the node at `path` differs, if not the node itself.
    pub field: Option<String>,
    pub expected: String,
    pub actual: String,
}

impl Mismatch {
    pub fn new(path: impl Into<String>, expected: impl fmt::Display, actual: impl fmt::Display) -> Self {
        Mismatch {
            path: path.into(),
            field: None,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub fn field(
        path: impl Into<String>,
        field: impl Into<String>,
        expected: impl fmt::Display,
        actual: impl fmt::Display,
    ) -> Self {
        Mismatch {
            field: Some(field.into()),
            ..Mismatch::new(path, expected, actual)
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(
                f,
                "{}: expected {} {}, got {}",
                self.path, field, self.expected, self.actual
            ),
            None => write!(f, "{}: expected {}, got {}", self.path, self.expected, self.actual),
        }
    }
}

impl std::error::Error for Mismatch {}

/// Knobs shared by all comparisons of a run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DiffOptions {
    /// How many levels of nested notes are compared. Notes are only compared
    /// when the actual diagnostic has any.
    pub note_depth: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        DiffOptions { note_depth: 1 }
    }
}

/// Compare diagnostics positionally: the i-th expected against the i-th
/// actual. Order is significant.
pub fn compare_diagnostics(
    expected: &[Diagnostic],
    actual: &[Diagnostic],
    options: &DiffOptions,
) -> Result<(), Mismatch> {
    compare_level("errors", expected, actual, options.note_depth)
}

fn compare_level(
    path: &str,
    expected: &[Diagnostic],
    actual: &[Diagnostic],
    note_depth: usize,
) -> Result<(), Mismatch> {
    if expected.len() != actual.len() {
        return Err(Mismatch::field(path, "count", expected.len(), actual.len()));
    }

    for (i, (e, a)) in expected.iter().zip(actual).enumerate() {
        let here = format!("{path}[{i}]");
        compare_fields(&here, e, a)?;
        if note_depth > 0 && !a.notes.is_empty() {
            compare_level(&format!("{here}.notes"), &e.notes, &a.notes, note_depth - 1)?;
        }
    }
    Ok(())
}

fn compare_fields(path: &str, expected: &Diagnostic, actual: &Diagnostic) -> Result<(), Mismatch> {
    if expected.severity != actual.severity {
        return Err(Mismatch::field(path, "type", expected.severity, actual.severity));
    }
    if expected.line != actual.line {
        return Err(Mismatch::field(path, "lnr", expected.line, actual.line));
    }
    if expected.column != actual.column {
        return Err(Mismatch::field(path, "col", expected.column, actual.column));
    }
    if expected.message != actual.message {
        return Err(Mismatch::field(
            path,
            "content",
            format_args!("{:?}", expected.message),
            format_args!("{:?}", actual.message),
        ));
    }
    if expected.file != actual.file {
        return Err(Mismatch::field(
            path,
            "file",
            format_args!("{:?}", expected.file),
            format_args!("{:?}", actual.file),
        ));
    }
    Ok(())
}

/// Compare text line by line, reporting the first line that differs.
pub fn compare_text(path: &str, expected: &str, actual: &str) -> Result<(), Mismatch> {
    if expected == actual {
        return Ok(());
    }

    let mut expected_lines = expected.lines();
    let mut actual_lines = actual.lines();
    let mut line = 1usize;
    loop {
        match (expected_lines.next(), actual_lines.next()) {
            (Some(e), Some(a)) if e == a => line += 1,
            (Some(e), Some(a)) => {
                return Err(Mismatch::new(format!("{path} line {line}"), format_args!("{e:?}"), format_args!("{a:?}")));
            }
            (Some(e), None) => {
                return Err(Mismatch::new(format!("{path} line {line}"), format_args!("{e:?}"), "end of output"));
            }
            (None, Some(a)) => {
                return Err(Mismatch::new(format!("{path} line {line}"), "end of output", format_args!("{a:?}")));
            }
            // Same lines, so only line endings or the final newline differ.
            (None, None) => {
                return Err(Mismatch::new(path, format_args!("{expected:?}"), format_args!("{actual:?}")));
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
