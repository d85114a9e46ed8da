//! Compiler diagnostics as reported in the `errors` array.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity level of a diagnostic (`type` on the wire).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// One compiler-reported error, warning or note.
///
/// Field names follow the compiler's wire format (`lnr`, `col`, `content`)
/// on the JSON side only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    #[serde(rename = "type")]
    pub severity: Severity,
    #[serde(rename = "lnr")]
    pub line: u32,
    #[serde(rename = "col")]
    pub column: u32,
    #[serde(rename = "content")]
    pub message: String,
    pub file: String,
    /// Attached notes. Absent on the wire means none.
    #[serde(default)]
    pub notes: Vec<Diagnostic>,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        line: u32,
        column: u32,
        message: impl Into<String>,
        file: impl Into<String>,
    ) -> Self {
        Diagnostic {
            severity,
            line,
            column,
            message: message.into(),
            file: file.into(),
            notes: Vec::new(),
        }
    }

    /// Create an error diagnostic without notes.
    pub fn error(line: u32, column: u32, message: impl Into<String>, file: impl Into<String>) -> Self {
        Self::new(Severity::Error, line, column, message, file)
    }

    /// Create a positionless note, the shape the compiler uses for hints.
    pub fn note(message: impl Into<String>) -> Self {
        Self::new(Severity::Note, 0, 0, message, "")
    }

    /// Attach a note.
    #[must_use]
    pub fn with_note(mut self, note: Diagnostic) -> Self {
        self.notes.push(note);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}: {}",
            self.file, self.line, self.column, self.severity, self.message
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
