//! Output decoder: captured stdout to typed artifacts.
//!
//! Decoding never panics. Anything that is not a well-formed machine
//! interface document becomes a [`DecodeFault`] carrying the raw text, so
//! the caller can report it and move on.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::ast::AstNode;
use crate::config::CompilerConfig;
use crate::diagnostic::{Diagnostic, Severity};
use crate::ir::CompiledUnit;

/// How stdout of an invocation is interpreted.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DecodeMode {
    /// One JSON document (`--mi`).
    #[default]
    Structured,
    /// Opaque text, e.g. `--help` or argument errors reported before the
    /// compiler switches to JSON output.
    Plain,
}

/// A decoded `--mi` document.
#[derive(Clone, Debug, PartialEq)]
pub struct Output {
    /// The `errors` array, in emission order.
    pub diagnostics: Vec<Diagnostic>,
    pub modules: Option<Vec<AstNode>>,
    pub ir: Option<Vec<CompiledUnit>>,
    pub config: Option<CompilerConfig>,
    /// `None` when the process was not terminated by a normal exit.
    pub exit_code: Option<i32>,
    /// Captured stdout, verbatim.
    pub raw: String,
    document: Map<String, Value>,
}

impl Output {
    /// The untyped JSON of a top-level section (`errors`, `modules`, `ir`,
    /// `config`, `type-graph`, ...).
    pub fn section(&self, key: &str) -> Option<&Value> {
        self.document.get(key)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn exited_successfully(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Stdout of a plain-text invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlainOutput {
    pub text: String,
    pub exit_code: Option<i32>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Decoded {
    Structured(Output),
    Plain(PlainOutput),
}

impl Decoded {
    pub fn mode(&self) -> DecodeMode {
        match self {
            Decoded::Structured(_) => DecodeMode::Structured,
            Decoded::Plain(_) => DecodeMode::Plain,
        }
    }

    pub fn raw(&self) -> &str {
        match self {
            Decoded::Structured(output) => &output.raw,
            Decoded::Plain(plain) => &plain.text,
        }
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Decoded::Structured(output) => output.exit_code,
            Decoded::Plain(plain) => plain.exit_code,
        }
    }
}

/// Why a structured document could not be decoded.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeFaultKind {
    #[error("invalid JSON: {0}")]
    Syntax(String),
    #[error("expected a JSON object at the top level")]
    NotAnObject,
    #[error("missing `errors` array")]
    MissingErrors,
    #[error("malformed `{section}` section: {message}")]
    Section {
        section: &'static str,
        message: String,
    },
}

/// Stdout was not a valid machine-interface document.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("could not decode compiler output: {kind}")]
pub struct DecodeFault {
    pub kind: DecodeFaultKind,
    /// Captured stdout, verbatim.
    pub raw: String,
}

/// Decode captured stdout according to `mode`.
pub fn decode(raw: String, exit_code: Option<i32>, mode: DecodeMode) -> Result<Decoded, DecodeFault> {
    match mode {
        DecodeMode::Plain => Ok(Decoded::Plain(PlainOutput {
            text: raw,
            exit_code,
        })),
        DecodeMode::Structured => match decode_document(&raw) {
            Ok(parts) => Ok(Decoded::Structured(Output {
                diagnostics: parts.diagnostics,
                modules: parts.modules,
                ir: parts.ir,
                config: parts.config,
                exit_code,
                raw,
                document: parts.document,
            })),
            Err(kind) => Err(DecodeFault { kind, raw }),
        },
    }
}

struct DocumentParts {
    diagnostics: Vec<Diagnostic>,
    modules: Option<Vec<AstNode>>,
    ir: Option<Vec<CompiledUnit>>,
    config: Option<CompilerConfig>,
    document: Map<String, Value>,
}

fn decode_document(raw: &str) -> Result<DocumentParts, DecodeFaultKind> {
    let document: Value =
        serde_json::from_str(raw).map_err(|e| DecodeFaultKind::Syntax(e.to_string()))?;
    let Value::Object(document) = document else {
        return Err(DecodeFaultKind::NotAnObject);
    };

    let diagnostics = match document.get("errors") {
        Some(errors @ Value::Array(_)) => section("errors", errors)?,
        _ => return Err(DecodeFaultKind::MissingErrors),
    };

    Ok(DocumentParts {
        diagnostics,
        modules: optional_section(&document, "modules")?,
        ir: optional_section(&document, "ir")?,
        config: optional_section(&document, "config")?,
        document,
    })
}

fn section<T: DeserializeOwned>(name: &'static str, value: &Value) -> Result<T, DecodeFaultKind> {
    T::deserialize(value).map_err(|e| DecodeFaultKind::Section {
        section: name,
        message: e.to_string(),
    })
}

/// A section that is only present when its dump flag was passed. `null`
/// counts as absent.
fn optional_section<T: DeserializeOwned>(
    document: &Map<String, Value>,
    name: &'static str,
) -> Result<Option<T>, DecodeFaultKind> {
    match document.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => section(name, value).map(Some),
    }
}
