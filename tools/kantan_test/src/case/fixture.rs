//! Data-driven cases: a JSON definition next to the source file.
//!
//! `tests/semantics/undefined-var.json` describes how to compile
//! `tests/semantics/undefined-var.kan` and what to expect:
//!
//! ```json
//! {
//!   "options": ["--mi"],
//!   "expect": {
//!     "errors": [
//!       { "lnr": 2, "col": 5, "content": "No identifier 'x' in scope",
//!         "notes": [{ "content": "did you mean 'y'?" }] }
//!     ]
//!   }
//! }
//! ```
//!
//! Every key but `expect` is optional. `expect` holds exactly one of
//! `success` (with optional `modules`, `ir` and `config` snapshots), `errors`,
//! `text` or `text_file`.
//!
//! Strings in expectations may use two placeholders, resolved at load time:
//! `$file` is the absolute path of the default source file and `$dir/...` a
//! path relative to the definition's directory.

use std::io;
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};

use kantan_mi::{DecodeMode, Decoded, Diagnostic, Severity};

use super::expectation::{Expectation, IrSnapshot, SuccessExpectation};
use super::{Precondition, TestCase};
use crate::diff::{DiffOptions, Mismatch};

/// Extension of Kantan source files.
pub const SOURCE_EXTENSION: &str = "kan";

/// Options used when a definition does not list any.
pub const DEFAULT_OPTIONS: &[&str] = &["--mi"];

/// A test definition that could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("could not read '{}': {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid test definition '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid test definition '{}': {message}", path.display())]
    Invalid { path: PathBuf, message: String },
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Definition {
    #[serde(default)]
    options: Option<Vec<String>>,
    #[serde(default)]
    files: Option<Vec<String>>,
    #[serde(default)]
    precondition: Option<Precondition>,
    expect: ExpectDefinition,
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
enum ExpectDefinition {
    Success(SuccessDefinition),
    Errors(Vec<DiagnosticDefinition>),
    Text(String),
    TextFile(String),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SuccessDefinition {
    #[serde(default)]
    modules: Option<Value>,
    #[serde(default)]
    ir: Option<Value>,
    #[serde(default)]
    config: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DiagnosticDefinition {
    #[serde(rename = "type", default)]
    severity: Option<Severity>,
    #[serde(default)]
    lnr: u32,
    #[serde(default)]
    col: u32,
    content: String,
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    notes: Vec<DiagnosticDefinition>,
}

/// Placeholder values for one definition.
struct Placeholders {
    file: PathBuf,
    dir: PathBuf,
}

impl Placeholders {
    fn expand(&self, text: &str) -> String {
        if text == "$file" {
            return self.file.display().to_string();
        }
        if text == "$dir" {
            return self.dir.display().to_string();
        }
        match text.strip_prefix("$dir/") {
            Some(relative) => normalize(&self.dir.join(relative)).display().to_string(),
            None => text.to_string(),
        }
    }

    fn expand_value(&self, value: &mut Value) {
        match value {
            Value::String(text) => *text = self.expand(text),
            Value::Array(items) => items.iter_mut().for_each(|item| self.expand_value(item)),
            Value::Object(map) => map.values_mut().for_each(|item| self.expand_value(item)),
            Value::Null | Value::Bool(_) | Value::Number(_) => {}
        }
    }

    fn diagnostic(&self, definition: DiagnosticDefinition, is_note: bool) -> Diagnostic {
        let severity = definition
            .severity
            .unwrap_or(if is_note { Severity::Note } else { Severity::Error });
        let file = match definition.file {
            Some(file) => self.expand(&file),
            None if is_note => String::new(),
            None => self.file.display().to_string(),
        };
        let mut diagnostic = Diagnostic::new(
            severity,
            definition.lnr,
            definition.col,
            self.expand(&definition.content),
            file,
        );
        diagnostic.notes = definition
            .notes
            .into_iter()
            .map(|note| self.diagnostic(note, true))
            .collect();
        diagnostic
    }
}

/// A case loaded from a JSON definition.
#[derive(Clone, Debug, PartialEq)]
pub struct FixtureCase {
    name: String,
    definition: PathBuf,
    base: PathBuf,
    options: Vec<String>,
    inputs: Vec<PathBuf>,
    precondition: Option<Precondition>,
    expectation: Expectation,
}

impl FixtureCase {
    /// Load the definition at `definition`, an absolute path.
    pub fn load(name: impl Into<String>, definition: &Path) -> Result<Self, FixtureError> {
        let text = std::fs::read_to_string(definition).map_err(|source| FixtureError::Io {
            path: definition.to_path_buf(),
            source,
        })?;
        Self::parse(name, definition, &text)
    }

    /// Build a case from definition text. Relative paths resolve against
    /// the directory of `definition`.
    pub fn parse(name: impl Into<String>, definition: &Path, text: &str) -> Result<Self, FixtureError> {
        let parsed: Definition = serde_json::from_str(text).map_err(|source| FixtureError::Parse {
            path: definition.to_path_buf(),
            source,
        })?;

        let dir = definition.parent().unwrap_or(Path::new("")).to_path_buf();
        let base = definition.with_extension("");
        let placeholders = Placeholders {
            file: source_path(&base),
            dir,
        };

        let options = parsed
            .options
            .unwrap_or_else(|| DEFAULT_OPTIONS.iter().map(ToString::to_string).collect());
        let inputs = match parsed.files {
            Some(files) => files
                .iter()
                .map(|file| normalize(&placeholders.dir.join(placeholders.expand(file))))
                .collect(),
            None => vec![placeholders.file.clone()],
        };
        let expectation = Self::build_expectation(parsed.expect, &placeholders, definition)?;

        Ok(FixtureCase {
            name: name.into(),
            definition: definition.to_path_buf(),
            base,
            options,
            inputs,
            precondition: parsed.precondition,
            expectation,
        })
    }

    fn build_expectation(
        expect: ExpectDefinition,
        placeholders: &Placeholders,
        definition: &Path,
    ) -> Result<Expectation, FixtureError> {
        Ok(match expect {
            ExpectDefinition::Errors(errors) => Expectation::Errors(
                errors
                    .into_iter()
                    .map(|error| placeholders.diagnostic(error, false))
                    .collect(),
            ),
            ExpectDefinition::Text(text) => Expectation::Text(text),
            ExpectDefinition::TextFile(file) => {
                let path = normalize(&placeholders.dir.join(placeholders.expand(&file)));
                let text = std::fs::read_to_string(&path)
                    .map_err(|source| FixtureError::Io { path, source })?;
                Expectation::Text(text)
            }
            ExpectDefinition::Success(success) => {
                let mut modules = success.modules;
                if let Some(modules) = &mut modules {
                    placeholders.expand_value(modules);
                }
                let ir = match success.ir {
                    Some(mut raw) => {
                        placeholders.expand_value(&mut raw);
                        let snapshot = IrSnapshot::from_value(raw).map_err(|e| FixtureError::Invalid {
                            path: definition.to_path_buf(),
                            message: format!("expected `ir` does not decode: {e}"),
                        })?;
                        Some(snapshot)
                    }
                    None => None,
                };
                let mut config = success.config;
                if let Some(config) = &mut config {
                    config.values_mut().for_each(|value| placeholders.expand_value(value));
                }
                Expectation::Success(SuccessExpectation { modules, ir, config })
            }
        })
    }

    pub fn definition(&self) -> &Path {
        &self.definition
    }

    /// The source file compiled when the definition lists no `files`.
    pub fn default_source(&self) -> PathBuf {
        source_path(&self.base)
    }

    pub fn expectation(&self) -> &Expectation {
        &self.expectation
    }
}

impl TestCase for FixtureCase {
    fn name(&self) -> &str {
        &self.name
    }

    fn mode(&self) -> DecodeMode {
        self.expectation.mode()
    }

    fn options(&self) -> Vec<String> {
        self.options.clone()
    }

    fn input_files(&self) -> Vec<PathBuf> {
        self.inputs.clone()
    }

    fn report_base(&self) -> PathBuf {
        self.base.clone()
    }

    fn precondition(&self) -> Option<&Precondition> {
        self.precondition.as_ref()
    }

    fn evaluate(&self, output: &Decoded, options: &DiffOptions) -> Result<(), Mismatch> {
        self.expectation.check(output, options)
    }
}

/// `<base>.kan`, keeping any dots already in the base name.
fn source_path(base: &Path) -> PathBuf {
    let mut path = base.as_os_str().to_owned();
    path.push(".");
    path.push(SOURCE_EXTENSION);
    PathBuf::from(path)
}

/// Resolve `.` and `..` without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
