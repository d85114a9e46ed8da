//! What a case expects the compiler to produce.

use serde::Deserialize;
use serde_json::{Map, Value};

use kantan_mi::{CompiledUnit, DecodeMode, Decoded, Diagnostic, Output};

use crate::diff::ir::diff_ir;
use crate::diff::json::{diff_json, render};
use crate::diff::{compare_diagnostics, compare_text, DiffOptions, Mismatch};

/// Expected result of one invocation.
#[derive(Clone, Debug, PartialEq)]
pub enum Expectation {
    /// Clean compile, optionally with dump snapshots.
    Success(SuccessExpectation),
    /// Exactly these diagnostics, in this order.
    Errors(Vec<Diagnostic>),
    /// Plain-text stdout, compared verbatim.
    Text(String),
}

/// A clean compile: exit code 0, no diagnostics, and matching snapshots
/// for every dump that is given.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SuccessExpectation {
    /// The `modules` array, compared as a JSON tree.
    pub modules: Option<Value>,
    pub ir: Option<IrSnapshot>,
    /// Only the listed keys are compared.
    pub config: Option<Map<String, Value>>,
}

/// An expected `ir` section: the typed units drive the walk, the raw JSON
/// catches anything the typed layer does not model.
#[derive(Clone, Debug, PartialEq)]
pub struct IrSnapshot {
    pub units: Vec<CompiledUnit>,
    pub raw: Value,
}

impl IrSnapshot {
    pub fn from_value(raw: Value) -> Result<Self, serde_json::Error> {
        let units = Vec::<CompiledUnit>::deserialize(&raw)?;
        Ok(IrSnapshot { units, raw })
    }
}

impl Expectation {
    pub fn mode(&self) -> DecodeMode {
        match self {
            Expectation::Text(_) => DecodeMode::Plain,
            Expectation::Success(_) | Expectation::Errors(_) => DecodeMode::Structured,
        }
    }

    pub fn check(&self, output: &Decoded, options: &DiffOptions) -> Result<(), Mismatch> {
        match (self, output) {
            (Expectation::Success(expected), Decoded::Structured(actual)) => expected.check(actual),
            (Expectation::Errors(expected), Decoded::Structured(actual)) => {
                compare_diagnostics(expected, &actual.diagnostics, options)
            }
            (Expectation::Text(expected), Decoded::Plain(actual)) => {
                compare_text("stdout", expected, &actual.text)
            }
            (_, actual) => Err(Mismatch::field(
                "output",
                "mode",
                mode_name(self.mode()),
                mode_name(actual.mode()),
            )),
        }
    }
}

impl SuccessExpectation {
    pub fn check(&self, output: &Output) -> Result<(), Mismatch> {
        if let Some(first) = output.diagnostics.first() {
            return Err(Mismatch::field(
                "errors",
                "count",
                0,
                format_args!("{} ({first})", output.diagnostics.len()),
            ));
        }
        if output.exit_code != Some(0) {
            let actual = output
                .exit_code
                .map_or_else(|| "no exit code".to_string(), |code| code.to_string());
            return Err(Mismatch::field("process", "exit code", 0, actual));
        }

        if let Some(expected) = &self.modules {
            match output.section("modules") {
                Some(actual) => diff_json("modules", expected, actual)?,
                None => return Err(Mismatch::new("modules", "an AST dump", "nothing")),
            }
        }

        if let Some(expected) = &self.ir {
            let (Some(units), Some(raw)) = (&output.ir, output.section("ir")) else {
                return Err(Mismatch::new("ir", "an IR dump", "nothing"));
            };
            diff_ir(&expected.units, units)?;
            diff_json("ir", &expected.raw, raw)?;
        }

        if let Some(expected) = &self.config {
            for (key, e_value) in expected {
                let path = format!("config.{key}");
                match output.config.as_ref().and_then(|config| config.get(key)) {
                    Some(a_value) => diff_json(&path, e_value, a_value)?,
                    None => return Err(Mismatch::new(path, render(e_value), "nothing")),
                }
            }
        }
        Ok(())
    }
}

fn mode_name(mode: DecodeMode) -> &'static str {
    match mode {
        DecodeMode::Structured => "structured",
        DecodeMode::Plain => "plain",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
