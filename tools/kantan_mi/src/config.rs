//! Compiler configuration dump (`--dump-config`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The resolved compiler configuration, as a string-keyed JSON object.
///
/// Only the handful of keys the runner inspects get typed getters; the rest
/// is reachable through [`CompilerConfig::get`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompilerConfig(Map<String, Value>);

impl CompilerConfig {
    pub fn new(map: Map<String, Value>) -> Self {
        CompilerConfig(map)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Normalized target triple, e.g. `x86_64-unknown-linux-sysv`.
    pub fn target(&self) -> Option<&str> {
        self.get("target").and_then(Value::as_str)
    }

    pub fn invoke_linker(&self) -> Option<bool> {
        self.get("invoke-linker").and_then(Value::as_bool)
    }

    /// `exe`, `obj` or `asm`.
    pub fn output_kind(&self) -> Option<&str> {
        self.get("output-kind").and_then(Value::as_str)
    }

    pub fn error_output_format(&self) -> Option<&str> {
        self.get("error-output-format").and_then(Value::as_str)
    }
}
