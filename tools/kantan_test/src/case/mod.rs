//! Test cases and the registry that holds them.
//!
//! A [`TestCase`] describes one compiler invocation and how to judge what it
//! produced. Cases are data-driven ([`FixtureCase`], loaded from a JSON
//! definition next to the source file) or hand-written types implementing
//! the trait directly; the scheduler does not care which.

use std::path::PathBuf;

use serde::{Deserialize, Deserializer};

use kantan_mi::{DecodeMode, Decoded};

use crate::diff::{DiffOptions, Mismatch};

mod expectation;
mod fixture;

pub use expectation::{Expectation, IrSnapshot, SuccessExpectation};
pub use fixture::{FixtureCase, FixtureError, DEFAULT_OPTIONS, SOURCE_EXTENSION};

/// One unit of the test suite.
///
/// Implementations are shared between workers and must not rely on any
/// state another case could touch.
pub trait TestCase: Send + Sync {
    /// Unique identifier used in reports.
    fn name(&self) -> &str;

    /// How the compiler's stdout is decoded.
    fn mode(&self) -> DecodeMode {
        DecodeMode::Structured
    }

    /// Compiler options, passed before the input files.
    fn options(&self) -> Vec<String>;

    fn input_files(&self) -> Vec<PathBuf>;

    /// Extension-less path the unit's side files (leak reports) derive from.
    fn report_base(&self) -> PathBuf;

    /// `None` means the case runs everywhere.
    fn precondition(&self) -> Option<&Precondition> {
        None
    }

    /// Judge the decoded output.
    fn evaluate(&self, output: &Decoded, options: &DiffOptions) -> Result<(), Mismatch>;
}

/// The set of cases for one run, in registration order.
#[derive(Default)]
pub struct Registry {
    cases: Vec<Box<dyn TestCase>>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    pub fn register(&mut self, case: impl TestCase + 'static) {
        self.cases.push(Box::new(case));
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn cases(&self) -> &[Box<dyn TestCase>] {
        &self.cases
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cases.iter().map(|case| case.name())
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Platform requirements. A case whose requirements are not met is skipped,
/// not failed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Precondition {
    /// Accepted operating systems, e.g. `linux` or `macos`.
    #[serde(default, deserialize_with = "one_or_many")]
    pub os: Vec<String>,
    /// Accepted CPU architectures, e.g. `x86_64`.
    #[serde(default, deserialize_with = "one_or_many")]
    pub arch: Vec<String>,
}

impl Precondition {
    pub fn os(os: impl Into<String>) -> Self {
        Precondition {
            os: vec![os.into()],
            arch: Vec::new(),
        }
    }

    /// Check against the platform the runner was built for. `Err` carries
    /// the skip reason.
    pub fn check(&self) -> Result<(), String> {
        self.check_on(std::env::consts::OS, std::env::consts::ARCH)
    }

    pub fn check_on(&self, os: &str, arch: &str) -> Result<(), String> {
        if !self.os.is_empty() && !self.os.iter().any(|wanted| os_matches(wanted, os)) {
            return Err(format!("requires {}", self.os.join(" or ")));
        }
        if !self.arch.is_empty() && !self.arch.iter().any(|wanted| wanted.eq_ignore_ascii_case(arch)) {
            return Err(format!("requires {}", self.arch.join(" or ")));
        }
        Ok(())
    }
}

fn os_matches(wanted: &str, current: &str) -> bool {
    wanted.eq_ignore_ascii_case(current)
        || (wanted.eq_ignore_ascii_case("darwin") && current == "macos")
}

fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}
