//! The ignore list (`kantan-test-ignore` at the test root).
//!
//! Format:
//! - Lines starting with `#` are comments
//! - Blank lines are ignored
//! - Anything else names a unit, either by file stem (`basic-blocks`) or by
//!   its id relative to the root (`ir/basic-blocks`)

use std::io;
use std::path::Path;

use rustc_hash::FxHashSet;

/// Name of the ignore file looked up at the test root.
pub const IGNORE_FILE: &str = "kantan-test-ignore";

/// Units excluded from the run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IgnoreList {
    entries: FxHashSet<String>,
}

impl IgnoreList {
    /// Load `<root>/kantan-test-ignore`. A missing file is an empty list.
    pub fn load(root: &Path) -> io::Result<Self> {
        match std::fs::read_to_string(root.join(IGNORE_FILE)) {
            Ok(content) => Ok(Self::parse(&content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    pub fn parse(content: &str) -> Self {
        let entries = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();
        IgnoreList { entries }
    }

    /// Whether the unit with this `/`-separated id is ignored.
    pub fn contains(&self, id: &str) -> bool {
        let stem = id.rsplit('/').next().unwrap_or(id);
        self.entries.contains(id) || self.entries.contains(stem)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
