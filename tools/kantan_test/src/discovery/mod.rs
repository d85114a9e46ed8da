//! Test discovery.
//!
//! Every `*.json` file under the test root is a test definition; the unit's
//! id is its path relative to the root, without extension, with `/`
//! separators (`ir/basic-blocks`). Hidden entries and `target` directories
//! are skipped, and units are registered sorted by id.
//!
//! A `*.json` file only counts as a definition when its `<stem>.kan` source
//! sits next to it or it lists its inputs under `files`. Other JSON files
//! (a `text_file` target, say) are data and are left alone.
//!
//! Unlike unit failures, anything that goes wrong here stops the run: a
//! definition that cannot be loaded would otherwise silently shrink the
//! suite.

use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::case::{FixtureCase, FixtureError, Registry, SOURCE_EXTENSION};

mod ignore;

pub use ignore::{IgnoreList, IGNORE_FILE};

/// Extension of test definition files.
pub const DEFINITION_EXTENSION: &str = "json";

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("test directory '{}' is not accessible: {source}", path.display())]
    Root { path: PathBuf, source: io::Error },
    #[error("could not read '{}': {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Fixture(#[from] FixtureError),
}

/// Discover and load every unit under `root`.
pub fn discover(root: &Path) -> Result<Registry, DiscoveryError> {
    let root = std::fs::canonicalize(root).map_err(|source| DiscoveryError::Root {
        path: root.to_path_buf(),
        source,
    })?;
    let ignored = IgnoreList::load(&root).map_err(|source| DiscoveryError::Io {
        path: root.join(IGNORE_FILE),
        source,
    })?;

    let mut definitions = Vec::new();
    collect_definitions(&root, &mut definitions)?;

    let mut units: Vec<(String, PathBuf)> = definitions
        .into_iter()
        .map(|path| (unit_id(&root, &path), path))
        .collect();
    units.sort();

    let mut registry = Registry::new();
    for (id, path) in units {
        if ignored.contains(&id) {
            tracing::debug!(%id, "ignored");
            continue;
        }
        if !is_definition(&path)? {
            tracing::debug!(%id, "no source and no `files`, not a definition");
            continue;
        }
        registry.register(FixtureCase::load(id, &path)?);
    }

    tracing::debug!(root = %root.display(), units = registry.len(), ignored = ignored.len(), "discovery finished");
    Ok(registry)
}

fn collect_definitions(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), DiscoveryError> {
    let io_error = |source| DiscoveryError::Io {
        path: dir.to_path_buf(),
        source,
    };

    for entry in std::fs::read_dir(dir).map_err(io_error)? {
        let entry = entry.map_err(io_error)?;
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();

        if name.starts_with('.') {
            continue;
        }

        if entry.file_type().map_err(io_error)?.is_dir() {
            if name == "target" {
                continue;
            }
            collect_definitions(&path, out)?;
        } else if path
            .extension()
            .is_some_and(|extension| extension == DEFINITION_EXTENSION)
        {
            out.push(path);
        }
    }
    Ok(())
}

fn is_definition(path: &Path) -> Result<bool, DiscoveryError> {
    if path.with_extension(SOURCE_EXTENSION).is_file() {
        return Ok(true);
    }
    let text = std::fs::read_to_string(path).map_err(|source| DiscoveryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str::<Value>(&text).is_ok_and(|value| value.get("files").is_some()))
}

/// `root/ir/basic-blocks.json` -> `ir/basic-blocks`.
pub fn unit_id(root: &Path, definition: &Path) -> String {
    let relative = definition.strip_prefix(root).unwrap_or(definition);
    let relative = relative.with_extension("");
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
