//! Directory loader for policy definition files.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::{CoreError, CoreResult, PolicyDefinition};

/// File extension a definition file must carry.
pub const DEFINITION_EXTENSION: &str = "json";

/// A definition file that could not be loaded.
///
/// Load failures are per-item recoverable: the file is excluded from the
/// defined set and the run continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    /// File name (not the full path) of the offending file.
    pub file: String,
    /// Human-readable failure detail.
    pub detail: String,
}

/// Result of loading a definitions directory.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    /// Successfully parsed definitions, keyed by display name.
    pub defined: BTreeMap<String, PolicyDefinition>,
    /// Files that failed to parse or collided on a display name, in
    /// enumeration order.
    pub failures: Vec<LoadFailure>,
}

/// Load every `.json` definition file from `dir`.
///
/// Files are processed in lexicographic filename order so duplicate
/// resolution is deterministic: the first file defining a display name wins
/// and every later duplicate is recorded as a failure naming both files.
///
/// # Errors
/// Returns [`CoreError::ReadDir`] when the directory itself cannot be
/// enumerated. Per-file problems never error; they are reported through
/// [`LoadOutcome::failures`].
pub fn load_definitions(dir: &Path) -> CoreResult<LoadOutcome> {
    let entries = fs::read_dir(dir).map_err(|source| CoreError::ReadDir {
        path: dir.display().to_string(),
        source,
    })?;

    let mut paths: Vec<_> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file() && path.extension().is_some_and(|ext| ext == DEFINITION_EXTENSION)
        })
        .collect();
    paths.sort();

    let mut outcome = LoadOutcome::default();
    let mut origins: BTreeMap<String, String> = BTreeMap::new();

    for path in paths {
        let file = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(%file, error = %err, "failed to read definition file");
                outcome.failures.push(LoadFailure {
                    file,
                    detail: err.to_string(),
                });
                continue;
            }
        };

        let definition = match PolicyDefinition::from_json(&raw) {
            Ok(definition) => definition,
            Err(err) => {
                warn!(%file, error = %err, "failed to parse definition file");
                outcome.failures.push(LoadFailure {
                    file,
                    detail: err.to_string(),
                });
                continue;
            }
        };

        let name = definition.display_name.clone();
        if let Some(origin) = origins.get(&name) {
            warn!(%file, %origin, policy = %name, "duplicate display name");
            outcome.failures.push(LoadFailure {
                file,
                detail: format!("duplicate display name \"{name}\" already defined by {origin}"),
            });
            continue;
        }

        debug!(%file, policy = %name, "loaded definition");
        origins.insert(name.clone(), file);
        outcome.defined.insert(name, definition);
    }

    Ok(outcome)
}
