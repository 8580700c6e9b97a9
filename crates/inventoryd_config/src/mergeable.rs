use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::Diagnostic;
use crate::Diagnostics;
use crate::LoadError;
use crate::Located;
use crate::MergeError;
use crate::SourceInfo;
use crate::Warning;

/// The parsed-but-unvalidated form of a config file.
///
/// Every leaf is an `Option<Located<T>>` so that several files can be merged
/// and later errors can point back into the file that set the value.
pub trait PartialConfig: DeserializeOwned + Default {
    /// Record which file every located value came from.
    fn attach_source(&mut self, source: &Arc<SourceInfo>);

    /// Fold `other` into `self`. The value already present wins; a second
    /// definition of the same field is reported as a merge conflict.
    fn merge_from(&mut self, other: Self, diagnostics: &mut Vec<Diagnostic>);

    /// Whether the file set nothing at all.
    fn is_empty(&self) -> bool;
}

/// Read one file from disk.
pub fn read_source(path: &Path) -> Result<Arc<SourceInfo>, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|e| LoadError::Io {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    Ok(Arc::new(SourceInfo {
        file_path: path.to_path_buf(),
        content,
    }))
}

/// Parse an already-read file into its partial form.
pub fn parse_source<P: PartialConfig>(source: &Arc<SourceInfo>) -> Result<P, LoadError> {
    let mut partial: P = toml::from_str(&source.content).map_err(|e| LoadError::Parse {
        path: source.file_path.clone(),
        error: e.to_string(),
    })?;
    partial.attach_source(source);
    Ok(partial)
}

/// Load and merge `paths` in order, first definition wins.
///
/// Load failures abort immediately. Merge conflicts and empty-file warnings
/// are collected and returned alongside the merged result so the caller can
/// report them together with validation errors.
pub fn load_files<P: PartialConfig>(paths: &[PathBuf]) -> Result<(P, Vec<Diagnostic>), Diagnostics> {
    let mut merged = P::default();
    let mut diagnostics = Vec::new();

    for path in paths {
        let partial = read_source(path)
            .and_then(|source| parse_source::<P>(&source))
            .map_err(|e| Diagnostics(vec![e.into()]))?;

        if partial.is_empty() {
            diagnostics.push(Diagnostic::Warning(Warning::EmptyConfig {
                file_path: path.clone(),
            }));
            continue;
        }

        merged.merge_from(partial, &mut diagnostics);
    }

    Ok((merged, diagnostics))
}

/// First-wins merge of a single located field.
pub fn merge_field<T>(
    field_path: &str,
    current: &mut Option<Located<T>>,
    incoming: Option<Located<T>>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Some(incoming) = incoming else {
        return;
    };

    match current {
        None => *current = Some(incoming),
        Some(existing) => diagnostics.push(
            MergeError {
                field_path: field_path.to_string(),
                message: format!("'{}' is defined in more than one config file", field_path),
                conflicts: vec![
                    existing.to_conflict_location(),
                    incoming.to_conflict_location(),
                ],
            }
            .into(),
        ),
    }
}

/// Merge a table of located values key by key.
///
/// Keys from different files combine freely; only a key set twice conflicts.
pub fn merge_map<T>(
    field_path: &str,
    current: &mut HashMap<String, Located<T>>,
    incoming: HashMap<String, Located<T>>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for (key, value) in incoming {
        let mut slot = current.remove(&key);
        merge_field(
            &format!("{}.\"{}\"", field_path, key),
            &mut slot,
            Some(value),
            diagnostics,
        );
        if let Some(kept) = slot {
            current.insert(key, kept);
        }
    }
}
