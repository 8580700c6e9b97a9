use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use inventoryd_config::merge_field;
use inventoryd_config::merge_map;
use inventoryd_config::Diagnostic;
use inventoryd_config::Located;
use inventoryd_config::SourceInfo;
use serde::Deserialize;

use super::LogLevel;
use super::StorageBackend;

/// One config file as written, before merging and validation.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    #[serde(default)]
    pub logging: PartialLoggingConfig,
    #[serde(default)]
    pub api: PartialApiConfig,
    #[serde(default)]
    pub storage: PartialStorageConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialLoggingConfig {
    pub level: Option<Located<LogLevel>>,
    #[serde(default)]
    pub overrides: HashMap<String, Located<LogLevel>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialApiConfig {
    pub listen: Option<Located<String>>,
    pub port: Option<Located<u16>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialStorageConfig {
    pub backend: Option<Located<StorageBackend>>,
    pub path: Option<Located<PathBuf>>,
}

fn attach<T>(value: &mut Option<Located<T>>, source: &Arc<SourceInfo>) {
    if let Some(v) = value {
        v.attach_source(source);
    }
}

impl inventoryd_config::PartialConfig for PartialConfig {
    fn attach_source(&mut self, source: &Arc<SourceInfo>) {
        attach(&mut self.logging.level, source);
        for level in self.logging.overrides.values_mut() {
            level.attach_source(source);
        }
        attach(&mut self.api.listen, source);
        attach(&mut self.api.port, source);
        attach(&mut self.storage.backend, source);
        attach(&mut self.storage.path, source);
    }

    fn merge_from(&mut self, other: Self, diagnostics: &mut Vec<Diagnostic>) {
        merge_field(
            "logging.level",
            &mut self.logging.level,
            other.logging.level,
            diagnostics,
        );
        merge_map(
            "logging.overrides",
            &mut self.logging.overrides,
            other.logging.overrides,
            diagnostics,
        );
        merge_field("api.listen", &mut self.api.listen, other.api.listen, diagnostics);
        merge_field("api.port", &mut self.api.port, other.api.port, diagnostics);
        merge_field(
            "storage.backend",
            &mut self.storage.backend,
            other.storage.backend,
            diagnostics,
        );
        merge_field("storage.path", &mut self.storage.path, other.storage.path, diagnostics);
    }

    fn is_empty(&self) -> bool {
        self.logging.level.is_none()
            && self.logging.overrides.is_empty()
            && self.api.listen.is_none()
            && self.api.port.is_none()
            && self.storage.backend.is_none()
            && self.storage.path.is_none()
    }
}
