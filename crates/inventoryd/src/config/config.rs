use std::collections::HashMap;
use std::net::IpAddr;
use std::net::Ipv4Addr;
use std::path::PathBuf;

use inventoryd_config::Diagnostic;
use inventoryd_config::Diagnostics;
use inventoryd_config::TryFromPartial;
use inventoryd_config::Validate;
use inventoryd_config::ValidationError;
use serde::Deserialize;
use tracing_subscriber::filter::LevelFilter;

use super::partial::PartialConfig;

pub const DEFAULT_PORT: u16 = 8565;

#[derive(Debug, Default, Clone)]
pub struct Config {
    pub logging: LoggingConfig,
    pub api: ApiConfig,
    pub storage: StorageConfig,
}

// Deserialize is needed because LogLevel appears as a Located<_> leaf in PartialConfig
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct LoggingConfig {
    /// Level for every target without an override
    pub level: LogLevel,

    /// Per-target levels, keyed by module path (e.g. "inventoryd::api")
    pub overrides: HashMap<String, LogLevel>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub listen: IpAddr,
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Memory,
    JsonFile,
}

/// Where registered devices are kept.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    #[default]
    Memory,
    JsonFile {
        path: PathBuf,
    },
}

impl Config {
    /// Load, merge and validate one or more TOML files.
    ///
    /// Files are merged in order with first-wins semantics; a field set in two
    /// files is an error. On success the returned diagnostics hold warnings
    /// only.
    pub fn from_files(paths: &[PathBuf]) -> Result<(Self, Diagnostics), Diagnostics> {
        let (partial, diagnostics) = inventoryd_config::load_files::<PartialConfig>(paths)?;
        Self::from_partial(partial, diagnostics)
    }

    pub fn from_partial(
        partial: PartialConfig,
        diagnostics: Vec<Diagnostic>,
    ) -> Result<(Self, Diagnostics), Diagnostics> {
        inventoryd_config::finish(partial, diagnostics)
    }
}

impl TryFromPartial for Config {
    type Partial = PartialConfig;

    fn try_from_partial(partial: PartialConfig) -> Result<Self, Vec<Diagnostic>> {
        let mut errors: Vec<Diagnostic> = Vec::new();

        let logging = LoggingConfig {
            level: partial
                .logging
                .level
                .map(|l| l.into_inner())
                .unwrap_or_default(),
            overrides: partial
                .logging
                .overrides
                .into_iter()
                .map(|(target, level)| (target, level.into_inner()))
                .collect(),
        };

        let mut api = ApiConfig::default();
        if let Some(listen) = partial.api.listen {
            match listen.parse::<IpAddr>() {
                Ok(addr) => api.listen = addr,
                Err(_) => errors.push(
                    listen
                        .error(
                            "api.listen",
                            format!("'{}' is not an IP address", listen.get_ref()),
                        )
                        .into(),
                ),
            }
        }
        if let Some(port) = partial.api.port {
            if *port == 0 {
                errors.push(port.error("api.port", "port must be non-zero").into());
            } else {
                api.port = port.into_inner();
            }
        }

        let storage = match (partial.storage.backend, partial.storage.path) {
            (Some(backend), Some(path)) if *backend == StorageBackend::JsonFile => {
                StorageConfig::JsonFile {
                    path: path.into_inner(),
                }
            }
            (Some(backend), None) if *backend == StorageBackend::JsonFile => {
                errors.push(
                    backend
                        .error(
                            "storage.path",
                            "path is required when backend is \"json_file\"",
                        )
                        .into(),
                );
                StorageConfig::Memory
            }
            (_, Some(path)) => {
                errors.push(
                    path.error(
                        "storage.path",
                        "path is only used when backend is \"json_file\"",
                    )
                    .into(),
                );
                StorageConfig::Memory
            }
            (_, None) => StorageConfig::Memory,
        };

        if errors.is_empty() {
            Ok(Config {
                logging,
                api,
                storage,
            })
        } else {
            Err(errors)
        }
    }
}

impl Validate for Config {
    fn validate(&self) -> Vec<Diagnostic> {
        self.logging
            .overrides
            .keys()
            .filter(|target| target.trim().is_empty())
            .map(|_| {
                Diagnostic::from(ValidationError {
                    field_path: "logging.overrides".to_string(),
                    message: "override target must not be empty".to_string(),
                    span: None,
                    source: None,
                })
            })
            .collect()
    }
}
