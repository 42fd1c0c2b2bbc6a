//! Logging configuration
//!
//! Every struct deserializes with `#[serde(default)]`, so a JSON config only
//! needs the fields it changes.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing_appender::rolling::Rotation;

use crate::error::LoggingResult;

/// Top-level logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Level applied when `RUST_LOG` is unset
    pub level: String,
    pub console: ConsoleConfig,
    /// JSONL file sink; `None` disables file output
    pub file: Option<FileConfig>,
    /// Field layout shared by every JSONL sink
    pub jsonl: JsonlConfig,
    pub filters: FilterConfig,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console: ConsoleConfig::default(),
            file: None,
            jsonl: JsonlConfig::default(),
            filters: FilterConfig::default(),
        }
    }
}

impl LogConfig {
    /// Debug level, coloured human-readable console
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            console: ConsoleConfig {
                enabled: true,
                format: ConsoleFormat::Pretty,
                ansi: true,
            },
            ..Self::default()
        }
    }

    /// Info level, daily-rotated JSONL files under `log_dir`, no console
    pub fn production(log_dir: PathBuf) -> Self {
        Self {
            console: ConsoleConfig {
                enabled: false,
                ..ConsoleConfig::default()
            },
            file: Some(FileConfig {
                directory: log_dir,
                max_files: Some(30),
                ..FileConfig::default()
            }),
            ..Self::default()
        }
    }

    /// Warnings and above only, plain JSONL console
    pub fn testing() -> Self {
        Self {
            level: "warn".to_string(),
            ..Self::default()
        }
    }

    /// Parse a config from JSON
    pub fn from_json(json: &str) -> LoggingResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render the `EnvFilter` directives for this config
    ///
    /// The base level comes first, then `crate=off` for each silenced crate,
    /// then the per-target overrides.
    pub fn directives(&self) -> String {
        let silenced = self.filters.silence.iter().map(|krate| format!("{krate}=off"));
        let targets = self
            .filters
            .targets
            .iter()
            .map(|(target, level)| format!("{target}={level}"));

        std::iter::once(self.level.clone())
            .chain(silenced)
            .chain(targets)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// How console lines are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConsoleFormat {
    #[default]
    Json,
    Pretty,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub enabled: bool,
    pub format: ConsoleFormat,
    /// Colour codes, honoured by the pretty format only
    pub ansi: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            format: ConsoleFormat::Json,
            ansi: false,
        }
    }
}

/// JSONL file sink
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub directory: PathBuf,
    /// File names start with this prefix and end in `.log`
    pub prefix: String,
    pub rotation: RotationStrategy,
    /// Oldest rotated files beyond this count are deleted
    pub max_files: Option<usize>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
            prefix: "coil".to_string(),
            rotation: RotationStrategy::Daily,
            max_files: Some(14),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RotationStrategy {
    #[default]
    Daily,
    Hourly,
    /// One file, truncated when the subscriber is built
    Never,
}

impl RotationStrategy {
    /// The appender rotation, or `None` for a single plain file
    pub fn rotation(self) -> Option<Rotation> {
        match self {
            RotationStrategy::Daily => Some(Rotation::DAILY),
            RotationStrategy::Hourly => Some(Rotation::HOURLY),
            RotationStrategy::Never => None,
        }
    }
}

/// Which fields JSONL lines carry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonlConfig {
    /// Event fields at the top level instead of under `fields`
    pub flatten_events: bool,
    pub span_list: bool,
    pub current_span: bool,
    pub thread_info: bool,
    /// Source file and line
    pub location: bool,
}

impl Default for JsonlConfig {
    fn default() -> Self {
        Self {
            flatten_events: true,
            span_list: true,
            current_span: true,
            thread_info: false,
            location: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Crates whose events are dropped entirely
    pub silence: Vec<String>,
    /// Level overrides keyed by target, e.g. `coil_connections = "trace"`
    pub targets: BTreeMap<String, String>,
}
