//! LoggingBlueprint - Config Loader output
//!
//! Describes the whole logging setup: output toggles, capture engine, and the
//! sinks assembled into the process-wide fan-out.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use validator::Validate;

use crate::globals;

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete logging blueprint
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct LoggingBlueprint {
    /// Config version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Process-wide output toggles
    #[serde(default)]
    pub output: OutputConfig,

    /// Capture engine settings
    #[serde(default)]
    #[validate(nested)]
    pub capture: CaptureConfig,

    /// Sinks, in fan-out order
    #[serde(default)]
    #[validate(nested)]
    pub sinks: Vec<SinkConfig>,
}

/// Process-wide output toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Flush the stream after every non-error print
    #[serde(default)]
    pub flush_stdout_on_print: bool,

    /// Emit non-error messages
    #[serde(default = "default_true")]
    pub print_line_enabled: bool,

    /// Emit error messages
    #[serde(default = "default_true")]
    pub print_error_enabled: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            flush_stdout_on_print: false,
            print_line_enabled: true,
            print_error_enabled: true,
        }
    }
}

impl OutputConfig {
    /// Install these toggles as the process-wide settings
    pub fn apply(&self) {
        globals::set_flush_stdout_on_print(self.flush_stdout_on_print);
        globals::set_print_line_enabled(self.print_line_enabled);
        globals::set_print_error_enabled(self.print_error_enabled);
    }
}

fn default_true() -> bool {
    true
}

/// Capture engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CaptureConfig {
    /// Whether the capture engine is created at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Buffer unconditionally while the frame clock reads `<= warmup_frames`
    #[serde(default)]
    #[validate(range(max = 1000000))]
    pub warmup_frames: Option<u64>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            warmup_frames: None,
        }
    }
}

/// Sink output configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SinkConfig {
    /// Sink name
    #[validate(length(min = 1))]
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Type-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl SinkConfig {
    pub fn new(name: impl Into<String>, sink_type: SinkType) -> Self {
        Self {
            name: name.into(),
            sink_type,
            params: HashMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// stdout / stderr
    Stdout,
    /// File with timestamped backups
    RotatingFile,
    /// The capture engine
    Capture,
}

/// Default retained backups for a rotating file
pub const DEFAULT_MAX_FILES: i32 = 10;

/// Default rotating file location
pub const DEFAULT_LOG_PATH: &str = "logs/app.log";

/// Rotating file parameters, parsed from `SinkConfig::params`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotatingFileParams {
    pub base_path: PathBuf,
    /// `<= 0` disables rotation
    pub max_files: i32,
}

impl RotatingFileParams {
    /// Parse `base_path` / `max_files`, falling back to defaults when absent
    ///
    /// # Errors
    /// Returns a validation error when `max_files` is not an integer or
    /// `base_path` is empty.
    pub fn from_params(
        params: &HashMap<String, String>,
    ) -> Result<Self, crate::ContractError> {
        let base_path = match params.get("base_path") {
            Some(path) if path.trim().is_empty() => {
                return Err(crate::ContractError::config_validation(
                    "params.base_path",
                    "base_path must not be empty",
                ));
            }
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_LOG_PATH),
        };

        let max_files = match params.get("max_files") {
            Some(raw) => raw.trim().parse::<i32>().map_err(|e| {
                crate::ContractError::config_validation(
                    "params.max_files",
                    format!("expected an integer, got '{raw}': {e}"),
                )
            })?,
            None => DEFAULT_MAX_FILES,
        };

        Ok(Self {
            base_path,
            max_files,
        })
    }
}
