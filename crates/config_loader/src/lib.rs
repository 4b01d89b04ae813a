//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Generate `LoggingBlueprint`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("logging.toml")).unwrap();
//! println!("sinks: {}", blueprint.sinks.len());
//! ```

mod parser;
mod validator;

pub use contracts::LoggingBlueprint;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;
use tracing::debug;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<LoggingBlueprint, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        let blueprint = Self::load_from_str(&content, format)?;
        debug!(path = %path.display(), sinks = blueprint.sinks.len(), "Config loaded");
        Ok(blueprint)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<LoggingBlueprint, ContractError> {
        Self::parse_and_validate(content, format)
    }

    /// Validate an already constructed blueprint
    pub fn validate(blueprint: &LoggingBlueprint) -> Result<(), ContractError> {
        validator::validate(blueprint)
    }

    /// Serialize LoggingBlueprint to TOML string
    pub fn to_toml(blueprint: &LoggingBlueprint) -> Result<String, ContractError> {
        toml::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize LoggingBlueprint to JSON string
    pub fn to_json(blueprint: &LoggingBlueprint) -> Result<String, ContractError> {
        serde_json::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<LoggingBlueprint, ContractError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }
}
