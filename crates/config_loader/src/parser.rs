//! Configuration parsing
//!
//! TOML is the primary format; JSON is accepted as well.

use contracts::{ContractError, LoggingBlueprint};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Infer the format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

pub fn parse_toml(content: &str) -> Result<LoggingBlueprint, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

pub fn parse_json(content: &str) -> Result<LoggingBlueprint, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

pub fn parse(content: &str, format: ConfigFormat) -> Result<LoggingBlueprint, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::SinkType;

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
[[sinks]]
name = "console"
sink_type = "stdout"

[[sinks]]
name = "file"
sink_type = "rotating_file"
[sinks.params]
base_path = "logs/engine.log"
max_files = "3"
"#;
        let bp = parse_toml(content).unwrap();
        assert_eq!(bp.sinks.len(), 2);
        assert_eq!(bp.sinks[1].sink_type, SinkType::RotatingFile);
        assert_eq!(bp.sinks[1].params["max_files"], "3");
        assert!(bp.capture.enabled);
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "output": { "flush_stdout_on_print": true },
            "capture": { "warmup_frames": 2 },
            "sinks": [{ "name": "capture", "sink_type": "capture" }]
        }"#;
        let bp = parse_json(content).unwrap();
        assert!(bp.output.flush_stdout_on_print);
        assert!(bp.output.print_error_enabled);
        assert_eq!(bp.capture.warmup_frames, Some(2));
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let err = parse_toml("invalid toml [[[").unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_unknown_sink_type_rejected() {
        let content = r#"
[[sinks]]
name = "net"
sink_type = "syslog"
"#;
        assert!(parse_toml(content).is_err());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_extension("toml"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("TOML"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("json"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
