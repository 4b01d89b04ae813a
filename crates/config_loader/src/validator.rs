//! Configuration validation
//!
//! Rules:
//! - field-level constraints declared on the blueprint types
//! - sink names unique
//! - rotating_file params well formed
//! - at most one capture sink, and only when capture is enabled

use std::collections::HashSet;

use contracts::{ContractError, LoggingBlueprint, RotatingFileParams, SinkType};
use ::validator::Validate;

/// Validate a LoggingBlueprint
///
/// Returns the first error encountered.
pub fn validate(blueprint: &LoggingBlueprint) -> Result<(), ContractError> {
    validate_fields(blueprint)?;
    validate_sink_names(blueprint)?;
    validate_rotating_params(blueprint)?;
    validate_capture_sinks(blueprint)?;
    Ok(())
}

/// Derived field constraints (lengths, ranges)
fn validate_fields(blueprint: &LoggingBlueprint) -> Result<(), ContractError> {
    blueprint.validate().map_err(|errors| {
        ContractError::config_validation("blueprint", errors.to_string())
    })
}

fn validate_sink_names(blueprint: &LoggingBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{idx}].name"),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(sink.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
    }
    Ok(())
}

fn validate_rotating_params(blueprint: &LoggingBlueprint) -> Result<(), ContractError> {
    for sink in &blueprint.sinks {
        if sink.sink_type != SinkType::RotatingFile {
            continue;
        }
        RotatingFileParams::from_params(&sink.params).map_err(|e| match e {
            ContractError::ConfigValidation { field, message } => {
                ContractError::config_validation(format!("sinks[{}].{field}", sink.name), message)
            }
            other => other,
        })?;
    }
    Ok(())
}

fn validate_capture_sinks(blueprint: &LoggingBlueprint) -> Result<(), ContractError> {
    let capture_sinks: Vec<_> = blueprint
        .sinks
        .iter()
        .filter(|s| s.sink_type == SinkType::Capture)
        .collect();

    if capture_sinks.len() > 1 {
        return Err(ContractError::config_validation(
            format!("sinks[name={}]", capture_sinks[1].name),
            "at most one capture sink is allowed",
        ));
    }
    if let Some(sink) = capture_sinks.first() {
        if !blueprint.capture.enabled {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "capture sink requires capture.enabled = true",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{CaptureConfig, SinkConfig};

    fn minimal_blueprint() -> LoggingBlueprint {
        LoggingBlueprint {
            sinks: vec![
                SinkConfig::new("console", SinkType::Stdout),
                SinkConfig::new("file", SinkType::RotatingFile)
                    .with_param("base_path", "logs/app.log")
                    .with_param("max_files", "5"),
                SinkConfig::new("capture", SinkType::Capture),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&minimal_blueprint()).is_ok());
    }

    #[test]
    fn test_duplicate_sink_name() {
        let mut bp = minimal_blueprint();
        bp.sinks.push(SinkConfig::new("console", SinkType::Stdout));
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("duplicate sink name"), "got: {err}");
    }

    #[test]
    fn test_empty_sink_name() {
        let mut bp = minimal_blueprint();
        bp.sinks[0].name = String::new();
        assert!(validate(&bp).is_err());
    }

    #[test]
    fn test_bad_max_files() {
        let mut bp = minimal_blueprint();
        bp.sinks[1]
            .params
            .insert("max_files".to_string(), "lots".to_string());
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("sinks[file].params.max_files"), "got: {err}");
    }

    #[test]
    fn test_empty_base_path() {
        let mut bp = minimal_blueprint();
        bp.sinks[1]
            .params
            .insert("base_path".to_string(), "  ".to_string());
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("base_path"), "got: {err}");
    }

    #[test]
    fn test_second_capture_sink() {
        let mut bp = minimal_blueprint();
        bp.sinks.push(SinkConfig::new("capture2", SinkType::Capture));
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("at most one capture sink"), "got: {err}");
    }

    #[test]
    fn test_capture_sink_needs_enabled_capture() {
        let mut bp = minimal_blueprint();
        bp.capture = CaptureConfig {
            enabled: false,
            warmup_frames: None,
        };
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("capture.enabled"), "got: {err}");
    }

    #[test]
    fn test_warmup_out_of_range() {
        let mut bp = minimal_blueprint();
        bp.capture.warmup_frames = Some(5_000_000);
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("warmup_frames"), "got: {err}");
    }
}
