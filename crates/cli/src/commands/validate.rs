//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{LoggingBlueprint, RotatingFileParams, SinkType};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    sink_count: usize,
    capture_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    warmup_frames: Option<u64>,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    sink_count: blueprint.sinks.len(),
                    capture_enabled: blueprint.capture.enabled,
                    warmup_frames: blueprint.capture.warmup_frames,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &LoggingBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.sinks.is_empty() {
        warnings.push("No sinks configured - every message will be dropped".to_string());
    }

    let has_capture_sink = blueprint
        .sinks
        .iter()
        .any(|s| s.sink_type == SinkType::Capture);
    if blueprint.capture.enabled && !has_capture_sink {
        warnings.push(
            "capture.enabled is set but no capture sink is configured - subscribers will only see direct writes"
                .to_string(),
        );
    }

    for sink in &blueprint.sinks {
        if sink.sink_type != SinkType::RotatingFile {
            continue;
        }
        if let Ok(params) = RotatingFileParams::from_params(&sink.params) {
            if params.max_files <= 0 {
                warnings.push(format!(
                    "Sink '{}' has max_files = {} - rotation is disabled and the file grows without bound",
                    sink.name, params.max_files
                ));
            }
        }
    }

    if blueprint.output.flush_stdout_on_print {
        warnings.push("flush_stdout_on_print is enabled - every print flushes stdout".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Sinks: {}", summary.sink_count);
            println!("  Capture: {}", summary.capture_enabled);
            if let Some(frames) = summary.warmup_frames {
                println!("  Warm-up frames: {}", frames);
            }
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::SinkConfig;

    #[test]
    fn test_warnings_for_unbounded_file() {
        let blueprint = LoggingBlueprint {
            sinks: vec![SinkConfig::new("file", SinkType::RotatingFile)
                .with_param("base_path", "logs/x.log")
                .with_param("max_files", "0")],
            ..Default::default()
        };
        let warnings = collect_warnings(&blueprint);
        assert!(warnings.iter().any(|w| w.contains("rotation is disabled")));
        assert!(warnings.iter().any(|w| w.contains("no capture sink")));
    }

    #[test]
    fn test_missing_file_is_invalid() {
        let args = ValidateArgs {
            config: "does/not/exist.toml".into(),
            json: true,
        };
        let result = validate_config(&args);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("File not found"));
    }
}
