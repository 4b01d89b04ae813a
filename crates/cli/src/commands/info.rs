//! `info` command implementation.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use contracts::{LoggingBlueprint, RotatingFileParams, SinkType};
use serde::Serialize;
use tracing::info;

use super::load_blueprint;
use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    output: OutputInfo,
    capture: CaptureInfo,
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct OutputInfo {
    flush_stdout_on_print: bool,
    print_line_enabled: bool,
    print_error_enabled: bool,
}

#[derive(Serialize)]
struct CaptureInfo {
    enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    warmup_frames: Option<u64>,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: SinkType,
    /// Resolved location and retention for rotating files
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<FileInfo>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    params: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct FileInfo {
    base_path: String,
    max_files: i32,
    rotation: bool,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    let blueprint = load_blueprint(&args.config)?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

fn file_info(sink_type: SinkType, params: &std::collections::HashMap<String, String>) -> Option<FileInfo> {
    if sink_type != SinkType::RotatingFile {
        return None;
    }
    RotatingFileParams::from_params(params)
        .ok()
        .map(|p| FileInfo {
            base_path: p.base_path.display().to_string(),
            max_files: p.max_files,
            rotation: p.max_files > 0,
        })
}

fn build_config_info(blueprint: &LoggingBlueprint, args: &InfoArgs) -> ConfigInfo {
    let sinks = blueprint
        .sinks
        .iter()
        .map(|s| SinkInfo {
            name: s.name.clone(),
            sink_type: s.sink_type,
            file: file_info(s.sink_type, &s.params),
            params: if args.params {
                s.params.clone().into_iter().collect()
            } else {
                BTreeMap::new()
            },
        })
        .collect();

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        output: OutputInfo {
            flush_stdout_on_print: blueprint.output.flush_stdout_on_print,
            print_line_enabled: blueprint.output.print_line_enabled,
            print_error_enabled: blueprint.output.print_error_enabled,
        },
        capture: CaptureInfo {
            enabled: blueprint.capture.enabled,
            warmup_frames: blueprint.capture.warmup_frames,
        },
        sinks,
    }
}

fn print_config_info(blueprint: &LoggingBlueprint, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  logcore Configuration                       ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("Output (version {:?})", blueprint.version);
    println!(
        "   ├─ Flush stdout on print: {}",
        blueprint.output.flush_stdout_on_print
    );
    println!("   ├─ Print lines: {}", blueprint.output.print_line_enabled);
    println!("   └─ Print errors: {}", blueprint.output.print_error_enabled);

    println!("\nCapture");
    println!("   ├─ Enabled: {}", blueprint.capture.enabled);
    match blueprint.capture.warmup_frames {
        Some(frames) => println!("   └─ Warm-up: buffer through frame {}", frames),
        None => println!("   └─ Warm-up: off"),
    }

    println!("\nSinks ({})", blueprint.sinks.len());
    for (i, sink) in blueprint.sinks.iter().enumerate() {
        let is_last = i == blueprint.sinks.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };

        println!("   {} {} ({:?})", prefix, sink.name, sink.sink_type);

        if let Some(file) = file_info(sink.sink_type, &sink.params) {
            let retention = if file.rotation {
                format!("keep {} backups", file.max_files)
            } else {
                "rotation disabled".to_string()
            };
            println!("   {}  └─ {} ({})", child_prefix, file.base_path, retention);
        }

        if args.params && !sink.params.is_empty() {
            let params: BTreeMap<_, _> = sink.params.iter().collect();
            for (key, value) in params {
                println!("   {}     {} = {}", child_prefix, key, value);
            }
        }
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::SinkConfig;

    #[test]
    fn test_info_resolves_file_defaults() {
        let blueprint = LoggingBlueprint {
            sinks: vec![
                SinkConfig::new("console", SinkType::Stdout),
                SinkConfig::new("file", SinkType::RotatingFile).with_param("max_files", "-1"),
            ],
            ..Default::default()
        };
        let args = InfoArgs {
            config: "logging.toml".into(),
            json: true,
            params: true,
        };

        let info = build_config_info(&blueprint, &args);
        assert!(info.sinks[0].file.is_none());
        let file = info.sinks[1].file.as_ref().unwrap();
        assert_eq!(file.base_path, contracts::DEFAULT_LOG_PATH);
        assert!(!file.rotation);
        assert_eq!(info.sinks[1].params["max_files"], "-1");

        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains(r#""sink_type":"rotating_file""#));
    }
}
