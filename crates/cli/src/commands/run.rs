//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::info;

use super::load_blueprint;
use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    let blueprint = load_blueprint(&args.config)?;

    info!(
        sinks = blueprint.sinks.len(),
        capture = blueprint.capture.enabled,
        warmup_frames = ?blueprint.capture.warmup_frames,
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    if !(args.fps.is_finite() && args.fps > 0.0) {
        return Err(CliError::invalid_argument(format!("fps must be > 0, got {}", args.fps)).into());
    }

    let pipeline = Pipeline::new(PipelineConfig {
        blueprint,
        max_frames: (args.frames > 0).then_some(args.frames),
        frame_interval: Duration::from_secs_f64(1.0 / args.fps),
        producers: args.producers,
        messages_per_producer: args.messages,
        metrics_port: (args.metrics_port > 0).then_some(args.metrics_port),
    });

    info!("Starting session...");

    let stats = pipeline.run().await.context("Session failed")?;
    info!(
        frames = stats.frames,
        messages = stats.messages_written,
        interrupted = stats.interrupted,
        duration_secs = stats.duration.as_secs_f64(),
        "Session completed"
    );
    stats.print_summary();

    info!("logcore finished");
    Ok(())
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &contracts::LoggingBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Output:");
    println!(
        "  flush_stdout_on_print: {}",
        blueprint.output.flush_stdout_on_print
    );
    println!("  print_line_enabled: {}", blueprint.output.print_line_enabled);
    println!("  print_error_enabled: {}", blueprint.output.print_error_enabled);

    println!("\nCapture:");
    println!("  enabled: {}", blueprint.capture.enabled);
    match blueprint.capture.warmup_frames {
        Some(frames) => println!("  warm-up: frames 0..={frames}"),
        None => println!("  warm-up: off"),
    }

    println!("\nSinks ({}):", blueprint.sinks.len());
    for sink in &blueprint.sinks {
        println!("  - {} ({:?})", sink.name, sink.sink_type);
    }

    println!();
}
