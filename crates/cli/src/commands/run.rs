//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    // Load and parse configuration
    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref device_id) = args.device_id {
        info!(device_id = %device_id, "Overriding device id from CLI");
        blueprint.device.device_id = device_id.clone();
    }

    info!(
        device_id = %blueprint.device.device_id,
        sensors = blueprint.sensors.len(),
        endpoint = %blueprint.endpoint.name,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    // Build pipeline configuration
    let pipeline_config = PipelineConfig {
        blueprint,
        token: args.token.clone(),
        max_signals: if args.max_signals == 0 {
            None
        } else {
            Some(args.max_signals)
        },
        timeout: if args.timeout == 0 {
            None
        } else {
            Some(Duration::from_secs(args.timeout))
        },
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    // Create and run pipeline
    let pipeline = Pipeline::new(pipeline_config);

    // Setup graceful shutdown handler
    let shutdown_signal = setup_shutdown_signal();

    info!("Starting pipeline...");

    // Run pipeline with shutdown signal
    tokio::select! {
        result = pipeline.run() => {
            match result {
                Ok(stats) => {
                    info!(
                        signals_accepted = stats.signals_accepted,
                        signals_rejected = stats.signals_rejected,
                        duration_secs = stats.duration.as_secs_f64(),
                        rate = format!("{:.2}", stats.signals_per_sec()),
                        "Pipeline completed successfully"
                    );

                    // Print detailed statistics
                    stats.print_summary();
                }
                Err(e) => {
                    return Err(e).context("Pipeline execution failed");
                }
            }
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping pipeline...");
        }
    }

    info!("Vitals Uplink finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &contracts::PipelineBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Device:");
    println!("  Id: {}", blueprint.device.device_id);
    if let Some(ref firmware) = blueprint.device.firmware {
        println!("  Firmware: {}", firmware);
    }

    println!("\nSensors ({}):", blueprint.sensors.len());
    for sensor in &blueprint.sensors {
        println!(
            "  - {} ({:?}, {} Hz)",
            sensor.id, sensor.kind, sensor.sample_rate_hz
        );
    }

    println!("\nEndpoint:");
    println!(
        "  {} ({:?})",
        blueprint.endpoint.name, blueprint.endpoint.endpoint_type
    );

    println!("\nInference:");
    println!("  Budget: {}ms", blueprint.inference.budget_ms);
    println!("  Tachycardia threshold: {} bpm", blueprint.inference.tachycardia_bpm);
    println!("  SpO2 floor: {}%", blueprint.inference.spo2_floor);

    println!();
}
