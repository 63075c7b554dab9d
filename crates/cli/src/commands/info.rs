//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    device: DeviceInfo,
    sensors: Vec<SensorInfo>,
    endpoint: EndpointInfo,
    inference: InferenceInfo,
}

#[derive(Serialize)]
struct DeviceInfo {
    device_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    firmware: Option<String>,
}

#[derive(Serialize)]
struct SensorInfo {
    id: String,
    kind: String,
    sample_rate_hz: f64,
}

#[derive(Serialize)]
struct EndpointInfo {
    name: String,
    endpoint_type: String,
    #[serde(skip_serializing_if = "std::collections::HashMap::is_empty")]
    params: std::collections::HashMap<String, String>,
}

#[derive(Serialize)]
struct InferenceInfo {
    budget_ms: u64,
    queue_capacity: usize,
    tachycardia_bpm: u16,
    spo2_floor: f32,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

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

fn build_config_info(blueprint: &contracts::PipelineBlueprint, args: &InfoArgs) -> ConfigInfo {
    let sensors = if args.sensors {
        blueprint
            .sensors
            .iter()
            .map(|s| SensorInfo {
                id: s.id.clone(),
                kind: format!("{:?}", s.kind),
                sample_rate_hz: s.sample_rate_hz,
            })
            .collect()
    } else {
        Vec::new()
    };

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        device: DeviceInfo {
            device_id: blueprint.device.device_id.clone(),
            firmware: blueprint.device.firmware.clone(),
        },
        sensors,
        endpoint: EndpointInfo {
            name: blueprint.endpoint.name.clone(),
            endpoint_type: format!("{:?}", blueprint.endpoint.endpoint_type),
            params: blueprint.endpoint.params.clone(),
        },
        inference: InferenceInfo {
            budget_ms: blueprint.inference.budget_ms,
            queue_capacity: blueprint.inference.queue_capacity,
            tachycardia_bpm: blueprint.inference.tachycardia_bpm,
            spo2_floor: blueprint.inference.spo2_floor,
        },
    }
}

fn print_config_info(blueprint: &contracts::PipelineBlueprint, args: &InfoArgs) {
    println!("=== Vitals Uplink Configuration ===\n");

    // Device info
    println!("Device");
    println!("  Version: {:?}", blueprint.version);
    println!("  Id: {}", blueprint.device.device_id);
    match &blueprint.device.firmware {
        Some(firmware) => println!("  Firmware: {}", firmware),
        None => println!("  Firmware: (unknown)"),
    }

    // Sensors
    println!("\nSensors ({})", blueprint.sensors.len());
    if args.sensors {
        for sensor in &blueprint.sensors {
            println!(
                "  - {} ({:?}, {} Hz)",
                sensor.id, sensor.kind, sensor.sample_rate_hz
            );
        }
    } else {
        for sensor in &blueprint.sensors {
            println!("  - {}", sensor.id);
        }
    }

    // Endpoint
    println!("\nEndpoint");
    println!("  Name: {}", blueprint.endpoint.name);
    println!("  Type: {:?}", blueprint.endpoint.endpoint_type);
    for (key, value) in &blueprint.endpoint.params {
        println!("  {}: {}", key, value);
    }

    // Inference
    println!("\nInference");
    println!("  Budget: {}ms", blueprint.inference.budget_ms);
    println!("  Queue capacity: {}", blueprint.inference.queue_capacity);
    println!(
        "  Tachycardia threshold: {} bpm",
        blueprint.inference.tachycardia_bpm
    );
    println!("  SpO2 floor: {}%", blueprint.inference.spo2_floor);

    // Dispatch
    println!("\nDispatch");
    println!(
        "  Raw queue capacity: {}",
        blueprint.dispatch.raw_queue_capacity
    );

    println!();
}
