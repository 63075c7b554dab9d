//! `validate` command implementation.

use anyhow::{Context, Result};
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
    device_id: String,
    sensor_count: usize,
    endpoint: String,
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

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    device_id: blueprint.device.device_id.clone(),
                    sensor_count: blueprint.sensors.len(),
                    endpoint: format!(
                        "{} ({:?})",
                        blueprint.endpoint.name, blueprint.endpoint.endpoint_type
                    ),
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
fn collect_warnings(blueprint: &contracts::PipelineBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    // A log endpoint keeps data on the device
    if blueprint.endpoint.endpoint_type == contracts::EndpointType::Log {
        warnings.push("Endpoint type is 'log' - payloads will not leave the device".to_string());
    }

    // Very low sampling rates make for thin feeds
    for sensor in &blueprint.sensors {
        if sensor.sample_rate_hz < 0.1 {
            warnings.push(format!(
                "Sensor '{}' samples below 0.1 Hz - feed will be very sparse",
                sensor.id
            ));
        }
    }

    // Tight budgets starve real models
    if blueprint.inference.budget_ms < 10 {
        warnings.push(format!(
            "Inference budget of {}ms is very tight - most predictions will time out",
            blueprint.inference.budget_ms
        ));
    }

    warnings
}


fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Device: {}", summary.device_id);
            println!("  Sensors: {}", summary.sensor_count);
            println!("  Endpoint: {}", summary.endpoint);
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
