//! Configuration validation
//!
//! Rules:
//! - device_id non-empty
//! - sensor ids unique and non-empty
//! - sample_rate_hz > 0
//! - inference budget and queue capacities > 0
//! - udp endpoint has a parseable `addr` parameter

use std::collections::HashSet;
use std::net::SocketAddr;

use contracts::{EndpointType, PipelineBlueprint, PipelineError};

/// Validate a PipelineBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &PipelineBlueprint) -> Result<(), PipelineError> {
    validate_device(blueprint)?;
    validate_sensors(blueprint)?;
    validate_endpoint(blueprint)?;
    validate_inference(blueprint)?;
    validate_dispatch(blueprint)?;
    Ok(())
}

fn validate_device(blueprint: &PipelineBlueprint) -> Result<(), PipelineError> {
    if blueprint.device.device_id.is_empty() {
        return Err(PipelineError::config_validation(
            "device.device_id",
            "device_id cannot be empty",
        ));
    }
    Ok(())
}

fn validate_sensors(blueprint: &PipelineBlueprint) -> Result<(), PipelineError> {
    if blueprint.sensors.is_empty() {
        return Err(PipelineError::config_validation(
            "sensors",
            "at least one sensor feed is required",
        ));
    }

    let mut seen = HashSet::new();
    for sensor in &blueprint.sensors {
        if sensor.id.is_empty() {
            return Err(PipelineError::config_validation(
                "sensors[].id",
                "sensor id cannot be empty",
            ));
        }
        if !seen.insert(&sensor.id) {
            return Err(PipelineError::config_validation(
                format!("sensors[id={}]", sensor.id),
                "duplicate sensor id",
            ));
        }
        if sensor.sample_rate_hz <= 0.0 {
            return Err(PipelineError::config_validation(
                format!("sensors[{}].sample_rate_hz", sensor.id),
                format!("sample_rate_hz must be > 0, got {}", sensor.sample_rate_hz),
            ));
        }
    }
    Ok(())
}

fn validate_endpoint(blueprint: &PipelineBlueprint) -> Result<(), PipelineError> {
    let endpoint = &blueprint.endpoint;
    if endpoint.name.is_empty() {
        return Err(PipelineError::config_validation(
            "endpoint.name",
            "endpoint name cannot be empty",
        ));
    }

    if endpoint.endpoint_type == EndpointType::Udp {
        let addr = endpoint.params.get("addr").ok_or_else(|| {
            PipelineError::config_validation(
                "endpoint.params.addr",
                "udp endpoint requires an 'addr' parameter",
            )
        })?;
        addr.parse::<SocketAddr>().map_err(|e| {
            PipelineError::config_validation(
                "endpoint.params.addr",
                format!("invalid socket address '{addr}': {e}"),
            )
        })?;
    }
    Ok(())
}

fn validate_inference(blueprint: &PipelineBlueprint) -> Result<(), PipelineError> {
    let inference = &blueprint.inference;
    if inference.budget_ms == 0 {
        return Err(PipelineError::config_validation(
            "inference.budget_ms",
            "budget_ms must be > 0",
        ));
    }
    if inference.queue_capacity == 0 {
        return Err(PipelineError::config_validation(
            "inference.queue_capacity",
            "queue_capacity must be > 0",
        ));
    }
    Ok(())
}

fn validate_dispatch(blueprint: &PipelineBlueprint) -> Result<(), PipelineError> {
    if blueprint.dispatch.raw_queue_capacity == 0 {
        return Err(PipelineError::config_validation(
            "dispatch.raw_queue_capacity",
            "raw_queue_capacity must be > 0",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{
        ConfigVersion, DeviceConfig, DispatchConfig, EndpointConfig, InferenceConfig,
        SensorFeedConfig, SensorKind,
    };

    fn minimal_blueprint() -> PipelineBlueprint {
        PipelineBlueprint {
            version: ConfigVersion::V1,
            device: DeviceConfig {
                device_id: "ring-01".into(),
                firmware: None,
            },
            sensors: vec![SensorFeedConfig {
                id: "hr".into(),
                kind: SensorKind::HeartRate,
                sample_rate_hz: 1.0,
            }],
            endpoint: EndpointConfig {
                name: "log".into(),
                endpoint_type: EndpointType::Log,
                params: Default::default(),
            },
            inference: InferenceConfig::default(),
            dispatch: DispatchConfig::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        let bp = minimal_blueprint();
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_empty_device_id() {
        let mut bp = minimal_blueprint();
        bp.device.device_id = String::new();
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("device_id"), "got: {err}");
    }

    #[test]
    fn test_no_sensors() {
        let mut bp = minimal_blueprint();
        bp.sensors.clear();
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("at least one sensor"), "got: {err}");
    }

    #[test]
    fn test_duplicate_sensor_id() {
        let mut bp = minimal_blueprint();
        bp.sensors.push(bp.sensors[0].clone());
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("duplicate sensor id"), "got: {err}");
    }

    #[test]
    fn test_invalid_sample_rate() {
        let mut bp = minimal_blueprint();
        bp.sensors[0].sample_rate_hz = -1.0;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("sample_rate_hz must be > 0"), "got: {err}");
    }

    #[test]
    fn test_udp_requires_addr() {
        let mut bp = minimal_blueprint();
        bp.endpoint.endpoint_type = EndpointType::Udp;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("'addr'"), "got: {err}");

        bp.endpoint
            .params
            .insert("addr".into(), "not-an-addr".into());
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("invalid socket address"), "got: {err}");

        bp.endpoint
            .params
            .insert("addr".into(), "127.0.0.1:4810".into());
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_zero_budget() {
        let mut bp = minimal_blueprint();
        bp.inference.budget_ms = 0;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("budget_ms"), "got: {err}");
    }

    #[test]
    fn test_zero_queue_capacity() {
        let mut bp = minimal_blueprint();
        bp.dispatch.raw_queue_capacity = 0;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("raw_queue_capacity"), "got: {err}");
    }
}
