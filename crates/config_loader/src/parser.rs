//! Configuration parsing
//!
//! Supports TOML (primary) and JSON (optional) formats.

use contracts::{PipelineBlueprint, PipelineError};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format (recommended)
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    /// Infer format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse TOML configuration
pub fn parse_toml(content: &str) -> Result<PipelineBlueprint, PipelineError> {
    toml::from_str(content).map_err(|e| PipelineError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse JSON configuration
pub fn parse_json(content: &str) -> Result<PipelineBlueprint, PipelineError> {
    serde_json::from_str(content).map_err(|e| PipelineError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse configuration in the given format
pub fn parse(content: &str, format: ConfigFormat) -> Result<PipelineBlueprint, PipelineError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{EndpointType, SensorKind};

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
[device]
device_id = "ring-01"

[[sensors]]
id = "hr"
kind = "heart_rate"
sample_rate_hz = 1.0

[[sensors]]
id = "spo2"
kind = "spo2"

[endpoint]
name = "collector"
endpoint_type = "udp"
[endpoint.params]
addr = "10.0.0.5:4810"
"#;
        let result = parse_toml(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.device.device_id, "ring-01");
        assert_eq!(bp.sensors.len(), 2);
        assert_eq!(bp.sensors[0].kind, SensorKind::HeartRate);
        assert_eq!(bp.sensors[1].sample_rate_hz, 1.0);
        assert_eq!(bp.endpoint.endpoint_type, EndpointType::Udp);
        assert_eq!(bp.endpoint.params.get("addr").unwrap(), "10.0.0.5:4810");
        // Defaults fill the optional sections
        assert_eq!(bp.inference.budget_ms, 250);
        assert_eq!(bp.dispatch.raw_queue_capacity, 128);
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "device": { "device_id": "ring-01" },
            "sensors": [
                { "id": "hr", "kind": "heart_rate", "sample_rate_hz": 2.0 }
            ],
            "endpoint": { "name": "log", "endpoint_type": "log" }
        }"#;
        let result = parse_json(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let result = parse_toml(content);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, PipelineError::ConfigParse { .. }));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
