//! PipelineBlueprint - Config Loader output
//!
//! Describes a complete uplink pipeline: device identity, sensor feeds,
//! collection endpoint, inference settings and dispatch tuning.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete pipeline configuration blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Device identity
    pub device: DeviceConfig,

    /// Sensor feed definitions
    pub sensors: Vec<SensorFeedConfig>,

    /// Collection endpoint
    pub endpoint: EndpointConfig,

    /// Inference settings
    #[serde(default)]
    pub inference: InferenceConfig,

    /// Dispatch tuning
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

/// Device identity section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Device id stamped on every outbound payload
    pub device_id: String,

    /// Optional firmware revision, for diagnostics only
    #[serde(default)]
    pub firmware: Option<String>,
}

/// Kind of physiological sensor behind a feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    HeartRate,
    Spo2,
    SkinTemperature,
    Ecg,
}

/// One sensor feed definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorFeedConfig {
    /// Unique sensor id within the device
    pub id: String,

    /// Sensor kind
    pub kind: SensorKind,

    /// Sampling rate in Hz
    #[serde(default = "default_sample_rate_hz")]
    pub sample_rate_hz: f64,
}

fn default_sample_rate_hz() -> f64 {
    1.0
}

/// Endpoint transport selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointType {
    /// Log-only endpoint (diagnostics, no network)
    Log,
    /// UDP fire-and-forget endpoint
    Udp,
}

/// Collection endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Endpoint name (used for logging/metrics)
    pub name: String,

    /// Transport type
    pub endpoint_type: EndpointType,

    /// Transport-specific parameters (e.g. "addr", "format")
    #[serde(default)]
    pub params: HashMap<String, String>,
}

/// Inference settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Execution-time budget per prediction, milliseconds
    #[serde(default = "default_budget_ms")]
    pub budget_ms: u64,

    /// Predict lane queue capacity
    #[serde(default = "default_predict_queue_capacity")]
    pub queue_capacity: usize,

    /// Heart-rate threshold above which the built-in model flags risk
    #[serde(default = "default_tachycardia_bpm")]
    pub tachycardia_bpm: u16,

    /// SpO2 floor below which the built-in model flags risk
    #[serde(default = "default_spo2_floor")]
    pub spo2_floor: f32,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            budget_ms: default_budget_ms(),
            queue_capacity: default_predict_queue_capacity(),
            tachycardia_bpm: default_tachycardia_bpm(),
            spo2_floor: default_spo2_floor(),
        }
    }
}

fn default_budget_ms() -> u64 {
    250
}

fn default_predict_queue_capacity() -> usize {
    32
}

fn default_tachycardia_bpm() -> u16 {
    150
}

fn default_spo2_floor() -> f32 {
    90.0
}

/// Dispatch tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Raw send lane queue capacity
    #[serde(default = "default_raw_queue_capacity")]
    pub raw_queue_capacity: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            raw_queue_capacity: default_raw_queue_capacity(),
        }
    }
}

fn default_raw_queue_capacity() -> usize {
    128
}
