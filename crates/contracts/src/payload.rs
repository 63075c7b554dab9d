//! Outbound payloads - wire-ready envelopes for the endpoint client
//!
//! A `RawPayload` is built exactly once per accepted signal; a
//! `DerivedPayload` is built at most once, only when inference produced a
//! prediction. Neither is mutated after construction.

use serde::{Deserialize, Serialize};

use crate::{DeviceId, RawSignal, SensorId, SignalDescriptor, TimeBucket};

/// Envelope combining a raw signal with its descriptor metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPayload {
    pub device_id: DeviceId,
    pub sensor_id: SensorId,
    pub sample: RawSignal,
    pub timestamp: i64,
    pub time_bucket: TimeBucket,
}

impl RawPayload {
    /// Build the envelope from a signal and its descriptor.
    ///
    /// Pure; assumes the descriptor has already been validated.
    pub fn from_parts(sample: RawSignal, descriptor: &SignalDescriptor) -> Self {
        Self {
            device_id: descriptor.device_id.clone(),
            sensor_id: descriptor.sensor_id.clone(),
            sample,
            timestamp: descriptor.timestamp,
            time_bucket: descriptor.time_bucket,
        }
    }
}

/// Result of local inference over one raw signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Risk score in [0, 1]
    pub risk_score: f64,

    /// Optional human-readable label (e.g. "tachycardia")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Prediction {
    /// Create a prediction with a bare score.
    pub fn new(risk_score: f64) -> Self {
        Self {
            risk_score,
            label: None,
        }
    }

    /// Attach a label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Prediction artifact tagged with the same metadata as its raw sibling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedPayload {
    pub device_id: DeviceId,
    pub sensor_id: SensorId,
    pub prediction: Prediction,
    pub timestamp: i64,
    pub time_bucket: TimeBucket,
}

impl DerivedPayload {
    /// Build the envelope from a prediction and the originating descriptor.
    pub fn from_prediction(prediction: Prediction, descriptor: &SignalDescriptor) -> Self {
        Self {
            device_id: descriptor.device_id.clone(),
            sensor_id: descriptor.sensor_id.clone(),
            prediction,
            timestamp: descriptor.timestamp,
            time_bucket: descriptor.time_bucket,
        }
    }
}

/// Union of everything the endpoint client accepts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    Raw(RawPayload),
    Derived(DerivedPayload),
}

impl Payload {
    /// Payload kind tag, used in logs and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Raw(_) => "raw",
            Self::Derived(_) => "derived",
        }
    }

    /// Device the payload is attributed to.
    pub fn device_id(&self) -> &DeviceId {
        match self {
            Self::Raw(p) => &p.device_id,
            Self::Derived(p) => &p.device_id,
        }
    }

    /// Sensor the payload is attributed to.
    pub fn sensor_id(&self) -> &SensorId {
        match self {
            Self::Raw(p) => &p.sensor_id,
            Self::Derived(p) => &p.sensor_id,
        }
    }

    /// Event timestamp (epoch seconds).
    pub fn timestamp(&self) -> i64 {
        match self {
            Self::Raw(p) => p.timestamp,
            Self::Derived(p) => p.timestamp,
        }
    }
}
