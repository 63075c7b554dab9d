//! SignalDescriptor - per-event metadata from the sensor layer
//!
//! Immutable, created by the sensor layer for each event and borrowed by the
//! dispatcher for the duration of one dispatch call.

use serde::{Deserialize, Serialize};

use crate::{DeviceId, PipelineError, SensorId};

/// Coarse time-of-day bucket attached to every event.
///
/// Downstream labelling joins on this instead of raw timestamps, so the
/// bucket travels with both the raw and the derived payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeBucket {
    #[default]
    Night,
    Morning,
    Afternoon,
    Evening,
}

impl TimeBucket {
    /// Derive the bucket from a local hour (0-23).
    pub fn from_hour(hour: u32) -> Self {
        match hour % 24 {
            0..=5 | 22..=23 => Self::Night,
            6..=11 => Self::Morning,
            12..=17 => Self::Afternoon,
            _ => Self::Evening,
        }
    }

    /// Stable lowercase name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Night => "night",
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
        }
    }
}

/// Metadata identifying device, sensor and time for one raw signal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalDescriptor {
    /// Originating device
    pub device_id: DeviceId,

    /// Originating sensor within the device
    pub sensor_id: SensorId,

    /// Epoch seconds, second precision
    pub timestamp: i64,

    /// Time-of-day bucket
    pub time_bucket: TimeBucket,
}

impl SignalDescriptor {
    /// Create a descriptor for one event.
    pub fn new(
        device_id: impl Into<DeviceId>,
        sensor_id: impl Into<SensorId>,
        timestamp: i64,
        time_bucket: TimeBucket,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            sensor_id: sensor_id.into(),
            timestamp,
            time_bucket,
        }
    }

    /// Reject descriptors that cannot be attributed to a device and sensor.
    ///
    /// # Errors
    /// `PipelineError::Validation` on an empty device or sensor id, or a
    /// non-positive timestamp.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.device_id.is_empty() {
            return Err(PipelineError::validation(
                "descriptor.device_id",
                "device_id cannot be empty",
            ));
        }
        if self.sensor_id.is_empty() {
            return Err(PipelineError::validation(
                "descriptor.sensor_id",
                "sensor_id cannot be empty",
            ));
        }
        if self.timestamp <= 0 {
            return Err(PipelineError::validation(
                "descriptor.timestamp",
                format!("timestamp must be positive, got {}", self.timestamp),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_bucket_from_hour() {
        assert_eq!(TimeBucket::from_hour(2), TimeBucket::Night);
        assert_eq!(TimeBucket::from_hour(23), TimeBucket::Night);
        assert_eq!(TimeBucket::from_hour(8), TimeBucket::Morning);
        assert_eq!(TimeBucket::from_hour(14), TimeBucket::Afternoon);
        assert_eq!(TimeBucket::from_hour(20), TimeBucket::Evening);
        // Wraps instead of panicking
        assert_eq!(TimeBucket::from_hour(26), TimeBucket::Night);
    }

    #[test]
    fn test_valid_descriptor() {
        let desc = SignalDescriptor::new("D1", "HR", 1000, TimeBucket::Night);
        assert!(desc.validate().is_ok());
    }

    #[test]
    fn test_missing_device_id() {
        let desc = SignalDescriptor::new("", "HR", 1000, TimeBucket::Night);
        let err = desc.validate().unwrap_err();
        assert!(matches!(err, PipelineError::Validation { .. }));
        assert!(err.to_string().contains("device_id"));
    }

    #[test]
    fn test_missing_sensor_id() {
        let desc = SignalDescriptor::new("D1", "", 1000, TimeBucket::Night);
        let err = desc.validate().unwrap_err();
        assert!(err.to_string().contains("sensor_id"));
    }

    #[test]
    fn test_bad_timestamp() {
        let desc = SignalDescriptor::new("D1", "HR", 0, TimeBucket::Night);
        assert!(desc.validate().is_err());
    }

    #[test]
    fn test_serde_bucket_name() {
        let json = serde_json::to_string(&TimeBucket::Night).unwrap();
        assert_eq!(json, "\"night\"");
        assert_eq!(TimeBucket::Night.as_str(), "night");
    }
}
