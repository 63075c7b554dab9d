//! RawSignal - opaque measurement payload from the sensor layer
//!
//! The dispatcher copies/wraps a signal, it never mutates one.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// One unprocessed sensor measurement.
///
/// Clones are cheap: scalar variants copy, trace variants share their
/// underlying `Bytes` buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawSignal {
    /// Instant heart rate
    HeartRate { bpm: u16 },

    /// Blood oxygen saturation
    Spo2 { percent: f32 },

    /// Skin temperature
    SkinTemperature { celsius: f32 },

    /// Short ECG trace
    Ecg { sample_rate_hz: u32, samples: Bytes },

    /// Raw bytes (fallback for sensors without a typed mapping)
    Raw(Bytes),
}

impl RawSignal {
    /// Short kind tag, used in logs and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::HeartRate { .. } => "heart_rate",
            Self::Spo2 { .. } => "spo2",
            Self::SkinTemperature { .. } => "skin_temperature",
            Self::Ecg { .. } => "ecg",
            Self::Raw(_) => "raw",
        }
    }

    /// Scalar value of the sample, if the variant has one.
    pub fn scalar(&self) -> Option<f64> {
        match self {
            Self::HeartRate { bpm } => Some(f64::from(*bpm)),
            Self::Spo2 { percent } => Some(f64::from(*percent)),
            Self::SkinTemperature { celsius } => Some(f64::from(*celsius)),
            Self::Ecg { .. } | Self::Raw(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        assert_eq!(RawSignal::HeartRate { bpm: 72 }.kind(), "heart_rate");
        assert_eq!(RawSignal::Raw(Bytes::new()).kind(), "raw");
    }

    #[test]
    fn test_scalar() {
        assert_eq!(RawSignal::HeartRate { bpm: 180 }.scalar(), Some(180.0));
        assert_eq!(RawSignal::Raw(Bytes::new()).scalar(), None);
    }

    #[test]
    fn test_ecg_clone_shares_buffer() {
        let samples = Bytes::from(vec![1u8, 2, 3, 4]);
        let sig = RawSignal::Ecg {
            sample_rate_hz: 250,
            samples,
        };
        let cloned = sig.clone();
        match (sig, cloned) {
            (
                RawSignal::Ecg { samples: a, .. },
                RawSignal::Ecg { samples: b, .. },
            ) => assert_eq!(a.as_ptr(), b.as_ptr()),
            _ => unreachable!(),
        }
    }
}
