//! HeartRiskModel - built-in threshold model over vital signals
//!
//! Flags tachycardia above a bpm threshold and desaturation below an SpO2
//! floor. Everything else resolves to "no actionable prediction".

use tracing::debug;

use contracts::{InferenceConfig, PipelineError, Prediction, Predictor, RawSignal};

/// Heart-rate risk score denominator: 200 bpm maps to a score of 1.0.
const RISK_SCALE_BPM: f64 = 200.0;

/// Threshold-based risk model for heart rate and SpO2 signals
#[derive(Debug, Clone)]
pub struct HeartRiskModel {
    /// Heart rate at or above this flags tachycardia
    tachycardia_bpm: u16,
    /// SpO2 percent below this flags desaturation
    spo2_floor: f32,
}

impl HeartRiskModel {
    /// Create a model with explicit thresholds.
    pub fn new(tachycardia_bpm: u16, spo2_floor: f32) -> Self {
        Self {
            tachycardia_bpm,
            spo2_floor,
        }
    }

    /// Build from the inference section of a blueprint.
    pub fn from_config(config: &InferenceConfig) -> Self {
        Self::new(config.tachycardia_bpm, config.spo2_floor)
    }

    fn score_heart_rate(&self, bpm: u16) -> Option<Prediction> {
        if bpm < self.tachycardia_bpm {
            return None;
        }
        let risk_score = (f64::from(bpm) / RISK_SCALE_BPM).min(1.0);
        Some(Prediction::new(risk_score).with_label("tachycardia"))
    }

    fn score_spo2(&self, percent: f32) -> Option<Prediction> {
        if percent >= self.spo2_floor {
            return None;
        }
        // Score grows linearly as saturation falls below the floor.
        let deficit = f64::from(self.spo2_floor - percent);
        let risk_score = (deficit / f64::from(self.spo2_floor)).min(1.0);
        Some(Prediction::new(risk_score).with_label("desaturation"))
    }
}

impl Default for HeartRiskModel {
    fn default() -> Self {
        Self::from_config(&InferenceConfig::default())
    }
}

impl Predictor for HeartRiskModel {
    async fn predict(&self, signal: &RawSignal) -> Result<Option<Prediction>, PipelineError> {
        let prediction = match signal {
            RawSignal::HeartRate { bpm } => self.score_heart_rate(*bpm),
            RawSignal::Spo2 { percent } => self.score_spo2(*percent),
            // Temperature, ECG and opaque samples carry no threshold rule.
            _ => None,
        };

        if let Some(prediction) = &prediction {
            debug!(
                kind = signal.kind(),
                risk_score = prediction.risk_score,
                label = ?prediction.label,
                "Risk flagged"
            );
        }

        Ok(prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[tokio::test]
    async fn test_elevated_heart_rate_flagged() {
        let model = HeartRiskModel::default();
        let prediction = model
            .predict(&RawSignal::HeartRate { bpm: 180 })
            .await
            .unwrap()
            .unwrap();
        assert!((prediction.risk_score - 0.9).abs() < f64::EPSILON);
        assert_eq!(prediction.label.as_deref(), Some("tachycardia"));
    }

    #[tokio::test]
    async fn test_risk_score_saturates_at_one() {
        let model = HeartRiskModel::default();
        let prediction = model
            .predict(&RawSignal::HeartRate { bpm: 240 })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(prediction.risk_score, 1.0);
    }

    #[tokio::test]
    async fn test_resting_heart_rate_not_flagged() {
        let model = HeartRiskModel::default();
        let result = model
            .predict(&RawSignal::HeartRate { bpm: 72 })
            .await
            .unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_threshold_is_inclusive() {
        let model = HeartRiskModel::new(150, 90.0);
        assert!(model
            .predict(&RawSignal::HeartRate { bpm: 150 })
            .await
            .unwrap()
            .is_some());
        assert!(model
            .predict(&RawSignal::HeartRate { bpm: 149 })
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_low_spo2_flagged() {
        let model = HeartRiskModel::default();
        let prediction = model
            .predict(&RawSignal::Spo2 { percent: 85.0 })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(prediction.label.as_deref(), Some("desaturation"));
        assert!(prediction.risk_score > 0.0);
    }

    #[tokio::test]
    async fn test_normal_spo2_not_flagged() {
        let model = HeartRiskModel::default();
        let result = model
            .predict(&RawSignal::Spo2 { percent: 98.0 })
            .await
            .unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_other_signals_pass_through() {
        let model = HeartRiskModel::default();
        assert!(model
            .predict(&RawSignal::SkinTemperature { celsius: 41.0 })
            .await
            .unwrap()
            .is_none());
        assert!(model
            .predict(&RawSignal::Raw(Bytes::from_static(b"\x01\x02")))
            .await
            .unwrap()
            .is_none());
    }
}
