//! Mock sensor sources
//!
//! Deterministic signal generators for runs without device hardware.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::{Timelike, Utc};
use tracing::{debug, trace};

use contracts::{
    RawSignal, SensorFeedConfig, SensorKind, SignalCallback, SignalDescriptor, SignalSource,
    TimeBucket,
};

/// Mock source configuration
#[derive(Debug, Clone)]
pub struct MockSignalConfig {
    /// Device the source reports for
    pub device_id: String,

    /// Sensor id within the device
    pub sensor_id: String,

    /// Sensor kind, determines the generated waveform
    pub kind: SensorKind,

    /// Sampling rate (Hz)
    pub sample_rate_hz: f64,
}

impl Default for MockSignalConfig {
    fn default() -> Self {
        Self {
            device_id: "mock_device".to_string(),
            sensor_id: "mock_sensor".to_string(),
            kind: SensorKind::HeartRate,
            sample_rate_hz: 1.0,
        }
    }
}

/// Mock signal source
///
/// Emits a repeating waveform at the configured rate on its own tokio task.
/// Values are derived from the tick counter, so two runs with the same
/// configuration produce the same sequence.
pub struct MockSignalSource {
    config: MockSignalConfig,
    running: Arc<AtomicBool>,
}

impl MockSignalSource {
    /// Create a new mock source
    pub fn new(config: MockSignalConfig) -> Self {
        Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a source from one blueprint sensor entry
    pub fn from_feed_config(device_id: &str, feed: &SensorFeedConfig) -> Self {
        Self::new(MockSignalConfig {
            device_id: device_id.to_string(),
            sensor_id: feed.id.clone(),
            kind: feed.kind,
            sample_rate_hz: feed.sample_rate_hz,
        })
    }

    /// Create a mock heart-rate source
    pub fn heart_rate(device_id: &str, sensor_id: &str, sample_rate_hz: f64) -> Self {
        Self::new(MockSignalConfig {
            device_id: device_id.to_string(),
            sensor_id: sensor_id.to_string(),
            kind: SensorKind::HeartRate,
            sample_rate_hz,
        })
    }

    /// Create a mock SpO2 source
    pub fn spo2(device_id: &str, sensor_id: &str, sample_rate_hz: f64) -> Self {
        Self::new(MockSignalConfig {
            device_id: device_id.to_string(),
            sensor_id: sensor_id.to_string(),
            kind: SensorKind::Spo2,
            sample_rate_hz,
        })
    }

    fn signal_for_tick(kind: SensorKind, tick: u64) -> RawSignal {
        match kind {
            // Drifts between 60 and 99 bpm
            SensorKind::HeartRate => RawSignal::HeartRate {
                bpm: 60 + ((tick * 7) % 40) as u16,
            },
            // Hovers between 95 and 99 percent
            SensorKind::Spo2 => RawSignal::Spo2 {
                percent: 95.0 + (tick % 5) as f32,
            },
            // Oscillates around 36.5 celsius
            SensorKind::SkinTemperature => RawSignal::SkinTemperature {
                celsius: 36.5 + 0.1 * ((tick % 7) as f32 - 3.0),
            },
            SensorKind::Ecg => {
                let samples: Vec<u8> = (0..64).map(|i| ((tick + i) % 251) as u8).collect();
                RawSignal::Ecg {
                    sample_rate_hz: 250,
                    samples: Bytes::from(samples),
                }
            }
        }
    }
}

impl SignalSource for MockSignalSource {
    fn device_id(&self) -> &str {
        &self.config.device_id
    }

    fn sensor_id(&self) -> &str {
        &self.config.sensor_id
    }

    fn listen(&self, callback: SignalCallback) {
        if self.running.swap(true, Ordering::SeqCst) {
            // Already listening
            return;
        }

        let config = self.config.clone();
        let running = self.running.clone();

        tokio::spawn(async move {
            let interval = Duration::from_secs_f64(1.0 / config.sample_rate_hz.max(0.001));
            let mut tick: u64 = 0;

            debug!(
                device_id = %config.device_id,
                sensor_id = %config.sensor_id,
                kind = ?config.kind,
                sample_rate_hz = config.sample_rate_hz,
                "Mock signal source started"
            );

            while running.load(Ordering::Relaxed) {
                let now = Utc::now();
                let descriptor = SignalDescriptor::new(
                    config.device_id.as_str(),
                    config.sensor_id.as_str(),
                    now.timestamp(),
                    TimeBucket::from_hour(now.hour()),
                );
                let signal = MockSignalSource::signal_for_tick(config.kind, tick);

                trace!(
                    sensor_id = %config.sensor_id,
                    tick,
                    kind = signal.kind(),
                    "Mock signal emitted"
                );

                callback(signal, descriptor);

                tick += 1;
                tokio::time::sleep(interval).await;
            }

            debug!(
                device_id = %config.device_id,
                sensor_id = %config.sensor_id,
                "Mock signal source stopped"
            );
        });
    }

    fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn is_listening(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}
