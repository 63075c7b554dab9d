//! LogEndpoint - logs payload summaries via tracing
//!
//! Diagnostics endpoint for runs without a reachable collector.

use contracts::{Credential, EndpointClient, Payload, PipelineError};
use tracing::{info, instrument};

/// Endpoint that logs payload summaries instead of transmitting
pub struct LogEndpoint {
    name: String,
}

impl LogEndpoint {
    /// Create a new LogEndpoint with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_payload_summary(&self, payload: &Payload) {
        match payload {
            Payload::Raw(raw) => {
                let scalar = raw.sample.scalar();
                info!(
                    endpoint = %self.name,
                    device_id = %raw.device_id,
                    sensor_id = %raw.sensor_id,
                    kind = raw.sample.kind(),
                    scalar = ?scalar,
                    timestamp = raw.timestamp,
                    bucket = raw.time_bucket.as_str(),
                    "RawPayload received"
                );
            }
            Payload::Derived(derived) => {
                info!(
                    endpoint = %self.name,
                    device_id = %derived.device_id,
                    sensor_id = %derived.sensor_id,
                    risk_score = derived.prediction.risk_score,
                    label = ?derived.prediction.label,
                    timestamp = derived.timestamp,
                    "DerivedPayload received"
                );
            }
        }
    }
}

impl EndpointClient for LogEndpoint {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_endpoint_send",
        skip(self, payload, _credential),
        fields(endpoint = %self.name, kind = payload.kind())
    )]
    async fn send(
        &self,
        payload: &Payload,
        _credential: &Credential,
    ) -> Result<(), PipelineError> {
        self.log_payload_summary(payload);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{RawPayload, RawSignal, SignalDescriptor, TimeBucket};

    #[tokio::test]
    async fn test_log_endpoint_send() {
        let endpoint = LogEndpoint::new("test_log");
        let descriptor = SignalDescriptor::new("D1", "hr", 1000, TimeBucket::Night);
        let payload = Payload::Raw(RawPayload::from_parts(
            RawSignal::HeartRate { bpm: 72 },
            &descriptor,
        ));

        let result = endpoint.send(&payload, &Credential::new("tok")).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_log_endpoint_name() {
        let endpoint = LogEndpoint::new("my_logger");
        assert_eq!(endpoint.name(), "my_logger");
    }
}
