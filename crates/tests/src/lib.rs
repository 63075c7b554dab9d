//! # Integration Tests
//!
//! Integration and end-to-end tests.
//!
//! Covers:
//! - Contract snapshot checks
//! - Mock e2e runs (no device hardware required)
//! - Failure-isolation behavior across the dispatch lanes

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }

    #[test]
    fn test_credential_is_redacted_in_debug() {
        let credential = contracts::Credential::new("very-secret-token");
        let debug = format!("{:?}", credential);
        assert!(!debug.contains("very-secret-token"));
        assert_eq!(credential.expose(), "very-secret-token");
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use contracts::{
        Credential, EndpointClient, Payload, PipelineError, Prediction, Predictor, RawSignal,
        SignalDescriptor, StaticTokenProvider, TimeBucket, TokenProvider,
    };
    use dispatcher::{Dispatcher, DispatcherConfig};
    use inference::{BoundedPredictor, HeartRiskModel};
    use sensor_feed::{MockSignalSource, SensorFeed};

    /// Endpoint that records every payload it receives, in order
    struct RecordingEndpoint {
        payloads: Arc<Mutex<Vec<Payload>>>,
    }

    impl RecordingEndpoint {
        fn new() -> (Self, Arc<Mutex<Vec<Payload>>>) {
            let payloads = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    payloads: Arc::clone(&payloads),
                },
                payloads,
            )
        }
    }

    impl EndpointClient for RecordingEndpoint {
        fn name(&self) -> &str {
            "recording"
        }

        async fn send(
            &self,
            payload: &Payload,
            _credential: &Credential,
        ) -> Result<(), PipelineError> {
            self.payloads.lock().unwrap().push(payload.clone());
            Ok(())
        }
    }

    fn risk_dispatcher(endpoint: RecordingEndpoint) -> Dispatcher {
        let model = HeartRiskModel::new(150, 90.0);
        Dispatcher::new(
            DispatcherConfig::default(),
            Arc::new(BoundedPredictor::new(model, 250)),
            Arc::new(StaticTokenProvider::new("tok")),
            Arc::new(endpoint),
        )
    }

    /// End-to-end: MockSignalSource -> SensorFeed -> Dispatcher -> endpoint
    ///
    /// Verifies the complete data flow:
    /// 1. Mock sources generate signals on their own timing
    /// 2. The dispatcher schedules a raw send for every accepted signal
    /// 3. Every uplinked payload carries the descriptor's identity fields
    #[tokio::test]
    async fn test_e2e_mock_pipeline() {
        let (endpoint, payloads) = RecordingEndpoint::new();
        let dispatcher = Arc::new(risk_dispatcher(endpoint));

        let mut feed = SensorFeed::new(dispatcher.clone());
        feed.add_source(Arc::new(MockSignalSource::heart_rate("ring-01", "hr", 100.0)));
        feed.add_source(Arc::new(MockSignalSource::spo2("ring-01", "spo2", 100.0)));
        feed.start();

        // Let both sources produce a handful of signals
        tokio::time::sleep(Duration::from_millis(100)).await;
        feed.stop_all();
        drop(feed);

        // Sources release the handler within one tick
        tokio::time::sleep(Duration::from_millis(50)).await;
        let dispatcher = Arc::into_inner(dispatcher).expect("sensor tasks still hold dispatcher");
        let snapshot = dispatcher.metrics();
        dispatcher.shutdown().await;

        let sent = payloads.lock().unwrap();
        assert!(!sent.is_empty(), "No payloads reached the endpoint");
        assert!(snapshot.raw_scheduled >= 2);
        assert_eq!(snapshot.validation_failures, 0);

        for payload in sent.iter() {
            assert_eq!(payload.device_id(), &contracts::DeviceId::from("ring-01"));
            assert!(payload.timestamp() > 0);
        }
    }

    /// A risky heart-rate signal produces exactly one raw and one derived
    /// payload, raw first, both carrying the same identity fields.
    #[tokio::test]
    async fn test_risky_signal_uplinks_raw_then_derived() {
        let (endpoint, payloads) = RecordingEndpoint::new();
        let dispatcher = risk_dispatcher(endpoint);

        let descriptor = SignalDescriptor::new("ring-01", "hr", 1_700_000_000, TimeBucket::Evening);
        dispatcher
            .on_signal(RawSignal::HeartRate { bpm: 180 }, descriptor)
            .unwrap();
        dispatcher.shutdown().await;

        let sent = payloads.lock().unwrap();
        assert_eq!(sent.len(), 2);

        match &sent[0] {
            Payload::Raw(raw) => {
                assert_eq!(raw.device_id, "ring-01");
                assert_eq!(raw.sensor_id, "hr");
                assert_eq!(raw.timestamp, 1_700_000_000);
                assert_eq!(raw.time_bucket, TimeBucket::Evening);
            }
            other => panic!("expected raw payload first, got {:?}", other),
        }
        match &sent[1] {
            Payload::Derived(derived) => {
                assert_eq!(derived.device_id, "ring-01");
                assert_eq!(derived.sensor_id, "hr");
                assert_eq!(derived.timestamp, 1_700_000_000);
                assert_eq!(derived.time_bucket, TimeBucket::Evening);
                assert!((derived.prediction.risk_score - 0.9).abs() < 1e-10);
                assert_eq!(derived.prediction.label.as_deref(), Some("tachycardia"));
            }
            other => panic!("expected derived payload second, got {:?}", other),
        }
    }

    /// A quiet signal produces only the raw payload.
    #[tokio::test]
    async fn test_quiet_signal_uplinks_raw_only() {
        let (endpoint, payloads) = RecordingEndpoint::new();
        let dispatcher = risk_dispatcher(endpoint);

        let descriptor = SignalDescriptor::new("ring-01", "hr", 1_700_000_000, TimeBucket::Night);
        dispatcher
            .on_signal(RawSignal::HeartRate { bpm: 64 }, descriptor)
            .unwrap();
        dispatcher.shutdown().await;

        let sent = payloads.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(matches!(sent[0], Payload::Raw(_)));
    }

    /// A predictor slower than its budget never blocks the raw uplink and
    /// never produces a derived payload.
    #[tokio::test]
    async fn test_slow_predictor_degrades_to_raw_only() {
        struct SlowPredictor;

        impl Predictor for SlowPredictor {
            async fn predict(
                &self,
                _signal: &RawSignal,
            ) -> Result<Option<Prediction>, PipelineError> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(Some(Prediction::new(1.0)))
            }
        }

        let (endpoint, payloads) = RecordingEndpoint::new();
        let dispatcher = Dispatcher::new(
            DispatcherConfig::default(),
            Arc::new(BoundedPredictor::new(SlowPredictor, 20)),
            Arc::new(StaticTokenProvider::new("tok")),
            Arc::new(endpoint),
        );

        let descriptor = SignalDescriptor::new("ring-01", "hr", 1_700_000_000, TimeBucket::Night);
        dispatcher
            .on_signal(RawSignal::HeartRate { bpm: 180 }, descriptor)
            .unwrap();
        dispatcher.shutdown().await;

        let sent = payloads.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(matches!(sent[0], Payload::Raw(_)));
    }

    /// A credential failure on the derived send does not disturb the raw
    /// send that already went out, and the pipeline keeps accepting events.
    #[tokio::test]
    async fn test_auth_failure_is_isolated_to_one_send() {
        /// Hands out one good token, then fails
        struct ExpiringTokenProvider {
            calls: AtomicU64,
        }

        impl TokenProvider for ExpiringTokenProvider {
            async fn token(&self) -> Result<Credential, PipelineError> {
                if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Ok(Credential::new("tok"))
                } else {
                    Err(PipelineError::auth("token expired"))
                }
            }
        }

        /// Predictor that always flags, with a small delay so the raw send's
        /// token fetch happens first
        struct DelayedFlaggingPredictor;

        impl Predictor for DelayedFlaggingPredictor {
            async fn predict(
                &self,
                _signal: &RawSignal,
            ) -> Result<Option<Prediction>, PipelineError> {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(Some(Prediction::new(0.9)))
            }
        }

        let (endpoint, payloads) = RecordingEndpoint::new();
        let dispatcher = Dispatcher::new(
            DispatcherConfig::default(),
            Arc::new(DelayedFlaggingPredictor),
            Arc::new(ExpiringTokenProvider {
                calls: AtomicU64::new(0),
            }),
            Arc::new(endpoint),
        );

        let descriptor = SignalDescriptor::new("ring-01", "hr", 1_700_000_000, TimeBucket::Night);
        dispatcher
            .on_signal(RawSignal::HeartRate { bpm: 180 }, descriptor.clone())
            .unwrap();

        // The pipeline still accepts the next event
        tokio::time::sleep(Duration::from_millis(150)).await;
        dispatcher
            .on_signal(RawSignal::HeartRate { bpm: 70 }, descriptor)
            .unwrap();

        let handle = dispatcher.metrics_handle();
        dispatcher.shutdown().await;

        let sent = payloads.lock().unwrap();
        // First raw went out with the good token, the derived send and the
        // second raw failed auth
        assert!(matches!(sent[0], Payload::Raw(_)));
        assert!(sent.iter().all(|p| matches!(p, Payload::Raw(_))));

        let snapshot = handle.snapshot();
        assert!(snapshot.auth_failures >= 1);
        assert_eq!(snapshot.raw_scheduled, 2);
    }

    /// An invalid descriptor is rejected synchronously; nothing is uplinked.
    #[tokio::test]
    async fn test_invalid_descriptor_uplinks_nothing() {
        let (endpoint, payloads) = RecordingEndpoint::new();
        let dispatcher = risk_dispatcher(endpoint);

        let bad = SignalDescriptor::new("", "hr", 1_700_000_000, TimeBucket::Night);
        let err = dispatcher
            .on_signal(RawSignal::HeartRate { bpm: 180 }, bad)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Validation { .. }));

        dispatcher.shutdown().await;
        assert!(payloads.lock().unwrap().is_empty());
    }

    /// Config text to running endpoint: a blueprint loaded from TOML drives
    /// dispatcher construction end to end.
    #[tokio::test]
    async fn test_blueprint_to_dispatcher() {
        let content = r#"
[device]
device_id = "ring-01"

[[sensors]]
id = "hr"
kind = "heart_rate"
sample_rate_hz = 1.0

[endpoint]
name = "collector"
endpoint_type = "log"

[inference]
budget_ms = 100
tachycardia_bpm = 140
"#;
        let blueprint =
            config_loader::ConfigLoader::load_from_str(content, config_loader::ConfigFormat::Toml)
                .unwrap();

        let endpoint = dispatcher::CollectorEndpoint::from_config(&blueprint.endpoint)
            .await
            .unwrap();
        let model = HeartRiskModel::from_config(&blueprint.inference);
        let dispatcher = Dispatcher::new(
            DispatcherConfig {
                raw_queue_capacity: blueprint.dispatch.raw_queue_capacity,
                predict_queue_capacity: blueprint.inference.queue_capacity,
            },
            Arc::new(BoundedPredictor::new(model, blueprint.inference.budget_ms)),
            Arc::new(StaticTokenProvider::new("tok")),
            Arc::new(endpoint),
        );

        let descriptor = SignalDescriptor::new(
            blueprint.device.device_id.as_str(),
            "hr",
            1_700_000_000,
            TimeBucket::Morning,
        );
        dispatcher
            .on_signal(RawSignal::HeartRate { bpm: 145 }, descriptor)
            .unwrap();

        let handle = dispatcher.metrics_handle();
        dispatcher.shutdown().await;

        // 145 bpm crosses the configured threshold of 140
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.raw_scheduled, 1);
        assert_eq!(snapshot.predictions, 1);
        assert_eq!(snapshot.sends_completed, 2);
    }
}
