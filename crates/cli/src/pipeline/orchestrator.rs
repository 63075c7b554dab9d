//! Pipeline orchestrator - coordinates all components.
//!
//! Wires mock sensor sources into the dispatcher, which fans each signal out
//! to the raw send lane and the predict lane behind the configured endpoint.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{info, warn};

use contracts::{
    PipelineBlueprint, PipelineError, RawSignal, SignalDescriptor, SignalHandler,
    StaticTokenProvider,
};
use dispatcher::{CollectorEndpoint, Dispatcher, DispatcherConfig};
use inference::{BoundedPredictor, HeartRiskModel};
use observability::UplinkMetricsAggregator;
use sensor_feed::{MockSignalSource, SensorFeed};

use super::PipelineStats;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The pipeline blueprint configuration
    pub blueprint: PipelineBlueprint,

    /// Bearer token for the collection endpoint
    pub token: String,

    /// Maximum number of signals to process (None = unlimited)
    pub max_signals: Option<u64>,

    /// Pipeline timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

/// Handler wrapper that feeds the run aggregator before dispatching
struct ObservedHandler {
    dispatcher: Arc<Dispatcher>,
    aggregator: Arc<Mutex<UplinkMetricsAggregator>>,
}

impl SignalHandler for ObservedHandler {
    fn on_signal(
        &self,
        signal: RawSignal,
        descriptor: SignalDescriptor,
    ) -> Result<(), PipelineError> {
        match self
            .dispatcher
            .on_signal(signal.clone(), descriptor.clone())
        {
            Ok(()) => {
                observability::record_signal_received(
                    descriptor.device_id.as_str(),
                    descriptor.sensor_id.as_str(),
                    signal.kind(),
                );
                if let Ok(mut aggregator) = self.aggregator.lock() {
                    aggregator.update(&descriptor, &signal);
                }
                Ok(())
            }
            Err(e) => {
                if let Ok(mut aggregator) = self.aggregator.lock() {
                    aggregator.record_rejected();
                }
                Err(e)
            }
        }
    }
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion
    pub async fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Setup Endpoint
        info!(
            endpoint = %blueprint.endpoint.name,
            endpoint_type = ?blueprint.endpoint.endpoint_type,
            "Setting up collection endpoint..."
        );
        let endpoint = CollectorEndpoint::from_config(&blueprint.endpoint)
            .await
            .context("Failed to create collection endpoint")?;

        // Setup Dispatcher
        info!("Setting up dispatcher...");
        let tokens = StaticTokenProvider::new(&self.config.token);
        let model = HeartRiskModel::from_config(&blueprint.inference);
        let predictor = BoundedPredictor::new(model, blueprint.inference.budget_ms);

        let dispatcher_config = DispatcherConfig {
            raw_queue_capacity: blueprint.dispatch.raw_queue_capacity,
            predict_queue_capacity: blueprint.inference.queue_capacity,
        };

        let dispatcher = Arc::new(Dispatcher::new(
            dispatcher_config,
            Arc::new(predictor),
            Arc::new(tokens),
            Arc::new(endpoint),
        ));
        let dispatch_metrics = dispatcher.metrics_handle();

        info!(
            budget_ms = blueprint.inference.budget_ms,
            tachycardia_bpm = blueprint.inference.tachycardia_bpm,
            "Dispatcher started"
        );

        // Setup Sensor Feed
        info!("Setting up sensor feed...");
        let aggregator = Arc::new(Mutex::new(UplinkMetricsAggregator::new()));
        let handler = Arc::new(ObservedHandler {
            dispatcher: Arc::clone(&dispatcher),
            aggregator: Arc::clone(&aggregator),
        });

        let mut feed = SensorFeed::new(handler);
        for sensor in &blueprint.sensors {
            feed.add_source(Arc::new(MockSignalSource::from_feed_config(
                &blueprint.device.device_id,
                sensor,
            )));
        }

        let active_sensors = feed.source_count();
        let feed_metrics = feed.metrics();

        // Start Pipeline
        feed.start();
        info!(
            active_sensors,
            max_signals = ?self.config.max_signals,
            "Pipeline running"
        );

        // Monitor until the signal limit is reached (or forever)
        let max_signals = self.config.max_signals;
        let monitor_metrics = feed.metrics();
        let monitor = async move {
            loop {
                tokio::time::sleep(Duration::from_millis(100)).await;
                if let Some(max) = max_signals {
                    let processed = monitor_metrics.emitted() + monitor_metrics.rejected();
                    if processed >= max {
                        info!(signals = processed, "Reached max signals limit");
                        break;
                    }
                }
            }
        };

        // Run with optional timeout
        if let Some(timeout) = self.config.timeout {
            if tokio::time::timeout(timeout, monitor).await.is_err() {
                info!(timeout_secs = timeout.as_secs(), "Pipeline timeout reached");
            }
        } else {
            monitor.await;
        }

        // Shutdown
        info!("Shutting down pipeline...");
        feed.stop_all();
        drop(feed);

        // Source tasks hold the handler until their next tick; wait for
        // exclusive ownership before draining the lanes.
        let mut shared = dispatcher;
        let deadline = Instant::now() + Duration::from_secs(5);
        let owned = loop {
            match Arc::try_unwrap(shared) {
                Ok(owned) => break Some(owned),
                Err(still_shared) => {
                    if Instant::now() >= deadline {
                        warn!("Sensor tasks did not release the dispatcher, skipping drain");
                        break None;
                    }
                    shared = still_shared;
                    tokio::time::sleep(Duration::from_millis(50)).await;
                }
            }
        };

        if let Some(dispatcher) = owned {
            dispatcher.shutdown().await;
        }

        let feed_snapshot = feed_metrics.snapshot();
        let uplink_metrics = aggregator
            .lock()
            .map(|a| a.clone())
            .unwrap_or_default();

        let stats = PipelineStats {
            signals_accepted: feed_snapshot.emitted,
            signals_rejected: feed_snapshot.rejected,
            active_sensors,
            duration: start_time.elapsed(),
            dispatch: dispatch_metrics.snapshot(),
            uplink_metrics,
        };

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            rate = format!("{:.2}", stats.signals_per_sec()),
            "Pipeline shutdown complete"
        );

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{
        DeviceConfig, DispatchConfig, EndpointConfig, EndpointType, InferenceConfig,
        SensorFeedConfig, SensorKind,
    };
    use std::collections::HashMap;

    fn test_blueprint() -> PipelineBlueprint {
        PipelineBlueprint {
            version: Default::default(),
            device: DeviceConfig {
                device_id: "ring-test".to_string(),
                firmware: None,
            },
            sensors: vec![SensorFeedConfig {
                id: "hr".to_string(),
                kind: SensorKind::HeartRate,
                sample_rate_hz: 100.0,
            }],
            endpoint: EndpointConfig {
                name: "collector".to_string(),
                endpoint_type: EndpointType::Log,
                params: HashMap::new(),
            },
            inference: InferenceConfig::default(),
            dispatch: DispatchConfig::default(),
        }
    }

    #[tokio::test]
    async fn test_pipeline_runs_to_signal_limit() {
        let pipeline = Pipeline::new(PipelineConfig {
            blueprint: test_blueprint(),
            token: "tok".to_string(),
            max_signals: Some(5),
            timeout: Some(Duration::from_secs(30)),
            metrics_port: None,
        });

        let stats = pipeline.run().await.unwrap();
        assert!(stats.signals_accepted >= 5);
        assert_eq!(stats.signals_rejected, 0);
        assert_eq!(stats.active_sensors, 1);
        assert!(stats.dispatch.raw_scheduled >= 5);
    }

    #[tokio::test]
    async fn test_pipeline_stops_on_timeout() {
        let pipeline = Pipeline::new(PipelineConfig {
            blueprint: test_blueprint(),
            token: "tok".to_string(),
            max_signals: None,
            timeout: Some(Duration::from_millis(300)),
            metrics_port: None,
        });

        let stats = pipeline.run().await.unwrap();
        assert!(stats.duration >= Duration::from_millis(300));
        assert!(stats.signals_accepted > 0);
    }
}
