//! Uplink Demo
//!
//! Demonstrates the full pipeline with mock sensor sources and a log
//! endpoint. Runs without device hardware or a reachable collector.
//!
//! Run with: cargo run --bin uplink_demo [config.toml]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use config_loader::ConfigLoader;
use contracts::{
    DeviceConfig, DispatchConfig, EndpointConfig, EndpointType, InferenceConfig, PipelineBlueprint,
    SensorFeedConfig, SensorKind, StaticTokenProvider,
};
use dispatcher::{CollectorEndpoint, Dispatcher, DispatcherConfig};
use inference::{BoundedPredictor, HeartRiskModel};
use sensor_feed::{MockSignalSource, SensorFeed};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("Starting Uplink Demo");

    // ==== Stage 1: Use default config or load from file ====
    let blueprint = if let Some(path) = std::env::args().nth(1) {
        tracing::info!(path = %path, "Loading blueprint config");
        ConfigLoader::load_from_path(std::path::Path::new(&path))?
    } else {
        // Create a minimal test blueprint
        create_test_blueprint()
    };

    // ==== Stage 2: Setup Endpoint ====
    tracing::info!(endpoint = %blueprint.endpoint.name, "Creating collection endpoint...");
    let endpoint = CollectorEndpoint::from_config(&blueprint.endpoint).await?;

    // ==== Stage 3: Setup Dispatcher ====
    tracing::info!("Setting up dispatcher...");
    let model = HeartRiskModel::from_config(&blueprint.inference);
    let dispatcher = Arc::new(Dispatcher::new(
        DispatcherConfig {
            raw_queue_capacity: blueprint.dispatch.raw_queue_capacity,
            predict_queue_capacity: blueprint.inference.queue_capacity,
        },
        Arc::new(BoundedPredictor::new(model, blueprint.inference.budget_ms)),
        Arc::new(StaticTokenProvider::new("demo-token")),
        Arc::new(endpoint),
    ));
    let metrics = dispatcher.metrics_handle();

    // ==== Stage 4: Setup Sensor Feed ====
    tracing::info!("Setting up sensor feed...");
    let mut feed = SensorFeed::new(dispatcher.clone());
    for sensor in &blueprint.sensors {
        feed.add_source(Arc::new(MockSignalSource::from_feed_config(
            &blueprint.device.device_id,
            sensor,
        )));
        tracing::info!(sensor_id = %sensor.id, "Registered sensor source");
    }

    // ==== Stage 5: Run ====
    feed.start();
    tracing::info!(sensors = feed.source_count(), "Pipeline running for 10 seconds");

    tokio::time::sleep(Duration::from_secs(10)).await;

    // ==== Stage 6: Shutdown ====
    tracing::info!("Stopping feed...");
    feed.stop_all();
    drop(feed);
    tokio::time::sleep(Duration::from_millis(200)).await;

    if let Some(dispatcher) = Arc::into_inner(dispatcher) {
        dispatcher.shutdown().await;
    }

    let snapshot = metrics.snapshot();
    tracing::info!(
        raw_scheduled = snapshot.raw_scheduled,
        derived_scheduled = snapshot.derived_scheduled,
        sends_completed = snapshot.sends_completed,
        predictions = snapshot.predictions,
        "Demo finished"
    );

    Ok(())
}

/// Build a two-sensor blueprint for runs without a config file
fn create_test_blueprint() -> PipelineBlueprint {
    PipelineBlueprint {
        version: Default::default(),
        device: DeviceConfig {
            device_id: "ring-demo".to_string(),
            firmware: Some("0.1.0-demo".to_string()),
        },
        sensors: vec![
            SensorFeedConfig {
                id: "hr".to_string(),
                kind: SensorKind::HeartRate,
                sample_rate_hz: 2.0,
            },
            SensorFeedConfig {
                id: "spo2".to_string(),
                kind: SensorKind::Spo2,
                sample_rate_hz: 1.0,
            },
        ],
        endpoint: EndpointConfig {
            name: "demo-collector".to_string(),
            endpoint_type: EndpointType::Log,
            params: HashMap::new(),
        },
        inference: InferenceConfig::default(),
        dispatch: DispatchConfig::default(),
    }
}
