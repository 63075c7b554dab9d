//! Dispatcher - the per-event orchestration core
//!
//! For each incoming signal the dispatcher builds the raw envelope, hands it
//! to the send lane, and queues an inference job. Both units of work run on
//! their own workers; the caller returns as soon as both are scheduled.

use std::sync::Arc;

use tracing::{debug, instrument};

use contracts::{
    EndpointClient, Payload, PipelineError, Predictor, RawPayload, RawSignal, SignalDescriptor,
    SignalHandler, TokenProvider,
};

use crate::lane::SendLane;
use crate::metrics::{DispatchMetrics, DispatchSnapshot};
use crate::predict::{PredictJob, PredictLane};

/// Dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Raw send lane queue capacity
    pub raw_queue_capacity: usize,
    /// Predict lane queue capacity
    pub predict_queue_capacity: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            raw_queue_capacity: 128,
            predict_queue_capacity: 32,
        }
    }
}

/// The event dispatcher
///
/// Constructed by dependency injection from its three collaborators; no
/// process-wide singletons. Holds no cross-event mutable state of its own,
/// so concurrent `on_signal` calls need no locks.
pub struct Dispatcher {
    raw_lane: SendLane,
    predict_lane: PredictLane,
    metrics: Arc<DispatchMetrics>,
}

impl Dispatcher {
    /// Create a dispatcher and spawn its lane workers
    #[instrument(name = "dispatcher_new", skip_all, fields(endpoint = endpoint.name()))]
    pub fn new<P, T, E>(
        config: DispatcherConfig,
        predictor: Arc<P>,
        tokens: Arc<T>,
        endpoint: Arc<E>,
    ) -> Self
    where
        P: Predictor + Send + Sync + 'static,
        T: TokenProvider + Send + Sync + 'static,
        E: EndpointClient + Send + Sync + 'static,
    {
        let metrics = Arc::new(DispatchMetrics::new());

        let raw_lane = SendLane::spawn(
            Arc::clone(&endpoint),
            Arc::clone(&tokens),
            config.raw_queue_capacity,
            Arc::clone(&metrics),
        );

        let predict_lane = PredictLane::spawn(
            predictor,
            tokens,
            endpoint,
            config.predict_queue_capacity,
            Arc::clone(&metrics),
        );

        debug!(
            raw_queue = config.raw_queue_capacity,
            predict_queue = config.predict_queue_capacity,
            "Dispatcher started"
        );

        Self {
            raw_lane,
            predict_lane,
            metrics,
        }
    }

    /// Accept one raw signal from the sensor layer.
    ///
    /// Runs entirely on the caller's thread but performs no I/O and never
    /// blocks: it validates, builds the raw envelope, and hands one payload
    /// and one inference job to their queues. The raw payload is scheduled
    /// before the inference job is queued, so raw data can never be delayed
    /// behind the predictor.
    ///
    /// # Errors
    /// `PipelineError::Validation` for a malformed descriptor; the signal is
    /// dropped entirely and nothing is scheduled. No other error ever
    /// reaches the caller.
    pub fn on_signal(
        &self,
        signal: RawSignal,
        descriptor: SignalDescriptor,
    ) -> Result<(), PipelineError> {
        if let Err(e) = descriptor.validate() {
            self.metrics.inc_validation_failures();
            observability::record_signal_rejected(descriptor.sensor_id.as_str());
            return Err(e);
        }

        let raw = RawPayload::from_parts(signal.clone(), &descriptor);
        self.raw_lane.try_send(Payload::Raw(raw));

        self.predict_lane.try_send(PredictJob { signal, descriptor });

        Ok(())
    }

    /// Get a snapshot of the dispatch counters
    pub fn metrics(&self) -> DispatchSnapshot {
        self.metrics.snapshot()
    }

    /// Shared metrics handle, for observers that outlive one snapshot
    pub fn metrics_handle(&self) -> Arc<DispatchMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Shutdown both lanes gracefully, draining queued work
    pub async fn shutdown(self) {
        self.raw_lane.shutdown().await;
        self.predict_lane.shutdown().await;
        debug!("Dispatcher shutdown complete");
    }
}

impl SignalHandler for Dispatcher {
    fn on_signal(
        &self,
        signal: RawSignal,
        descriptor: SignalDescriptor,
    ) -> Result<(), PipelineError> {
        Dispatcher::on_signal(self, signal, descriptor)
    }
}
