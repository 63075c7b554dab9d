//! PredictLane - predict-then-maybe-send worker
//!
//! The second asynchronous unit of work per event. Inference runs here, off
//! the sensor path, and a derived payload is sent only when the predictor
//! yields one. Nothing in this lane can delay or fail the raw send.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use contracts::{
    DerivedPayload, EndpointClient, Payload, PipelineError, Predictor, RawSignal,
    SignalDescriptor, TokenProvider,
};

use crate::lane::send_with_token;
use crate::metrics::DispatchMetrics;

/// One queued inference request
#[derive(Debug, Clone)]
pub struct PredictJob {
    pub signal: RawSignal,
    pub descriptor: SignalDescriptor,
}

/// Handle to a running predict worker
pub struct PredictLane {
    tx: mpsc::Sender<PredictJob>,
    metrics: Arc<DispatchMetrics>,
    worker_handle: JoinHandle<()>,
}

impl PredictLane {
    /// Create a new PredictLane and spawn its worker task
    pub fn spawn<P, T, E>(
        predictor: Arc<P>,
        tokens: Arc<T>,
        endpoint: Arc<E>,
        queue_capacity: usize,
        metrics: Arc<DispatchMetrics>,
    ) -> Self
    where
        P: Predictor + Send + Sync + 'static,
        T: TokenProvider + Send + Sync + 'static,
        E: EndpointClient + Send + Sync + 'static,
    {
        let (tx, rx) = mpsc::channel(queue_capacity);

        let worker_metrics = Arc::clone(&metrics);
        let worker_handle = tokio::spawn(async move {
            predict_worker(predictor, tokens, endpoint, rx, worker_metrics).await;
        });

        Self {
            tx,
            metrics,
            worker_handle,
        }
    }

    /// Queue one inference request (non-blocking)
    ///
    /// Returns true if queued, false if the queue was full and the job was
    /// dropped. A dropped job only ever loses the *derived* payload; the raw
    /// payload was already scheduled by then.
    pub fn try_send(&self, job: PredictJob) -> bool {
        match self.tx.try_send(job) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(j)) => {
                self.metrics.inc_predict_dropped();
                observability::record_payload_dropped("predict");
                warn!(
                    sensor_id = %j.descriptor.sensor_id,
                    timestamp = j.descriptor.timestamp,
                    "Predict queue full, inference skipped"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!("Predict worker closed unexpectedly");
                false
            }
        }
    }

    /// Shutdown the predict worker gracefully, draining queued jobs
    #[instrument(name = "predict_lane_shutdown", skip(self))]
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.worker_handle.await {
            error!(error = ?e, "Predict worker panicked");
        }
        debug!("PredictLane shutdown complete");
    }
}

/// Worker task: run inference, send a derived payload when one is produced
async fn predict_worker<P, T, E>(
    predictor: Arc<P>,
    tokens: Arc<T>,
    endpoint: Arc<E>,
    mut rx: mpsc::Receiver<PredictJob>,
    metrics: Arc<DispatchMetrics>,
) where
    P: Predictor + Send + Sync,
    T: TokenProvider + Send + Sync,
    E: EndpointClient + Send + Sync,
{
    debug!("Predict worker started");

    while let Some(job) = rx.recv().await {
        observability::record_queue_depth("predict", rx.len());

        match predictor.predict(&job.signal).await {
            Ok(Some(prediction)) => {
                metrics.inc_predictions();
                observability::record_inference_outcome("prediction");

                let payload = Payload::Derived(DerivedPayload::from_prediction(
                    prediction,
                    &job.descriptor,
                ));
                metrics.inc_derived_scheduled();
                observability::record_payload_scheduled("derived");

                send_with_token(endpoint.as_ref(), tokens.as_ref(), &payload, &metrics).await;
            }
            Ok(None) => {
                metrics.inc_inference_empty();
                observability::record_inference_outcome("empty");
                debug!(
                    sensor_id = %job.descriptor.sensor_id,
                    kind = job.signal.kind(),
                    "No actionable prediction"
                );
            }
            Err(PipelineError::InferenceTimeout { budget_ms }) => {
                metrics.inc_inference_timeouts();
                observability::record_inference_outcome("timeout");
                warn!(
                    sensor_id = %job.descriptor.sensor_id,
                    budget_ms,
                    "Inference timed out, treated as no prediction"
                );
            }
            Err(e) => {
                metrics.inc_inference_failures();
                observability::record_inference_outcome("failure");
                warn!(
                    sensor_id = %job.descriptor.sensor_id,
                    error = %e,
                    "Inference failed, treated as no prediction"
                );
            }
        }
    }

    debug!("Predict worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Credential, Prediction, StaticTokenProvider, TimeBucket};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;
    use tokio::time::{sleep, Duration};

    struct RecordingEndpoint {
        payloads: Arc<Mutex<Vec<Payload>>>,
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

    struct FixedPredictor {
        result: Option<Prediction>,
        calls: Arc<AtomicU64>,
    }

    impl Predictor for FixedPredictor {
        async fn predict(
            &self,
            _signal: &RawSignal,
        ) -> Result<Option<Prediction>, PipelineError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(self.result.clone())
        }
    }

    struct PanickyPredictor;

    impl Predictor for PanickyPredictor {
        async fn predict(
            &self,
            _signal: &RawSignal,
        ) -> Result<Option<Prediction>, PipelineError> {
            Err(PipelineError::inference("model exploded"))
        }
    }

    fn job(bpm: u16) -> PredictJob {
        PredictJob {
            signal: RawSignal::HeartRate { bpm },
            descriptor: SignalDescriptor::new("D1", "hr", 1000, TimeBucket::Night),
        }
    }

    #[tokio::test]
    async fn test_prediction_produces_derived_send() {
        let payloads = Arc::new(Mutex::new(Vec::new()));
        let endpoint = Arc::new(RecordingEndpoint {
            payloads: Arc::clone(&payloads),
        });
        let predictor = Arc::new(FixedPredictor {
            result: Some(Prediction::new(0.9).with_label("tachycardia")),
            calls: Arc::new(AtomicU64::new(0)),
        });
        let tokens = Arc::new(StaticTokenProvider::new("tok"));
        let metrics = Arc::new(DispatchMetrics::new());

        let lane = PredictLane::spawn(predictor, tokens, endpoint, 10, Arc::clone(&metrics));
        assert!(lane.try_send(job(180)));
        lane.shutdown().await;

        let sent = payloads.lock().unwrap();
        assert_eq!(sent.len(), 1);
        match &sent[0] {
            Payload::Derived(d) => {
                assert_eq!(d.device_id, "D1");
                assert_eq!(d.prediction.risk_score, 0.9);
            }
            other => panic!("expected derived payload, got {:?}", other),
        }
        assert_eq!(metrics.predictions(), 1);
        assert_eq!(metrics.derived_scheduled(), 1);
    }

    #[tokio::test]
    async fn test_empty_prediction_sends_nothing() {
        let payloads = Arc::new(Mutex::new(Vec::new()));
        let endpoint = Arc::new(RecordingEndpoint {
            payloads: Arc::clone(&payloads),
        });
        let calls = Arc::new(AtomicU64::new(0));
        let predictor = Arc::new(FixedPredictor {
            result: None,
            calls: Arc::clone(&calls),
        });
        let tokens = Arc::new(StaticTokenProvider::new("tok"));
        let metrics = Arc::new(DispatchMetrics::new());

        let lane = PredictLane::spawn(predictor, tokens, endpoint, 10, Arc::clone(&metrics));
        lane.try_send(job(60));
        lane.shutdown().await;

        assert_eq!(calls.load(Ordering::Relaxed), 1);
        assert!(payloads.lock().unwrap().is_empty());
        assert_eq!(metrics.inference_empty(), 1);
        assert_eq!(metrics.derived_scheduled(), 0);
    }

    #[tokio::test]
    async fn test_inference_failure_is_contained() {
        let payloads = Arc::new(Mutex::new(Vec::new()));
        let endpoint = Arc::new(RecordingEndpoint {
            payloads: Arc::clone(&payloads),
        });
        let tokens = Arc::new(StaticTokenProvider::new("tok"));
        let metrics = Arc::new(DispatchMetrics::new());

        let lane = PredictLane::spawn(
            Arc::new(PanickyPredictor),
            tokens,
            endpoint,
            10,
            Arc::clone(&metrics),
        );
        lane.try_send(job(180));
        lane.try_send(job(181));
        lane.shutdown().await;

        assert!(payloads.lock().unwrap().is_empty());
        assert_eq!(metrics.inference_failures(), 2);
    }

    #[tokio::test]
    async fn test_queue_full_drops_job() {
        let payloads = Arc::new(Mutex::new(Vec::new()));
        let endpoint = Arc::new(RecordingEndpoint {
            payloads: Arc::clone(&payloads),
        });
        // Worker that never drains quickly
        struct SlowPredictor;
        impl Predictor for SlowPredictor {
            async fn predict(
                &self,
                _signal: &RawSignal,
            ) -> Result<Option<Prediction>, PipelineError> {
                sleep(Duration::from_millis(100)).await;
                Ok(None)
            }
        }

        let tokens = Arc::new(StaticTokenProvider::new("tok"));
        let metrics = Arc::new(DispatchMetrics::new());
        let lane = PredictLane::spawn(
            Arc::new(SlowPredictor),
            tokens,
            endpoint,
            1,
            Arc::clone(&metrics),
        );

        for i in 0..10 {
            lane.try_send(job(60 + i));
        }
        assert!(metrics.predict_dropped() > 0);

        lane.shutdown().await;
    }
}
