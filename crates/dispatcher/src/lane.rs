//! SendLane - raw payload queue with an isolated send worker
//!
//! The caller side only ever calls `try_send`, so a slow or unreachable
//! endpoint can never back up into the sensor callback.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use contracts::{EndpointClient, Payload, TokenProvider};

use crate::metrics::DispatchMetrics;

/// Handle to a running send worker
pub struct SendLane {
    /// Channel to hand payloads to the worker
    tx: mpsc::Sender<Payload>,
    /// Shared metrics
    metrics: Arc<DispatchMetrics>,
    /// Worker task handle
    worker_handle: JoinHandle<()>,
}

impl SendLane {
    /// Create a new SendLane and spawn its worker task
    pub fn spawn<E, T>(
        endpoint: Arc<E>,
        tokens: Arc<T>,
        queue_capacity: usize,
        metrics: Arc<DispatchMetrics>,
    ) -> Self
    where
        E: EndpointClient + Send + Sync + 'static,
        T: TokenProvider + Send + Sync + 'static,
    {
        let (tx, rx) = mpsc::channel(queue_capacity);

        let worker_metrics = Arc::clone(&metrics);
        let worker_handle = tokio::spawn(async move {
            send_worker(endpoint, tokens, rx, worker_metrics).await;
        });

        Self {
            tx,
            metrics,
            worker_handle,
        }
    }

    /// Hand a payload to the worker (non-blocking)
    ///
    /// Returns true if scheduled, false if the queue was full and the
    /// payload was dropped.
    pub fn try_send(&self, payload: Payload) -> bool {
        match self.tx.try_send(payload) {
            Ok(()) => {
                self.metrics.inc_raw_scheduled();
                observability::record_payload_scheduled("raw");
                true
            }
            Err(mpsc::error::TrySendError::Full(p)) => {
                self.metrics.inc_raw_dropped();
                observability::record_payload_dropped("raw");
                warn!(
                    sensor_id = %p.sensor_id(),
                    timestamp = p.timestamp(),
                    "Raw queue full, payload dropped"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!("Send worker closed unexpectedly");
                false
            }
        }
    }

    /// Shutdown the send worker gracefully, draining queued payloads
    #[instrument(name = "send_lane_shutdown", skip(self))]
    pub async fn shutdown(self) {
        // Drop sender to signal worker to stop
        drop(self.tx);
        // Wait for worker to finish
        if let Err(e) = self.worker_handle.await {
            error!(error = ?e, "Send worker panicked");
        }
        debug!("SendLane shutdown complete");
    }
}

/// Worker task that consumes payloads and pushes them to the endpoint
async fn send_worker<E, T>(
    endpoint: Arc<E>,
    tokens: Arc<T>,
    mut rx: mpsc::Receiver<Payload>,
    metrics: Arc<DispatchMetrics>,
) where
    E: EndpointClient + Send + Sync,
    T: TokenProvider + Send + Sync,
{
    debug!(endpoint = endpoint.name(), "Send worker started");

    while let Some(payload) = rx.recv().await {
        observability::record_queue_depth("raw", rx.len());
        send_with_token(endpoint.as_ref(), tokens.as_ref(), &payload, &metrics).await;
    }

    debug!(endpoint = endpoint.name(), "Send worker stopped");
}

/// Fetch a credential and perform one endpoint send.
///
/// Auth and transport failures are terminal for this payload only; they are
/// counted, logged and never propagated. Shared by both lanes so the two
/// sends of one event fail independently.
pub(crate) async fn send_with_token<E, T>(
    endpoint: &E,
    tokens: &T,
    payload: &Payload,
    metrics: &DispatchMetrics,
) where
    E: EndpointClient + Send + Sync,
    T: TokenProvider + Send + Sync,
{
    let credential = match tokens.token().await {
        Ok(credential) => credential,
        Err(e) => {
            metrics.inc_auth_failures();
            observability::record_auth_failure(endpoint.name());
            error!(
                endpoint = endpoint.name(),
                kind = payload.kind(),
                error = %e,
                "Credential unavailable, send skipped"
            );
            return;
        }
    };

    match endpoint.send(payload, &credential).await {
        Ok(()) => {
            metrics.inc_sends_completed();
            observability::record_send_result(endpoint.name(), true);
        }
        Err(e) => {
            metrics.inc_send_failures();
            observability::record_send_result(endpoint.name(), false);
            error!(
                endpoint = endpoint.name(),
                kind = payload.kind(),
                sensor_id = %payload.sensor_id(),
                error = %e,
                "Send failed"
            );
            // Continue processing, a single failed send never stops the lane
        }
    }
}
