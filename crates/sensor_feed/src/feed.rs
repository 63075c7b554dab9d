//! SensorFeed - wires signal sources into a handler
//!
//! Owns a set of sources and the callback glue between them and the
//! dispatcher. Rejected events (synchronous validation failures) are counted
//! and logged here; they never reach a queue.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use contracts::{SignalHandler, SignalSource};

/// Counters for events crossing the feed boundary
#[derive(Debug, Default)]
pub struct FeedMetrics {
    emitted: AtomicU64,
    rejected: AtomicU64,
}

impl FeedMetrics {
    fn inc_emitted(&self) {
        self.emitted.fetch_add(1, Ordering::Relaxed);
    }

    fn inc_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Events delivered to the handler
    pub fn emitted(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }

    /// Events the handler rejected synchronously
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    /// Point-in-time copy of the counters
    pub fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            emitted: self.emitted(),
            rejected: self.rejected(),
        }
    }
}

/// Point-in-time copy of `FeedMetrics`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSnapshot {
    pub emitted: u64,
    pub rejected: u64,
}

/// A set of signal sources attached to one handler
pub struct SensorFeed {
    sources: Vec<Arc<dyn SignalSource>>,
    handler: Arc<dyn SignalHandler>,
    metrics: Arc<FeedMetrics>,
}

impl SensorFeed {
    /// Create an empty feed delivering into `handler`.
    pub fn new(handler: Arc<dyn SignalHandler>) -> Self {
        Self {
            sources: Vec::new(),
            handler,
            metrics: Arc::new(FeedMetrics::default()),
        }
    }

    /// Add a source. Takes effect on the next `start`.
    pub fn add_source(&mut self, source: Arc<dyn SignalSource>) {
        self.sources.push(source);
    }

    /// Number of registered sources
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Shared feed counters
    pub fn metrics(&self) -> Arc<FeedMetrics> {
        self.metrics.clone()
    }

    /// Start every registered source.
    ///
    /// Each source gets a callback that forwards into the handler. A
    /// rejected event is logged and counted; the source keeps producing.
    pub fn start(&self) {
        for source in &self.sources {
            let handler = self.handler.clone();
            let metrics = self.metrics.clone();

            source.listen(Arc::new(move |signal, descriptor| {
                match handler.on_signal(signal, descriptor) {
                    Ok(()) => metrics.inc_emitted(),
                    Err(e) => {
                        metrics.inc_rejected();
                        warn!(error = %e, "Signal rejected at the feed boundary");
                    }
                }
            }));

            info!(
                device_id = source.device_id(),
                sensor_id = source.sensor_id(),
                "Sensor source listening"
            );
        }
    }

    /// Stop every registered source.
    pub fn stop_all(&self) {
        for source in &self.sources {
            source.stop();
        }
        info!(sources = self.sources.len(), "Sensor feed stopped");
    }

    /// True if any source is still listening
    pub fn is_active(&self) -> bool {
        self.sources.iter().any(|s| s.is_listening())
    }
}
