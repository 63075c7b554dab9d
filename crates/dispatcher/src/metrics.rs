//! Dispatch metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one dispatcher instance
///
/// Shared between the caller-facing handle and the lane workers, so every
/// field is an atomic updated with relaxed ordering.
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Raw payloads handed to the send lane
    raw_scheduled: AtomicU64,
    /// Derived payloads scheduled after inference
    derived_scheduled: AtomicU64,
    /// Sends completed by the endpoint
    sends_completed: AtomicU64,
    /// Sends failed in transport
    send_failures: AtomicU64,
    /// Sends that never started because no credential was obtainable
    auth_failures: AtomicU64,
    /// Inference runs that produced a prediction
    predictions: AtomicU64,
    /// Inference runs with no actionable prediction
    inference_empty: AtomicU64,
    /// Inference failures (degraded to "no prediction")
    inference_failures: AtomicU64,
    /// Inference runs cut off by the time budget
    inference_timeouts: AtomicU64,
    /// Raw payloads dropped on a full queue
    raw_dropped: AtomicU64,
    /// Predict jobs dropped on a full queue
    predict_dropped: AtomicU64,
    /// Signals rejected by descriptor validation
    validation_failures: AtomicU64,
}

macro_rules! counter_accessors {
    ($($field:ident => $inc:ident),* $(,)?) => {
        $(
            pub fn $field(&self) -> u64 {
                self.$field.load(Ordering::Relaxed)
            }

            pub fn $inc(&self) {
                self.$field.fetch_add(1, Ordering::Relaxed);
            }
        )*
    };
}

impl DispatchMetrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    counter_accessors! {
        raw_scheduled => inc_raw_scheduled,
        derived_scheduled => inc_derived_scheduled,
        sends_completed => inc_sends_completed,
        send_failures => inc_send_failures,
        auth_failures => inc_auth_failures,
        predictions => inc_predictions,
        inference_empty => inc_inference_empty,
        inference_failures => inc_inference_failures,
        inference_timeouts => inc_inference_timeouts,
        raw_dropped => inc_raw_dropped,
        predict_dropped => inc_predict_dropped,
        validation_failures => inc_validation_failures,
    }

    /// Get a snapshot of all counters
    pub fn snapshot(&self) -> DispatchSnapshot {
        DispatchSnapshot {
            raw_scheduled: self.raw_scheduled(),
            derived_scheduled: self.derived_scheduled(),
            sends_completed: self.sends_completed(),
            send_failures: self.send_failures(),
            auth_failures: self.auth_failures(),
            predictions: self.predictions(),
            inference_empty: self.inference_empty(),
            inference_failures: self.inference_failures(),
            inference_timeouts: self.inference_timeouts(),
            raw_dropped: self.raw_dropped(),
            predict_dropped: self.predict_dropped(),
            validation_failures: self.validation_failures(),
        }
    }
}

/// Snapshot of dispatch metrics (for reporting)
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchSnapshot {
    pub raw_scheduled: u64,
    pub derived_scheduled: u64,
    pub sends_completed: u64,
    pub send_failures: u64,
    pub auth_failures: u64,
    pub predictions: u64,
    pub inference_empty: u64,
    pub inference_failures: u64,
    pub inference_timeouts: u64,
    pub raw_dropped: u64,
    pub predict_dropped: u64,
    pub validation_failures: u64,
}

impl DispatchSnapshot {
    /// Total payloads scheduled across both lanes
    pub fn total_scheduled(&self) -> u64 {
        self.raw_scheduled + self.derived_scheduled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = DispatchMetrics::new();
        metrics.inc_raw_scheduled();
        metrics.inc_raw_scheduled();
        metrics.inc_derived_scheduled();
        metrics.inc_auth_failures();

        let snap = metrics.snapshot();
        assert_eq!(snap.raw_scheduled, 2);
        assert_eq!(snap.derived_scheduled, 1);
        assert_eq!(snap.auth_failures, 1);
        assert_eq!(snap.total_scheduled(), 3);
    }
}
