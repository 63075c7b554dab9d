//! BoundedPredictor - wraps any predictor with an execution-time budget
//!
//! A predictor that stalls must never stall the pipeline. The budget is
//! enforced here, at the adapter layer, so every model gets the same
//! treatment regardless of how it is implemented.

use std::time::{Duration, Instant};

use tracing::{instrument, warn};

use contracts::{PipelineError, Prediction, Predictor, RawSignal};

/// Wraps an inner predictor and aborts any invocation that exceeds the
/// configured budget.
///
/// On timeout the wrapped future is dropped and the call resolves to
/// `PipelineError::InferenceTimeout`; the dispatcher degrades that to
/// "no prediction" for the event.
pub struct BoundedPredictor<P> {
    inner: P,
    budget: Duration,
}

impl<P> BoundedPredictor<P> {
    /// Wrap `inner` with the given budget in milliseconds.
    pub fn new(inner: P, budget_ms: u64) -> Self {
        Self {
            inner,
            budget: Duration::from_millis(budget_ms),
        }
    }

    /// The configured budget.
    pub fn budget(&self) -> Duration {
        self.budget
    }
}

impl<P> Predictor for BoundedPredictor<P>
where
    P: Predictor + Sync,
{
    #[instrument(name = "bounded_predict", skip(self, signal), fields(kind = signal.kind()))]
    async fn predict(&self, signal: &RawSignal) -> Result<Option<Prediction>, PipelineError> {
        let started = Instant::now();

        let outcome = tokio::time::timeout(self.budget, self.inner.predict(signal)).await;

        let elapsed_ms = started.elapsed().as_millis() as f64;
        observability::record_inference_latency_ms(elapsed_ms);

        match outcome {
            Ok(result) => result,
            Err(_) => {
                let budget_ms = self.budget.as_millis() as u64;
                warn!(budget_ms, kind = signal.kind(), "Predictor exceeded budget");
                Err(PipelineError::InferenceTimeout { budget_ms })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Predictor that returns a fixed score immediately
    struct InstantPredictor;

    impl Predictor for InstantPredictor {
        async fn predict(
            &self,
            _signal: &RawSignal,
        ) -> Result<Option<Prediction>, PipelineError> {
            Ok(Some(Prediction::new(0.5)))
        }
    }

    /// Predictor that sleeps far beyond any reasonable budget
    struct StallingPredictor;

    impl Predictor for StallingPredictor {
        async fn predict(
            &self,
            _signal: &RawSignal,
        ) -> Result<Option<Prediction>, PipelineError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(None)
        }
    }

    /// Predictor that always fails
    struct BrokenPredictor;

    impl Predictor for BrokenPredictor {
        async fn predict(
            &self,
            _signal: &RawSignal,
        ) -> Result<Option<Prediction>, PipelineError> {
            Err(PipelineError::inference("model unavailable"))
        }
    }

    #[tokio::test]
    async fn test_fast_predictor_passes_through() {
        let bounded = BoundedPredictor::new(InstantPredictor, 250);
        let result = bounded
            .predict(&RawSignal::HeartRate { bpm: 72 })
            .await
            .unwrap();
        assert_eq!(result, Some(Prediction::new(0.5)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_predictor_times_out() {
        let bounded = BoundedPredictor::new(StallingPredictor, 50);
        let result = bounded.predict(&RawSignal::HeartRate { bpm: 72 }).await;
        assert!(matches!(
            result,
            Err(PipelineError::InferenceTimeout { budget_ms: 50 })
        ));
    }

    #[tokio::test]
    async fn test_inner_error_passes_through() {
        let bounded = BoundedPredictor::new(BrokenPredictor, 250);
        let result = bounded.predict(&RawSignal::HeartRate { bpm: 72 }).await;
        assert!(matches!(result, Err(PipelineError::Inference { .. })));
    }
}
