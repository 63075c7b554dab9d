//! Predictor trait - local inference capability

use crate::{PipelineError, Prediction, RawSignal};

/// Inference trait
///
/// Stateless from the caller's view; shared across events and safe for
/// concurrent invocation. `Ok(None)` is the normal "no actionable
/// prediction" outcome, not a failure.
#[trait_variant::make(Predictor: Send)]
pub trait LocalPredictor {
    /// Run inference over one raw signal.
    ///
    /// # Errors
    /// `PipelineError::Inference` on model failure; the dispatcher degrades
    /// this to an empty result.
    async fn predict(&self, signal: &RawSignal) -> Result<Option<Prediction>, PipelineError>;
}
