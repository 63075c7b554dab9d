//! # Inference
//!
//! Predictor adapters for the uplink pipeline.
//!
//! Responsibilities:
//! - Bound any predictor with an execution-time budget (`BoundedPredictor`)
//! - Provide the built-in threshold risk model (`HeartRiskModel`)

mod bounded;
mod risk_model;

pub use bounded::BoundedPredictor;
pub use contracts::{Prediction, Predictor};
pub use risk_model::HeartRiskModel;
