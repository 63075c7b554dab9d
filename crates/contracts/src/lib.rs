//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Wall-clock epoch seconds (i64) as primary timestamp, second precision
//! - `TimeBucket` coarse-grains the time of day for downstream labelling

mod blueprint;
mod credential;
mod descriptor;
mod endpoint;
mod error;
mod handler;
mod ids;
mod payload;
mod predictor;
mod signal;
mod token;

pub use blueprint::*;
pub use credential::Credential;
pub use descriptor::{SignalDescriptor, TimeBucket};
pub use endpoint::EndpointClient;
pub use error::PipelineError;
pub use handler::{SignalCallback, SignalHandler, SignalSource};
pub use ids::{DeviceId, SensorId};
pub use payload::{DerivedPayload, Payload, Prediction, RawPayload};
pub use predictor::Predictor;
pub use signal::RawSignal;
pub use token::{StaticTokenProvider, TokenProvider};
