//! # Dispatcher
//!
//! The event-dispatch core of the uplink pipeline.
//!
//! Responsibilities:
//! - Accept raw signals through `SignalHandler::on_signal` without blocking
//! - Schedule the raw send before inference is initiated
//! - Run the predictor off the signal path and schedule a derived send only
//!   when it yields a prediction
//! - Isolate auth/transport/inference failures inside their lane

pub mod dispatcher;
pub mod endpoints;
pub mod error;
pub mod lane;
pub mod metrics;
pub mod predict;

pub use contracts::{EndpointClient, Payload, SignalHandler};
pub use dispatcher::{Dispatcher, DispatcherConfig};
pub use endpoints::{CollectorEndpoint, LogEndpoint, UdpEndpoint};
pub use error::DispatcherError;
pub use lane::SendLane;
pub use metrics::{DispatchMetrics, DispatchSnapshot};
pub use predict::{PredictJob, PredictLane};
