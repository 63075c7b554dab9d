//! # Sensor Feed
//!
//! The sensor layer of the uplink pipeline. Owns signal sources and wires
//! them into a `SignalHandler`.
//!
//! Responsibilities:
//! - Mock sensor sources for runs without device hardware (`MockSignalSource`)
//! - Feed lifecycle: attach sources to a handler, start, stop (`SensorFeed`)

mod feed;
mod mock;

pub use feed::{FeedMetrics, FeedSnapshot, SensorFeed};
pub use mock::{MockSignalConfig, MockSignalSource};
