//! SignalHandler / SignalSource - the sensor-layer boundary
//!
//! The sensor subsystem delivers events through a single-method capability
//! contract instead of a class hierarchy. Sources push events through a
//! shared callback, consistent with how wearable sensor drivers deliver data.

use std::sync::Arc;

use crate::{PipelineError, RawSignal, SignalDescriptor};

/// Inbound capability contract implemented by the dispatcher.
///
/// Called by the sensor layer on its own timing. Implementations MUST return
/// promptly and MUST NOT perform network I/O synchronously. The only error a
/// caller ever sees is a synchronous `Validation` failure; everything
/// downstream of scheduling is invisible here.
pub trait SignalHandler: Send + Sync {
    /// Accept one raw signal with its descriptor.
    fn on_signal(
        &self,
        signal: RawSignal,
        descriptor: SignalDescriptor,
    ) -> Result<(), PipelineError>;
}

/// Sensor event callback type
///
/// Uses `Arc` to allow callback sharing across multiple sources.
pub type SignalCallback = Arc<dyn Fn(RawSignal, SignalDescriptor) + Send + Sync>;

/// Sensor data source trait
///
/// Abstracts real device drivers and mock sources behind one interface so
/// the feed layer can wire either into a `SignalHandler`.
pub trait SignalSource: Send + Sync {
    /// Device this source belongs to
    fn device_id(&self) -> &str;

    /// Sensor id within the device
    fn sensor_id(&self) -> &str;

    /// Register the event callback
    ///
    /// Repeated calls while already listening are idempotent.
    fn listen(&self, callback: SignalCallback);

    /// Stop producing events
    fn stop(&self);

    /// Check if currently listening
    fn is_listening(&self) -> bool;
}
