//! EndpointClient trait - remote collection service abstraction

use crate::{Credential, Payload, PipelineError};

/// Remote sink trait
///
/// Accepts a typed payload plus credential and performs the transmission.
/// Callers on the signal path never await a send directly; lanes own the
/// awaiting and report failures only through logs and metrics.
#[trait_variant::make(EndpointClient: Send)]
pub trait LocalEndpointClient {
    /// Endpoint name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Transmit one payload.
    ///
    /// # Errors
    /// `PipelineError::Transport` on transmission failure. The wire encoding
    /// is this implementation's concern.
    async fn send(&self, payload: &Payload, credential: &Credential)
        -> Result<(), PipelineError>;
}
