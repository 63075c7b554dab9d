//! Endpoint client implementations
//!
//! Contains LogEndpoint and UdpEndpoint, plus the config-driven
//! `CollectorEndpoint` wrapper.

mod log;
mod network;

pub use self::log::LogEndpoint;
pub use self::network::{UdpEndpoint, UdpEndpointConfig, WireFormat};

use contracts::{Credential, EndpointClient, EndpointConfig, EndpointType, Payload, PipelineError};

use crate::error::DispatcherError;

/// Endpoint selected from a `PipelineBlueprint`
///
/// A closed enum instead of trait objects: `EndpointClient` is not
/// dyn-compatible, and the set of built-in transports is fixed.
pub enum CollectorEndpoint {
    Log(LogEndpoint),
    Udp(UdpEndpoint),
}

impl CollectorEndpoint {
    /// Create an endpoint from configuration
    pub async fn from_config(config: &EndpointConfig) -> Result<Self, DispatcherError> {
        match config.endpoint_type {
            EndpointType::Log => Ok(Self::Log(LogEndpoint::new(&config.name))),
            EndpointType::Udp => {
                let endpoint = UdpEndpoint::from_params(&config.name, &config.params)
                    .await
                    .map_err(|e| DispatcherError::endpoint_creation(&config.name, e.to_string()))?;
                Ok(Self::Udp(endpoint))
            }
        }
    }
}

impl EndpointClient for CollectorEndpoint {
    fn name(&self) -> &str {
        match self {
            Self::Log(e) => e.name(),
            Self::Udp(e) => e.name(),
        }
    }

    async fn send(
        &self,
        payload: &Payload,
        credential: &Credential,
    ) -> Result<(), PipelineError> {
        match self {
            Self::Log(e) => e.send(payload, credential).await,
            Self::Udp(e) => e.send(payload, credential).await,
        }
    }
}
