//! UdpEndpoint - UDP fire-and-forget transmission to the collection service
//!
//! Each payload is wrapped in a bearer envelope and sent as one datagram.
//! Delivery is best-effort; sustained failures surface through the endpoint's
//! own logs and metrics, never through the dispatcher.

use std::collections::HashMap;
use std::net::SocketAddr;

use serde::Serialize;
use tokio::net::UdpSocket;
use tracing::{debug, instrument, warn};

use contracts::{Credential, EndpointClient, Payload, PipelineError};

/// Serialization format for network transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireFormat {
    /// JSON (human-readable, larger)
    #[default]
    Json,
    /// Bincode (binary, compact)
    Bincode,
}

/// Configuration for UdpEndpoint
#[derive(Debug, Clone)]
pub struct UdpEndpointConfig {
    /// Collector address
    pub addr: SocketAddr,
    /// Serialization format
    pub format: WireFormat,
    /// Max datagram size (UDP typically 65507 for IPv4)
    pub max_packet_size: usize,
}

impl UdpEndpointConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let addr_str = params
            .get("addr")
            .ok_or_else(|| "missing 'addr' parameter".to_string())?;

        let addr: SocketAddr = addr_str
            .parse()
            .map_err(|e| format!("invalid address '{}': {}", addr_str, e))?;

        let format = match params.get("format").map(String::as_str) {
            Some("bincode") => WireFormat::Bincode,
            Some("json") | None => WireFormat::Json,
            Some(other) => return Err(format!("unknown format '{}'", other)),
        };

        let max_packet_size = params
            .get("max_packet_size")
            .and_then(|s| s.parse().ok())
            .unwrap_or(65000);

        Ok(Self {
            addr,
            format,
            max_packet_size,
        })
    }
}

/// Bearer envelope written to the wire
///
/// Borrowed fields: serialization happens before the datagram is cut, so
/// nothing here outlives one send.
#[derive(Serialize)]
struct WireEnvelope<'a> {
    token: &'a str,
    payload: &'a Payload,
}

/// Endpoint that sends payloads over UDP
pub struct UdpEndpoint {
    name: String,
    config: UdpEndpointConfig,
    socket: UdpSocket,
}

impl UdpEndpoint {
    /// Create a new UdpEndpoint
    #[instrument(name = "udp_endpoint_new", skip(name, config))]
    pub async fn new(name: impl Into<String>, config: UdpEndpointConfig) -> std::io::Result<Self> {
        let name = name.into();
        // Bind to any available port
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket.connect(&config.addr).await?;

        debug!(
            endpoint = %name,
            collector = %config.addr,
            "UdpEndpoint connected"
        );

        Ok(Self {
            name,
            config,
            socket,
        })
    }

    /// Create from params (for the config factory)
    pub async fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, PipelineError> {
        let name = name.into();
        let config = UdpEndpointConfig::from_params(params)
            .map_err(|e| PipelineError::transport(name.clone(), e))?;

        Self::new(name.clone(), config)
            .await
            .map_err(|e| PipelineError::transport(name, e.to_string()))
    }

    fn serialize_envelope(&self, envelope: &WireEnvelope<'_>) -> Result<Vec<u8>, String> {
        match self.config.format {
            WireFormat::Json => {
                serde_json::to_vec(envelope).map_err(|e| format!("json error: {}", e))
            }
            WireFormat::Bincode => {
                bincode::serialize(envelope).map_err(|e| format!("bincode error: {}", e))
            }
        }
    }

    fn prepare_datagram(
        &self,
        payload: &Payload,
        credential: &Credential,
    ) -> Result<Vec<u8>, PipelineError> {
        let envelope = WireEnvelope {
            token: credential.expose(),
            payload,
        };
        let data = self
            .serialize_envelope(&envelope)
            .map_err(|e| PipelineError::transport(&self.name, e))?;

        if data.len() > self.config.max_packet_size {
            warn!(
                endpoint = %self.name,
                size = data.len(),
                max = self.config.max_packet_size,
                "Datagram exceeds max packet size"
            );
            return Err(PipelineError::transport(
                &self.name,
                format!(
                    "datagram of {} bytes exceeds max packet size {}",
                    data.len(),
                    self.config.max_packet_size
                ),
            ));
        }

        Ok(data)
    }
}

impl EndpointClient for UdpEndpoint {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "udp_endpoint_send",
        skip(self, payload, credential),
        fields(endpoint = %self.name, kind = payload.kind())
    )]
    async fn send(
        &self,
        payload: &Payload,
        credential: &Credential,
    ) -> Result<(), PipelineError> {
        let data = self.prepare_datagram(payload, credential)?;

        match self.socket.send(&data).await {
            Ok(sent) => {
                debug!(
                    endpoint = %self.name,
                    kind = payload.kind(),
                    bytes = sent,
                    "Sent"
                );
                Ok(())
            }
            Err(e) => Err(PipelineError::transport(&self.name, e.to_string())),
        }
    }
}
