//! Layered error definitions
//!
//! Categorized by source: validation / inference / auth / transport / config

use thiserror::Error;

/// Unified error type
///
/// Only `Validation` is ever surfaced synchronously to the sensor-layer
/// caller. Everything downstream of scheduling stays inside the lane that
/// produced it and is observed through logs and metrics.
#[derive(Debug, Error)]
pub enum PipelineError {
    // ===== Validation Errors =====
    /// Malformed descriptor or signal, fatal to the single event
    #[error("validation error at '{field}': {message}")]
    Validation { field: String, message: String },

    // ===== Inference Errors =====
    /// Predictor failure, degrades to "no prediction"
    #[error("inference error: {message}")]
    Inference { message: String },

    /// Predictor exceeded its execution-time budget
    #[error("inference timed out after {budget_ms}ms")]
    InferenceTimeout { budget_ms: u64 },

    // ===== Outbound Errors =====
    /// No valid credential obtainable for a send
    #[error("auth error: {message}")]
    Auth { message: String },

    /// Endpoint transmission failure
    #[error("transport error on endpoint '{endpoint}': {message}")]
    Transport { endpoint: String, message: String },

    // ===== Configuration Errors =====
    /// Blueprint parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Blueprint validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl PipelineError {
    /// Create a validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an inference error
    pub fn inference(message: impl Into<String>) -> Self {
        Self::Inference {
            message: message.into(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// True for errors that must never cross the lane boundary
    pub fn is_send_local(&self) -> bool {
        matches!(
            self,
            Self::Auth { .. } | Self::Transport { .. } | Self::Inference { .. }
        )
    }
}
