//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
///
/// These cover construction and configuration only. Per-event errors stay in
/// `contracts::PipelineError` and, apart from validation, never leave the
/// lane that produced them.
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Endpoint creation error
    #[error("failed to create endpoint '{name}': {message}")]
    EndpointCreation { name: String, message: String },

    /// Contract-level error
    #[error("pipeline error: {0}")]
    Contract(#[from] contracts::PipelineError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DispatcherError {
    /// Create an endpoint creation error
    pub fn endpoint_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EndpointCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}
