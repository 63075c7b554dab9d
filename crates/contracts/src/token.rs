//! TokenProvider trait - credential supply for outbound sends

use crate::{Credential, PipelineError};

/// Credential provider trait
///
/// Shared across all send lanes; implementations must be safe for concurrent
/// invocation. Caching, refresh and expiry are the implementation's concern;
/// the dispatcher requests a token per send and treats a failure as that
/// send's failure only.
#[trait_variant::make(TokenProvider: Send)]
pub trait LocalTokenProvider {
    /// Obtain a credential for one outbound send.
    ///
    /// # Errors
    /// `PipelineError::Auth` when no valid credential is currently obtainable.
    async fn token(&self) -> Result<Credential, PipelineError>;
}

/// Fixed-token provider, for tests and demo runs.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    credential: Credential,
}

impl StaticTokenProvider {
    /// Create a provider that always hands out the same token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            credential: Credential::new(token),
        }
    }
}

impl TokenProvider for StaticTokenProvider {
    async fn token(&self) -> Result<Credential, PipelineError> {
        Ok(self.credential.clone())
    }
}
