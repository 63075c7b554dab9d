//! Credential - opaque bearer token for outbound sends
//!
//! The pipeline only passes credentials through; it never inspects or
//! persists them. `Debug` output is redacted so tokens cannot leak through
//! structured logs.

use std::fmt;
use std::sync::Arc;

/// Opaque bearer token
#[derive(Clone)]
pub struct Credential(Arc<str>);

impl Credential {
    /// Wrap a token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(Arc::from(token.into()))
    }

    /// Expose the token for the transport layer.
    ///
    /// Callers must not log the returned value.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Credential {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(****)")
    }
}
