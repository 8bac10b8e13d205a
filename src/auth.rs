//! Shared bearer-token handle
//!
//! One [`AuthToken`] is created per client and cloned into every service
//! call. Setting or clearing the token is visible to the next request built
//! by any service, with no re-wiring.

use std::sync::Arc;

use parking_lot::RwLock;

/// Cheap-to-clone handle to the optional bearer token.
#[derive(Debug, Clone, Default)]
pub struct AuthToken {
    inner: Arc<RwLock<Option<String>>>,
}

impl AuthToken {
    /// Create an empty token handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a handle pre-loaded with a token.
    pub fn with_token(token: impl Into<String>) -> Self {
        let handle = Self::new();
        handle.set(token);
        handle
    }

    /// Current token, if any.
    pub fn get(&self) -> Option<String> {
        self.inner.read().clone()
    }

    /// Whether a token is present.
    pub fn is_set(&self) -> bool {
        self.inner.read().is_some()
    }

    /// Attach a token. Subsequent requests from every service carry it.
    pub fn set(&self, token: impl Into<String>) {
        *self.inner.write() = Some(token.into());
    }

    /// Detach the token.
    pub fn clear(&self) {
        *self.inner.write() = None;
    }
}
