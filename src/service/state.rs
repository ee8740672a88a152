//! Service state management.
//!
//! The store handle and the token service are created once at startup and
//! shared with every handler through axum state. There is no other shared
//! state between requests.

use std::sync::Arc;

use crate::auth::{AdminCredential, TokenConfig, TokenService};
use crate::store::RecordStore;

/// Shared service state.
pub struct ServiceState<S: RecordStore + 'static> {
    /// The record store backend.
    pub store: Arc<S>,
    /// Admin token issuer and verifier.
    pub tokens: Arc<TokenService>,
}

impl<S: RecordStore + 'static> ServiceState<S> {
    /// Create service state from a store and a ready token service.
    pub fn new(store: S, tokens: TokenService) -> Self {
        Self {
            store: Arc::new(store),
            tokens: Arc::new(tokens),
        }
    }

    /// Create service state for the given admin credential and signing config.
    pub fn with_admin(store: S, credential: AdminCredential, token_config: TokenConfig) -> Self {
        Self::new(store, TokenService::new(credential, token_config))
    }
}

impl<S: RecordStore + 'static> Clone for ServiceState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            tokens: Arc::clone(&self.tokens),
        }
    }
}
