//! The authentication service call: fetches a bearer token
//!
//! On a successful fetch the received token is written into the shared
//! [`AuthToken`](crate::auth::AuthToken) before the success callback runs,
//! so the next request from any service carries it.

use std::sync::Arc;

use reqwest::Url;

use crate::config::ServiceSettings;
use crate::error::Result;
use crate::models::AuthResponse;
use crate::query::{FieldChange, Query};

use super::core::{CallCore, PayloadHook, QueryObserver, ServiceDeps};

/// Per-endpoint service call for token acquisition.
#[derive(Clone)]
pub struct Authentication {
    core: Arc<CallCore<AuthResponse>>,
}

impl Authentication {
    pub(crate) fn new(
        base: &Url,
        settings: ServiceSettings<AuthResponse>,
        deps: ServiceDeps,
    ) -> Result<Self> {
        let auth = deps.auth.clone();
        let store_token: PayloadHook<AuthResponse> = Arc::new(move |response: &AuthResponse| {
            if !response.token.is_empty() {
                auth.set(response.token.clone());
            }
        });
        Ok(Self {
            core: CallCore::new(
                "authentication",
                base,
                settings,
                deps,
                build_params,
                Some(store_token),
            )?,
        })
    }

    /// Dispatch a token fetch immediately. Respects a deferred state.
    pub fn update(&self) {
        self.core.update();
    }

    /// Toggle deferring for this call only.
    pub fn defer_updates(&self, state: bool, skip_pending: bool) {
        self.core.defer_updates(state, skip_pending);
    }

    /// Whether this call is currently deferring.
    pub fn defer_state(&self) -> bool {
        self.core.defer_state()
    }

    /// Whether an update would run: enabled and a success callback is set.
    pub fn should_update(&self) -> bool {
        self.core.should_update()
    }
}

impl QueryObserver for Authentication {
    fn query_changed(&self, change: &FieldChange) {
        self.core.query_changed(change);
    }

    fn defer_updates(&self, state: bool, skip_pending: bool) {
        self.core.defer_updates(state, skip_pending);
    }

    fn clear_pending(&self) {
        self.core.clear_pending();
    }
}

fn build_params(url: &mut Url, query: &Query) {
    if !query.client_id.is_empty() {
        url.query_pairs_mut().append_pair("clientId", &query.client_id);
    }
}
