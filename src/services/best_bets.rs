//! The best-bets service call: fetches the curated recommendation list

use std::sync::Arc;

use reqwest::Url;

use crate::config::ServiceSettings;
use crate::error::Result;
use crate::models::BestBetList;
use crate::query::{FieldChange, Query};

use super::core::{CallCore, QueryObserver, ServiceDeps};

/// Per-endpoint service call for curated recommendations.
#[derive(Clone)]
pub struct BestBets {
    core: Arc<CallCore<BestBetList>>,
}

impl BestBets {
    pub(crate) fn new(
        base: &Url,
        settings: ServiceSettings<BestBetList>,
        deps: ServiceDeps,
    ) -> Result<Self> {
        Ok(Self {
            core: CallCore::new("bestbets", base, settings, deps, build_params, None)?,
        })
    }

    /// Dispatch immediately, bypassing trigger evaluation. Respects a
    /// deferred state.
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

impl QueryObserver for BestBets {
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

// The best-bets list is query-independent.
fn build_params(_url: &mut Url, _query: &Query) {}
