//! The categorize service call: fetches the category tree for the current query

use std::sync::Arc;

use chrono::Utc;
use reqwest::Url;

use crate::config::ServiceSettings;
use crate::error::Result;
use crate::models::Categories;
use crate::query::{FieldChange, Query};

use super::core::{CallCore, QueryObserver, ServiceDeps};

/// Per-endpoint service call for category statistics.
#[derive(Clone)]
pub struct Categorize {
    core: Arc<CallCore<Categories>>,
}

impl Categorize {
    pub(crate) fn new(
        base: &Url,
        settings: ServiceSettings<Categories>,
        deps: ServiceDeps,
    ) -> Result<Self> {
        Ok(Self {
            core: CallCore::new("categorize", base, settings, deps, build_params, None)?,
        })
    }

    /// Dispatch immediately with the current query, bypassing trigger
    /// evaluation. Respects a deferred state.
    pub fn update(&self) {
        self.core.update();
    }

    /// Like [`update`](Self::update) with callbacks suppressed.
    pub fn update_suppressing_callbacks(&self) {
        self.core.update_suppressing_callbacks();
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

impl QueryObserver for Categorize {
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
    let now = Utc::now();
    let mut pairs = url.query_pairs_mut();
    pairs
        .append_pair("queryText", &query.query_text)
        .append_pair("searchType", &query.search_type.to_string())
        .append_pair("categorizationType", &query.categorization_type.to_string());
    if let Some(from) = &query.date_from {
        pairs.append_pair("dateFrom", &from.resolve(now).to_rfc3339());
    }
    if let Some(to) = &query.date_to {
        pairs.append_pair("dateTo", &to.resolve(now).to_rfc3339());
    }
    if !query.filters.is_empty() {
        pairs.append_pair("filters", &query.filters.join(";"));
    }
    if !query.ui_language_code.is_empty() {
        pairs.append_pair("uiLanguageCode", &query.ui_language_code);
    }
    if !query.client_id.is_empty() {
        pairs.append_pair("clientId", &query.client_id);
    }
}
