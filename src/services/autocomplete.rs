//! The autocomplete service call: fetches suggestions for the current text

use std::sync::Arc;

use reqwest::Url;

use crate::config::ServiceSettings;
use crate::error::Result;
use crate::models::Suggestions;
use crate::query::{FieldChange, Query};

use super::core::{CallCore, QueryObserver, ServiceDeps};

/// Per-endpoint service call for query suggestions.
#[derive(Clone)]
pub struct Autocomplete {
    core: Arc<CallCore<Suggestions>>,
}

impl Autocomplete {
    pub(crate) fn new(
        base: &Url,
        settings: ServiceSettings<Suggestions>,
        deps: ServiceDeps,
    ) -> Result<Self> {
        Ok(Self {
            core: CallCore::new("autocomplete", base, settings, deps, build_params, None)?,
        })
    }

    /// Dispatch immediately with the current query, bypassing trigger
    /// evaluation. Respects a deferred state.
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

impl QueryObserver for Autocomplete {
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
    url.query_pairs_mut()
        .append_pair("queryText", &query.query_text)
        .append_pair("maxSuggestions", &query.max_suggestions.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_carries_text_and_limit() {
        let query = Query {
            query_text: "qua".to_string(),
            max_suggestions: 5,
            ..Default::default()
        };
        let mut url = Url::parse("http://localhost:9950/RestService/v4/autocomplete").unwrap();
        build_params(&mut url, &query);
        let params = url.query().unwrap();
        assert!(params.contains("queryText=qua"));
        assert!(params.contains("maxSuggestions=5"));
    }
}
