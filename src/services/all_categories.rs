//! The all-categories service call: fetches the full category tree

use std::sync::Arc;

use reqwest::Url;

use crate::config::ServiceSettings;
use crate::error::Result;
use crate::models::Categories;
use crate::query::{FieldChange, Query};

use super::core::{CallCore, QueryObserver, ServiceDeps};

/// Per-endpoint service call for the complete category tree, independent of
/// any query.
#[derive(Clone)]
pub struct AllCategories {
    core: Arc<CallCore<Categories>>,
}

impl AllCategories {
    pub(crate) fn new(
        base: &Url,
        settings: ServiceSettings<Categories>,
        deps: ServiceDeps,
    ) -> Result<Self> {
        Ok(Self {
            core: CallCore::new("allcategories", base, settings, deps, build_params, None)?,
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

impl QueryObserver for AllCategories {
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
    if !query.ui_language_code.is_empty() {
        url.query_pairs_mut()
            .append_pair("uiLanguageCode", &query.ui_language_code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_hint_only_when_set() {
        let mut url = Url::parse("http://localhost:9950/RestService/v4/allcategories").unwrap();
        build_params(&mut url, &Query::default());
        assert!(url.query().is_none());

        let query = Query {
            ui_language_code: "nb".to_string(),
            ..Default::default()
        };
        let mut url = Url::parse("http://localhost:9950/RestService/v4/allcategories").unwrap();
        build_params(&mut url, &query);
        assert_eq!(url.query(), Some("uiLanguageCode=nb"));
    }
}
