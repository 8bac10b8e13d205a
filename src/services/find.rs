//! The find service call: fetches the match list for the current query

use std::sync::Arc;

use chrono::Utc;
use reqwest::Url;

use crate::config::ServiceSettings;
use crate::error::Result;
use crate::models::Matches;
use crate::query::{FieldChange, Query};

use super::core::{CallCore, QueryObserver, ServiceDeps};

/// Per-endpoint service call for search matches.
#[derive(Clone)]
pub struct Find {
    core: Arc<CallCore<Matches>>,
}

impl Find {
    pub(crate) fn new(base: &Url, settings: ServiceSettings<Matches>, deps: ServiceDeps) -> Result<Self> {
        Ok(Self {
            core: CallCore::new("find", base, settings, deps, build_params, None)?,
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

impl QueryObserver for Find {
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
        .append_pair("orderBy", &query.match_order_by.to_string())
        .append_pair("page", &query.match_page.to_string())
        .append_pair("pageSize", &query.match_page_size.to_string())
        .append_pair("grouping", &query.match_grouping.to_string())
        .append_pair("generateContent", &query.match_generate_content.to_string())
        .append_pair(
            "generateContentHighlights",
            &query.match_generate_content_highlights.to_string(),
        );
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::DateSpecification;
    use chrono::{Duration as ChronoDuration, Utc};

    fn built_url(query: &Query) -> Url {
        let mut url = Url::parse("http://localhost:9950/RestService/v4/find").unwrap();
        build_params(&mut url, query);
        url
    }

    #[test]
    fn test_url_carries_core_parameters() {
        let query = Query {
            query_text: "annual report".to_string(),
            match_page: 2,
            match_page_size: 25,
            ..Default::default()
        };
        let url = built_url(&query);
        let params = url.query().unwrap();
        assert!(params.contains("queryText=annual+report"));
        assert!(params.contains("searchType=Keywords"));
        assert!(params.contains("orderBy=Relevance"));
        assert!(params.contains("page=2"));
        assert!(params.contains("pageSize=25"));
    }

    #[test]
    fn test_unbounded_dates_are_omitted() {
        let url = built_url(&Query::default());
        let params = url.query().unwrap();
        assert!(!params.contains("dateFrom"));
        assert!(!params.contains("dateTo"));
    }

    #[test]
    fn test_relative_dates_resolve_to_absolute() {
        let query = Query {
            date_from: Some(DateSpecification::months_ago(2)),
            date_to: Some(DateSpecification::months_ago(1)),
            ..Default::default()
        };
        let url = built_url(&query);

        let date_from = url
            .query_pairs()
            .find(|(key, _)| key == "dateFrom")
            .map(|(_, value)| value.to_string())
            .unwrap();
        let parsed = chrono::DateTime::parse_from_rfc3339(&date_from).unwrap();
        let age = Utc::now().signed_duration_since(parsed.with_timezone(&Utc));
        assert!(age >= ChronoDuration::days(59));
        assert!(age <= ChronoDuration::days(62));
    }

    #[test]
    fn test_filters_join_in_insertion_order() {
        let query = Query {
            filters: vec!["a|b".to_string(), "c".to_string()],
            ..Default::default()
        };
        let url = built_url(&query);
        let filters = url
            .query_pairs()
            .find(|(key, _)| key == "filters")
            .map(|(_, value)| value.to_string())
            .unwrap();
        assert_eq!(filters, "a|b;c");
    }
}
