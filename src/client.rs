//! The client facade
//!
//! [`SearchClient`] composes the shared query state, the shared auth token
//! and one service call per backend capability. Property setters coerce and
//! compare before storing, and broadcast every applied change to the service
//! calls, which decide for themselves whether to dispatch.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use tracing::info;

use crate::auth::AuthToken;
use crate::config::{ClientConfig, Settings};
use crate::error::{AppError, Result};
use crate::query::{
    self, filters, CategorizationType, DateSpecification, FieldChange, OrderBy, Query, SearchType,
    SharedQuery,
};
use crate::services::core::{QueryObserver, ServiceDeps};
use crate::services::{
    AllCategories, Authentication, Autocomplete, BestBets, Categorize, Find, HttpTransport,
    Transport,
};

/// Marker token that, appended to the query text, switches the backend into
/// debug mode. Opaque to the core: it travels inside `query_text` like any
/// other character.
pub const DEBUG_MARKER: &str = ":debug";

static DEBUG_MARKER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\s?{}", regex::escape(DEBUG_MARKER))).expect("static regex")
});

/// Client-side orchestration facade over a multi-endpoint search backend.
///
/// All methods take `&self`; state lives behind internal locks so the client
/// can be shared across tasks. Dispatches are spawned onto the ambient Tokio
/// runtime, so mutating methods must run inside one.
pub struct SearchClient {
    base_url: Url,
    initial_query: Query,
    query: SharedQuery,
    auth: AuthToken,
    observers: Vec<Box<dyn QueryObserver>>,
    autocomplete: Option<Autocomplete>,
    find: Option<Find>,
    categorize: Option<Categorize>,
    best_bets: Option<BestBets>,
    all_categories: Option<AllCategories>,
    authentication: Option<Authentication>,
}

impl SearchClient {
    /// Create a client against `base_url` using the default HTTP transport.
    ///
    /// Fails fast on a base URL that is not http/https or does not parse.
    pub fn new(base_url: &str, settings: Settings) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(settings.timeout)?);
        Self::with_transport(base_url, settings, transport)
    }

    /// Create a client from a loaded [`ClientConfig`]. Callbacks are not
    /// file-expressible; attach them to the settings first when needed.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(&config.base_url, Settings::from_config(config)?)
    }

    /// Create a client with a caller-provided transport.
    pub fn with_transport(
        base_url: &str,
        settings: Settings,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let base = parse_base_url(base_url)?;

        let Settings {
            query: initial_query,
            authentication_token,
            timeout: _,
            autocomplete,
            find,
            categorize,
            best_bets,
            all_categories,
            authentication,
        } = settings;

        let query = query::shared(initial_query.clone());
        let auth = match authentication_token {
            Some(token) => AuthToken::with_token(token),
            None => AuthToken::new(),
        };
        let deps = ServiceDeps {
            query: Arc::clone(&query),
            auth: auth.clone(),
            transport,
        };

        let mut observers: Vec<Box<dyn QueryObserver>> = Vec::new();

        let autocomplete = if autocomplete.enabled {
            let service = Autocomplete::new(&base, autocomplete, deps.clone())?;
            observers.push(Box::new(service.clone()));
            Some(service)
        } else {
            None
        };
        let find = if find.enabled {
            let service = Find::new(&base, find, deps.clone())?;
            observers.push(Box::new(service.clone()));
            Some(service)
        } else {
            None
        };
        let categorize = if categorize.enabled {
            let service = Categorize::new(&base, categorize, deps.clone())?;
            observers.push(Box::new(service.clone()));
            Some(service)
        } else {
            None
        };
        let best_bets = if best_bets.enabled {
            let service = BestBets::new(&base, best_bets, deps.clone())?;
            observers.push(Box::new(service.clone()));
            Some(service)
        } else {
            None
        };
        let all_categories = if all_categories.enabled {
            let service = AllCategories::new(&base, all_categories, deps.clone())?;
            observers.push(Box::new(service.clone()));
            Some(service)
        } else {
            None
        };
        let authentication = if authentication.enabled {
            let service = Authentication::new(&base, authentication, deps)?;
            observers.push(Box::new(service.clone()));
            Some(service)
        } else {
            None
        };

        let client = Self {
            base_url: base,
            initial_query,
            query,
            auth,
            observers,
            autocomplete,
            find,
            categorize,
            best_bets,
            all_categories,
            authentication,
        };

        info!(
            base_url = %client.base_url,
            autocomplete = client.autocomplete.is_some(),
            find = client.find.is_some(),
            categorize = client.categorize.is_some(),
            best_bets = client.best_bets.is_some(),
            all_categories = client.all_categories.is_some(),
            authentication = client.authentication.is_some(),
            "Search client initialized"
        );

        // Warm up the token so the first real query already carries it. Only
        // when someone listens, and only when a runtime is there to carry it.
        if let Some(authentication) = &client.authentication {
            if authentication.should_update() && tokio::runtime::Handle::try_current().is_ok() {
                authentication.update();
            }
        }

        Ok(client)
    }

    /// The validated backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Snapshot of the current query state.
    pub fn query(&self) -> Query {
        self.query.read().clone()
    }

    // --- service accessors -------------------------------------------------

    /// The autocomplete service, when enabled.
    pub fn autocomplete(&self) -> Option<&Autocomplete> {
        self.autocomplete.as_ref()
    }

    /// The find service, when enabled.
    pub fn find(&self) -> Option<&Find> {
        self.find.as_ref()
    }

    /// The categorize service, when enabled.
    pub fn categorize(&self) -> Option<&Categorize> {
        self.categorize.as_ref()
    }

    /// The best-bets service, when enabled.
    pub fn best_bets(&self) -> Option<&BestBets> {
        self.best_bets.as_ref()
    }

    /// The all-categories service, when enabled.
    pub fn all_categories(&self) -> Option<&AllCategories> {
        self.all_categories.as_ref()
    }

    /// The authentication service, when enabled.
    pub fn authentication(&self) -> Option<&Authentication> {
        self.authentication.as_ref()
    }

    // --- auth token --------------------------------------------------------

    /// Current bearer token, if any.
    pub fn authentication_token(&self) -> Option<String> {
        self.auth.get()
    }

    /// Attach a bearer token; visible to the next request from any service.
    pub fn set_authentication_token(&self, token: impl Into<String>) {
        self.auth.set(token);
    }

    /// Detach the bearer token.
    pub fn clear_authentication_token(&self) {
        self.auth.clear();
    }

    // --- property accessors ------------------------------------------------

    pub fn query_text(&self) -> String {
        self.query.read().query_text.clone()
    }

    pub fn set_query_text(&self, text: impl Into<String>) {
        let new = text.into();
        let old = {
            let mut query = self.query.write();
            if query.query_text == new {
                return;
            }
            std::mem::replace(&mut query.query_text, new)
        };
        self.notify(FieldChange::QueryText { old });
    }

    pub fn search_type(&self) -> SearchType {
        self.query.read().search_type
    }

    pub fn set_search_type(&self, search_type: SearchType) {
        let old = {
            let mut query = self.query.write();
            if query.search_type == search_type {
                return;
            }
            std::mem::replace(&mut query.search_type, search_type)
        };
        self.notify(FieldChange::SearchType { old });
    }

    pub fn match_order_by(&self) -> OrderBy {
        self.query.read().match_order_by
    }

    pub fn set_match_order_by(&self, order_by: OrderBy) {
        let old = {
            let mut query = self.query.write();
            if query.match_order_by == order_by {
                return;
            }
            std::mem::replace(&mut query.match_order_by, order_by)
        };
        self.notify(FieldChange::MatchOrderBy { old });
    }

    pub fn match_page(&self) -> u32 {
        self.query.read().match_page
    }

    /// Set the result page. Negative input clamps to 0.
    pub fn set_match_page(&self, page: i64) {
        let new = Query::clamp_page(page);
        let old = {
            let mut query = self.query.write();
            if query.match_page == new {
                return;
            }
            std::mem::replace(&mut query.match_page, new)
        };
        self.notify(FieldChange::MatchPage { old });
    }

    /// Step one page back, stopping at 0. Routes through the normal setter,
    /// so triggers fire.
    pub fn match_page_prev(&self) {
        let current = i64::from(self.query.read().match_page);
        self.set_match_page(current - 1);
    }

    /// Step one page forward. Routes through the normal setter, so triggers
    /// fire.
    pub fn match_page_next(&self) {
        let current = i64::from(self.query.read().match_page);
        self.set_match_page(current + 1);
    }

    pub fn match_page_size(&self) -> u32 {
        self.query.read().match_page_size
    }

    /// Set the page size. Anything below 1 clamps to 1.
    pub fn set_match_page_size(&self, size: i64) {
        let new = Query::clamp_page_size(size);
        let old = {
            let mut query = self.query.write();
            if query.match_page_size == new {
                return;
            }
            std::mem::replace(&mut query.match_page_size, new)
        };
        self.notify(FieldChange::MatchPageSize { old });
    }

    pub fn match_grouping(&self) -> bool {
        self.query.read().match_grouping
    }

    pub fn set_match_grouping(&self, grouping: bool) {
        let old = {
            let mut query = self.query.write();
            if query.match_grouping == grouping {
                return;
            }
            std::mem::replace(&mut query.match_grouping, grouping)
        };
        self.notify(FieldChange::MatchGrouping { old });
    }

    pub fn match_generate_content(&self) -> bool {
        self.query.read().match_generate_content
    }

    pub fn set_match_generate_content(&self, generate: bool) {
        let old = {
            let mut query = self.query.write();
            if query.match_generate_content == generate {
                return;
            }
            std::mem::replace(&mut query.match_generate_content, generate)
        };
        self.notify(FieldChange::MatchGenerateContent { old });
    }

    pub fn match_generate_content_highlights(&self) -> bool {
        self.query.read().match_generate_content_highlights
    }

    pub fn set_match_generate_content_highlights(&self, highlights: bool) {
        let old = {
            let mut query = self.query.write();
            if query.match_generate_content_highlights == highlights {
                return;
            }
            std::mem::replace(&mut query.match_generate_content_highlights, highlights)
        };
        self.notify(FieldChange::MatchGenerateContentHighlights { old });
    }

    pub fn date_from(&self) -> Option<DateSpecification> {
        self.query.read().date_from
    }

    pub fn set_date_from(&self, date: Option<DateSpecification>) {
        let old = {
            let mut query = self.query.write();
            if query.date_from == date {
                return;
            }
            std::mem::replace(&mut query.date_from, date)
        };
        self.notify(FieldChange::DateFrom { old });
    }

    pub fn date_to(&self) -> Option<DateSpecification> {
        self.query.read().date_to
    }

    pub fn set_date_to(&self, date: Option<DateSpecification>) {
        let old = {
            let mut query = self.query.write();
            if query.date_to == date {
                return;
            }
            std::mem::replace(&mut query.date_to, date)
        };
        self.notify(FieldChange::DateTo { old });
    }

    pub fn categorization_type(&self) -> CategorizationType {
        self.query.read().categorization_type
    }

    pub fn set_categorization_type(&self, categorization: CategorizationType) {
        let old = {
            let mut query = self.query.write();
            if query.categorization_type == categorization {
                return;
            }
            std::mem::replace(&mut query.categorization_type, categorization)
        };
        self.notify(FieldChange::CategorizationType { old });
    }

    pub fn ui_language_code(&self) -> String {
        self.query.read().ui_language_code.clone()
    }

    pub fn set_ui_language_code(&self, code: impl Into<String>) {
        let new = code.into();
        let old = {
            let mut query = self.query.write();
            if query.ui_language_code == new {
                return;
            }
            std::mem::replace(&mut query.ui_language_code, new)
        };
        self.notify(FieldChange::UiLanguageCode { old });
    }

    pub fn client_id(&self) -> String {
        self.query.read().client_id.clone()
    }

    pub fn set_client_id(&self, id: impl Into<String>) {
        let new = id.into();
        let old = {
            let mut query = self.query.write();
            if query.client_id == new {
                return;
            }
            std::mem::replace(&mut query.client_id, new)
        };
        self.notify(FieldChange::ClientId { old });
    }

    pub fn max_suggestions(&self) -> u32 {
        self.query.read().max_suggestions
    }

    /// Set the suggestion limit. Negative input clamps to 0.
    pub fn set_max_suggestions(&self, count: i64) {
        let new = Query::clamp_max_suggestions(count);
        let old = {
            let mut query = self.query.write();
            if query.max_suggestions == new {
                return;
            }
            std::mem::replace(&mut query.max_suggestions, new)
        };
        self.notify(FieldChange::MaxSuggestions { old });
    }

    // --- filters -----------------------------------------------------------

    /// Active filter keys in insertion order.
    pub fn filters(&self) -> Vec<String> {
        self.query.read().filters.clone()
    }

    /// Replace the filter set. Duplicates are dropped, keeping first
    /// occurrences in order.
    pub fn set_filters(&self, keys: Vec<String>) {
        let new = filters::dedup_in_order(keys);
        let old = {
            let mut query = self.query.write();
            if query.filters == new {
                return;
            }
            std::mem::replace(&mut query.filters, new)
        };
        self.notify(FieldChange::Filters { old });
    }

    /// Add a filter key. Returns false (and stays silent) when already
    /// present.
    pub fn filter_add(&self, key: impl Into<String>) -> bool {
        let key = key.into();
        let old = {
            let mut query = self.query.write();
            let old = query.filters.clone();
            if !filters::add(&mut query.filters, &key) {
                return false;
            }
            old
        };
        self.notify(FieldChange::Filters { old });
        true
    }

    /// Remove a filter key. Returns false (and stays silent) when absent.
    pub fn filter_remove(&self, key: &str) -> bool {
        let old = {
            let mut query = self.query.write();
            let old = query.filters.clone();
            if !filters::remove(&mut query.filters, key) {
                return false;
            }
            old
        };
        self.notify(FieldChange::Filters { old });
        true
    }

    /// Toggle the filter for a category path. Returns true when the filter
    /// was added, false when removed.
    pub fn filter_toggle<S: AsRef<str>>(&self, path: &[S]) -> bool {
        let key = filters::filter_key(path);
        if self.is_filter(path) {
            self.filter_remove(&key);
            false
        } else {
            self.filter_add(key);
            true
        }
    }

    /// Whether the category at `path` is an active filter.
    pub fn is_filter<S: AsRef<str>>(&self, path: &[S]) -> bool {
        let key = filters::filter_key(path);
        self.query.read().filters.iter().any(|f| f == &key)
    }

    /// Whether any active filter addresses a descendant of the category at
    /// `path`.
    pub fn has_child_filter<S: AsRef<str>>(&self, path: &[S]) -> bool {
        self.query
            .read()
            .filters
            .iter()
            .any(|f| filters::is_child_key(f, path))
    }

    // --- query debug marker ------------------------------------------------

    /// Append the backend debug marker to the query text (through the normal
    /// setter, so triggers apply).
    pub fn enable_query_debug(&self) {
        let text = self.query_text();
        if !text.contains(DEBUG_MARKER) {
            self.set_query_text(format!("{} {}", text, DEBUG_MARKER));
        }
    }

    /// Strip the backend debug marker from the query text.
    pub fn disable_query_debug(&self) {
        let text = self.query_text();
        if text.contains(DEBUG_MARKER) {
            self.set_query_text(DEBUG_MARKER_PATTERN.replace_all(&text, "").into_owned());
        }
    }

    // --- bulk operations ---------------------------------------------------

    /// Replace the whole query (when given) and dispatch the find call
    /// immediately, bypassing trigger evaluation; optionally autocomplete
    /// too. For explicit user actions where the intent to fetch is
    /// unconditional.
    pub fn force_update(&self, query: Option<Query>, update_autocomplete: bool) {
        if let Some(new_query) = query {
            *self.query.write() = new_query;
        }
        if let Some(find) = &self.find {
            find.update();
        }
        if update_autocomplete {
            if let Some(autocomplete) = &self.autocomplete {
                autocomplete.update();
            }
        }
    }

    /// Dispatch find and categorize immediately with the current query,
    /// bypassing trigger evaluation.
    pub fn find_and_categorize(&self) {
        if let Some(find) = &self.find {
            find.update();
        }
        if let Some(categorize) = &self.categorize {
            categorize.update();
        }
    }

    /// Toggle deferring on every constructed service call.
    pub fn defer_updates_for_all(&self, state: bool, skip_pending: bool) {
        for observer in &self.observers {
            observer.defer_updates(state, skip_pending);
        }
    }

    /// Restore the query to its initial state and drop every call's pending
    /// or scheduled work. Dispatches nothing.
    pub fn reset(&self) {
        *self.query.write() = self.initial_query.clone();
        for observer in &self.observers {
            observer.clear_pending();
        }
    }

    fn notify(&self, change: FieldChange) {
        for observer in &self.observers {
            observer.query_changed(&change);
        }
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    // The lenient WHATWG parser accepts shapes like "http:host"; require the
    // unambiguous form up front.
    if !raw.starts_with("http://") && !raw.starts_with("https://") {
        return Err(AppError::Validation(format!(
            "Invalid base url '{}': only http:// and https:// backends are supported",
            raw
        )));
    }
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    Url::parse(&normalized)
        .map_err(|e| AppError::Validation(format!("Invalid base url '{}': {}", raw, e)))
}
