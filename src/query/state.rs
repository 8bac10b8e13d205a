//! The shared mutable query state

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::types::{CategorizationType, DateSpecification, OrderBy, SearchType};

/// Current search parameters, shared by the client facade and every service
/// call. There is exactly one live instance per client; service calls read it
/// at dispatch time and never keep a divergent copy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Query {
    /// The text to search for
    pub query_text: String,

    /// How the query text is interpreted
    pub search_type: SearchType,

    /// Ordering of returned matches
    pub match_order_by: OrderBy,

    /// Result page to fetch (0-based until a dispatch resets it, see
    /// the service-call contract)
    pub match_page: u32,

    /// Number of matches per page (minimum 1)
    pub match_page_size: u32,

    /// Group near-duplicate matches under a parent match
    pub match_grouping: bool,

    /// Ask the backend to extract full item content
    pub match_generate_content: bool,

    /// Highlight query terms inside generated content
    pub match_generate_content_highlights: bool,

    /// Lower date bound; `None` is unbounded
    pub date_from: Option<DateSpecification>,

    /// Upper date bound; `None` is unbounded
    pub date_to: Option<DateSpecification>,

    /// Active category filters as path keys (`"group|cat|subcat"`),
    /// duplicate-free, insertion order preserved
    pub filters: Vec<String>,

    /// Which category statistics the categorize service computes
    pub categorization_type: CategorizationType,

    /// UI language hint forwarded to the backend (ISO code)
    pub ui_language_code: String,

    /// Identifier of the calling client, for backend-side auditing
    pub client_id: String,

    /// Maximum number of autocomplete suggestions to request
    pub max_suggestions: u32,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            query_text: String::new(),
            search_type: SearchType::Keywords,
            match_order_by: OrderBy::Relevance,
            match_page: 0,
            match_page_size: 10,
            match_grouping: false,
            match_generate_content: false,
            match_generate_content_highlights: true,
            date_from: None,
            date_to: None,
            filters: Vec::new(),
            categorization_type: CategorizationType::All,
            ui_language_code: String::new(),
            client_id: String::new(),
            max_suggestions: 10,
        }
    }
}

impl Query {
    /// Clamp a page number into the valid range (negative becomes 0).
    pub fn clamp_page(page: i64) -> u32 {
        page.max(0).min(u32::MAX as i64) as u32
    }

    /// Clamp a page size into the valid range (anything below 1 becomes 1).
    pub fn clamp_page_size(size: i64) -> u32 {
        size.max(1).min(u32::MAX as i64) as u32
    }

    /// Clamp a suggestion count into the valid range (negative becomes 0).
    pub fn clamp_max_suggestions(count: i64) -> u32 {
        count.max(0).min(u32::MAX as i64) as u32
    }
}

/// Handle to the single live [`Query`] instance of a client.
pub type SharedQuery = Arc<RwLock<Query>>;

/// Create the shared handle around an initial query state.
pub fn shared(initial: Query) -> SharedQuery {
    Arc::new(RwLock::new(initial))
}
