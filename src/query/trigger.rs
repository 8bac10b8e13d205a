//! Per-field trigger policies
//!
//! A trigger policy decides, for one service call, whether a just-applied
//! query field mutation should turn into a network dispatch and with which
//! delay. Policies are explicit per-field structures with documented
//! defaults; nothing is probed dynamically.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

use super::state::Query;
use super::types::{CategorizationType, DateSpecification, OrderBy, SearchType};

/// Default pattern for instant query-text dispatch: a completed word,
/// i.e. a non-space followed by a single trailing space.
static DEFAULT_INSTANT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S $").expect("static regex"));

/// Identifies a [`Query`] field in trigger policies and change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum QueryField {
    QueryText,
    SearchType,
    MatchOrderBy,
    MatchPage,
    MatchPageSize,
    MatchGrouping,
    MatchGenerateContent,
    MatchGenerateContentHighlights,
    DateFrom,
    DateTo,
    Filters,
    CategorizationType,
    UiLanguageCode,
    ClientId,
    MaxSuggestions,
}

/// Notification of a single applied field mutation, carrying the value the
/// field held immediately before. The new value is read off the live query.
#[derive(Debug, Clone)]
pub enum FieldChange {
    QueryText { old: String },
    SearchType { old: SearchType },
    MatchOrderBy { old: OrderBy },
    MatchPage { old: u32 },
    MatchPageSize { old: u32 },
    MatchGrouping { old: bool },
    MatchGenerateContent { old: bool },
    MatchGenerateContentHighlights { old: bool },
    DateFrom { old: Option<DateSpecification> },
    DateTo { old: Option<DateSpecification> },
    Filters { old: Vec<String> },
    CategorizationType { old: CategorizationType },
    UiLanguageCode { old: String },
    ClientId { old: String },
    MaxSuggestions { old: u32 },
}

impl FieldChange {
    /// The field this change applies to.
    pub fn field(&self) -> QueryField {
        match self {
            FieldChange::QueryText { .. } => QueryField::QueryText,
            FieldChange::SearchType { .. } => QueryField::SearchType,
            FieldChange::MatchOrderBy { .. } => QueryField::MatchOrderBy,
            FieldChange::MatchPage { .. } => QueryField::MatchPage,
            FieldChange::MatchPageSize { .. } => QueryField::MatchPageSize,
            FieldChange::MatchGrouping { .. } => QueryField::MatchGrouping,
            FieldChange::MatchGenerateContent { .. } => QueryField::MatchGenerateContent,
            FieldChange::MatchGenerateContentHighlights { .. } => {
                QueryField::MatchGenerateContentHighlights
            }
            FieldChange::DateFrom { .. } => QueryField::DateFrom,
            FieldChange::DateTo { .. } => QueryField::DateTo,
            FieldChange::Filters { .. } => QueryField::Filters,
            FieldChange::CategorizationType { .. } => QueryField::CategorizationType,
            FieldChange::UiLanguageCode { .. } => QueryField::UiLanguageCode,
            FieldChange::ClientId { .. } => QueryField::ClientId,
            FieldChange::MaxSuggestions { .. } => QueryField::MaxSuggestions,
        }
    }
}

/// Instant-dispatch rule for query-text triggers.
#[derive(Debug, Clone)]
pub struct InstantTrigger {
    /// New text matching this pattern dispatches with no delay.
    pub regex: Regex,

    /// When true, text that does not match the pattern falls back to the
    /// call's debounce delay; when false such edits are swallowed.
    pub fallback_debounce: bool,
}

impl Default for InstantTrigger {
    fn default() -> Self {
        Self {
            regex: DEFAULT_INSTANT_REGEX.clone(),
            fallback_debounce: false,
        }
    }
}

impl InstantTrigger {
    /// Build an instant rule from a pattern string. Fails on a malformed
    /// pattern so a bad configuration surfaces at setup time.
    pub fn from_pattern(pattern: &str, fallback_debounce: bool) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
            fallback_debounce,
        })
    }
}

/// Condition under which a field mutation dispatches for one service call.
#[derive(Debug, Clone, Default)]
pub enum TriggerCondition {
    /// Never dispatch for this field (manual-only). The default everywhere.
    #[default]
    Never,

    /// Dispatch on every observed mutation.
    Always,

    /// Dispatch when the stored value changed. Setters only notify on actual
    /// change, so at the hook level this behaves like [`Always`]; the variant
    /// documents intent.
    ///
    /// [`Always`]: TriggerCondition::Always
    OnValueChange,

    /// Dispatch after the call's debounce delay when the query text changes.
    OnQueryTextChange,

    /// Dispatch immediately when the new query text matches the rule's
    /// pattern; otherwise apply the rule's fallback behavior.
    OnQueryTextChangeInstant(InstantTrigger),
}

impl TriggerCondition {
    /// Instant-on-word-boundary with default pattern and no fallback.
    pub fn instant() -> Self {
        TriggerCondition::OnQueryTextChangeInstant(InstantTrigger::default())
    }

    /// Decide whether to dispatch, and with which delay, for a change to the
    /// field this condition is attached to. `query` is the live state after
    /// the mutation; `call_delay` is the owning call's configured debounce.
    pub fn decide(&self, query: &Query, call_delay: Option<Duration>) -> Option<Duration> {
        let debounce = call_delay.unwrap_or(Duration::ZERO);
        match self {
            TriggerCondition::Never => None,
            TriggerCondition::Always | TriggerCondition::OnValueChange => Some(debounce),
            TriggerCondition::OnQueryTextChange => Some(debounce),
            TriggerCondition::OnQueryTextChangeInstant(rule) => {
                if rule.regex.is_match(&query.query_text) {
                    Some(Duration::ZERO)
                } else if rule.fallback_debounce {
                    Some(debounce)
                } else {
                    None
                }
            }
        }
    }
}

/// One trigger condition per query field. Every slot defaults to
/// [`TriggerCondition::Never`], so an unconfigured service is manual-only.
#[derive(Debug, Clone, Default)]
pub struct TriggerPolicy {
    pub query_text: TriggerCondition,
    pub search_type: TriggerCondition,
    pub match_order_by: TriggerCondition,
    pub match_page: TriggerCondition,
    pub match_page_size: TriggerCondition,
    pub match_grouping: TriggerCondition,
    pub match_generate_content: TriggerCondition,
    pub match_generate_content_highlights: TriggerCondition,
    pub date_from: TriggerCondition,
    pub date_to: TriggerCondition,
    pub filters: TriggerCondition,
    pub categorization_type: TriggerCondition,
    pub ui_language_code: TriggerCondition,
    pub client_id: TriggerCondition,
    pub max_suggestions: TriggerCondition,
}

impl TriggerPolicy {
    /// The condition configured for `field`.
    pub fn condition(&self, field: QueryField) -> &TriggerCondition {
        match field {
            QueryField::QueryText => &self.query_text,
            QueryField::SearchType => &self.search_type,
            QueryField::MatchOrderBy => &self.match_order_by,
            QueryField::MatchPage => &self.match_page,
            QueryField::MatchPageSize => &self.match_page_size,
            QueryField::MatchGrouping => &self.match_grouping,
            QueryField::MatchGenerateContent => &self.match_generate_content,
            QueryField::MatchGenerateContentHighlights => &self.match_generate_content_highlights,
            QueryField::DateFrom => &self.date_from,
            QueryField::DateTo => &self.date_to,
            QueryField::Filters => &self.filters,
            QueryField::CategorizationType => &self.categorization_type,
            QueryField::UiLanguageCode => &self.ui_language_code,
            QueryField::ClientId => &self.client_id,
            QueryField::MaxSuggestions => &self.max_suggestions,
        }
    }

    /// Typical policy for a live search-as-you-type result list: instant
    /// dispatch on completed words, re-fetch when any match-shaping
    /// parameter changes.
    pub fn live_search() -> Self {
        Self {
            query_text: TriggerCondition::instant(),
            search_type: TriggerCondition::OnValueChange,
            match_order_by: TriggerCondition::OnValueChange,
            match_page: TriggerCondition::OnValueChange,
            match_page_size: TriggerCondition::OnValueChange,
            match_grouping: TriggerCondition::OnValueChange,
            match_generate_content: TriggerCondition::OnValueChange,
            match_generate_content_highlights: TriggerCondition::OnValueChange,
            date_from: TriggerCondition::OnValueChange,
            date_to: TriggerCondition::OnValueChange,
            filters: TriggerCondition::OnValueChange,
            ui_language_code: TriggerCondition::OnValueChange,
            ..Default::default()
        }
    }

    /// Typical policy for a category pane that follows the result list.
    pub fn live_categorize() -> Self {
        Self {
            query_text: TriggerCondition::instant(),
            search_type: TriggerCondition::OnValueChange,
            date_from: TriggerCondition::OnValueChange,
            date_to: TriggerCondition::OnValueChange,
            filters: TriggerCondition::OnValueChange,
            categorization_type: TriggerCondition::OnValueChange,
            ui_language_code: TriggerCondition::OnValueChange,
            ..Default::default()
        }
    }

    /// Typical policy for an autocomplete box: debounced dispatch on every
    /// keystroke.
    pub fn live_autocomplete() -> Self {
        Self {
            query_text: TriggerCondition::OnQueryTextChange,
            max_suggestions: TriggerCondition::OnValueChange,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query_with_text(text: &str) -> Query {
        Query {
            query_text: text.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_never_skips() {
        let query = query_with_text("anything ");
        assert_eq!(TriggerCondition::Never.decide(&query, None), None);
        assert_eq!(
            TriggerCondition::Never.decide(&query, Some(Duration::from_millis(100))),
            None
        );
    }

    #[test]
    fn test_value_change_uses_call_delay() {
        let query = query_with_text("x");
        assert_eq!(
            TriggerCondition::OnValueChange.decide(&query, None),
            Some(Duration::ZERO)
        );
        assert_eq!(
            TriggerCondition::OnValueChange.decide(&query, Some(Duration::from_millis(250))),
            Some(Duration::from_millis(250))
        );
    }

    #[test]
    fn test_instant_matches_trailing_space() {
        let cond = TriggerCondition::instant();
        assert_eq!(cond.decide(&query_with_text("test"), None), None);
        assert_eq!(
            cond.decide(&query_with_text("test "), None),
            Some(Duration::ZERO)
        );
        // Two trailing spaces: the pattern wants a non-space right before the
        // final space.
        assert_eq!(cond.decide(&query_with_text("test  "), None), None);
    }

    #[test]
    fn test_instant_fallback_debounces_non_matching() {
        let rule = InstantTrigger {
            fallback_debounce: true,
            ..Default::default()
        };
        let cond = TriggerCondition::OnQueryTextChangeInstant(rule);
        let delay = Some(Duration::from_millis(200));
        assert_eq!(
            cond.decide(&query_with_text("test"), delay),
            Some(Duration::from_millis(200))
        );
        assert_eq!(
            cond.decide(&query_with_text("test "), delay),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn test_malformed_instant_pattern_fails_at_setup() {
        assert!(InstantTrigger::from_pattern("(unclosed", false).is_err());
    }

    #[test]
    fn test_policy_defaults_to_manual_only() {
        let policy = TriggerPolicy::default();
        let query = query_with_text("test ");
        for field in [
            QueryField::QueryText,
            QueryField::Filters,
            QueryField::MatchPage,
            QueryField::MaxSuggestions,
        ] {
            assert!(policy.condition(field).decide(&query, None).is_none());
        }
    }

    #[test]
    fn test_field_change_maps_to_field() {
        let change = FieldChange::MatchPage { old: 3 };
        assert_eq!(change.field(), QueryField::MatchPage);
        let change = FieldChange::QueryText {
            old: "a".to_string(),
        };
        assert_eq!(change.field(), QueryField::QueryText);
    }
}
