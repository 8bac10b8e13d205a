use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response payload of the find service
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Matches {
    /// Backend estimate of the total number of matching items
    pub estimated_match_count: u64,

    /// The matches for the requested page
    pub search_matches: Vec<SearchMatch>,

    /// Alternative query suggestions when the query looks misspelled
    pub did_you_mean_list: Vec<String>,

    /// Milliseconds the backend spent on the request
    pub query_execution_time: u64,
}

/// One result item
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchMatch {
    pub title: String,

    pub url: String,

    /// Short ingress/abstract snippets
    pub abstracts: Vec<String>,

    /// Highlighted extracts around query-term hits
    pub extracts: Vec<String>,

    /// Full content paragraphs, present when content generation was requested
    pub content: Vec<String>,

    /// Category path keys this item belongs to
    pub categories: Vec<String>,

    /// Item metadata key/value pairs
    pub meta_list: Vec<MetaItem>,

    pub date: Option<DateTime<Utc>>,

    pub relevance: f64,

    /// Nesting depth when grouping is enabled (0 = top-level match)
    pub parent_level: u32,

    /// False for ghost entries injected to complete a group
    pub is_true_match: bool,
}

/// One metadata entry on a match
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MetaItem {
    pub key: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_backend_payload() {
        let json = r#"{
            "estimatedMatchCount": 42,
            "didYouMeanList": ["testing"],
            "searchMatches": [{
                "title": "Quarterly report",
                "url": "https://example.com/q1.docx",
                "abstracts": ["Revenue grew"],
                "categories": ["FileType|Document|Word"],
                "metaList": [{"key": "author", "value": "pat"}],
                "relevance": 87.5,
                "isTrueMatch": true
            }]
        }"#;

        let matches: Matches = serde_json::from_str(json).unwrap();
        assert_eq!(matches.estimated_match_count, 42);
        assert_eq!(matches.did_you_mean_list, vec!["testing".to_string()]);
        assert_eq!(matches.search_matches.len(), 1);

        let hit = &matches.search_matches[0];
        assert_eq!(hit.title, "Quarterly report");
        assert_eq!(hit.meta_list[0].key, "author");
        assert!(hit.is_true_match);
        assert!(hit.date.is_none());
    }

    #[test]
    fn test_missing_fields_default() {
        let matches: Matches = serde_json::from_str("{}").unwrap();
        assert_eq!(matches.estimated_match_count, 0);
        assert!(matches.search_matches.is_empty());
    }
}
