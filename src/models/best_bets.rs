use serde::{Deserialize, Serialize};

/// A curated recommendation pinned to specific query terms
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct BestBet {
    pub name: String,

    pub description: String,

    pub url: String,

    /// Query terms this recommendation is pinned to
    pub keywords: Vec<String>,
}

/// Response payload of the best-bets service
pub type BestBetList = Vec<BestBet>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_list() {
        let json = r#"[{
            "name": "Travel policy",
            "description": "Company travel rules",
            "url": "https://intranet/travel",
            "keywords": ["travel", "expenses"]
        }]"#;

        let bets: BestBetList = serde_json::from_str(json).unwrap();
        assert_eq!(bets.len(), 1);
        assert_eq!(bets[0].keywords, vec!["travel".to_string(), "expenses".to_string()]);
    }
}
