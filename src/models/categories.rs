use serde::{Deserialize, Serialize};

/// Response payload of the categorize and all-categories services
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Categories {
    /// Top-level category groups
    pub groups: Vec<Group>,

    /// Number of items matched by the query these categories were computed for
    pub match_count: u64,

    /// Milliseconds the backend spent on the request
    pub query_execution_time: u64,
}

/// A top-level grouping of categories (for example "FileType" or "Author")
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Group {
    pub name: String,

    pub display_name: String,

    /// Whether the UI should render the group expanded
    pub expanded: bool,

    pub categories: Vec<Category>,
}

/// A node in the category tree
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Category {
    pub name: String,

    pub display_name: String,

    /// Full path segments from the group down to this node
    pub category_name: Vec<String>,

    /// Number of matching items under this node
    pub count: u64,

    pub expanded: bool,

    pub children: Vec<Category>,
}

impl Category {
    /// The filter key addressing this node.
    pub fn filter_key(&self) -> String {
        crate::query::filters::filter_key(&self.category_name)
    }
}
