//! Category filter keys and path relationships
//!
//! A filter is addressed by its path key: the category path segments joined
//! with `|` (for example `"FileType|Document|Word"`). The query state stores
//! keys; path-based helpers on the client compare keys segment-wise.

/// Separator between category path segments inside a filter key
pub const PATH_SEPARATOR: char = '|';

/// Build a filter key from category path segments.
pub fn filter_key<S: AsRef<str>>(path: &[S]) -> String {
    path.iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(&PATH_SEPARATOR.to_string())
}

/// Whether `key` addresses a strict descendant of the category at `path`.
pub fn is_child_key<S: AsRef<str>>(key: &str, path: &[S]) -> bool {
    let parent = filter_key(path);
    key.len() > parent.len() + 1
        && key.starts_with(&parent)
        && key[parent.len()..].starts_with(PATH_SEPARATOR)
}

/// Insert `key` into `filters` unless already present. Returns true when the
/// set changed.
pub fn add(filters: &mut Vec<String>, key: &str) -> bool {
    if filters.iter().any(|f| f == key) {
        return false;
    }
    filters.push(key.to_string());
    true
}

/// Remove `key` from `filters` if present. Returns true when the set changed.
pub fn remove(filters: &mut Vec<String>, key: &str) -> bool {
    let before = filters.len();
    filters.retain(|f| f != key);
    filters.len() != before
}

/// Drop duplicate keys, keeping first occurrences in order.
pub fn dedup_in_order(keys: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(keys.len());
    for key in keys {
        if !seen.contains(&key) {
            seen.push(key);
        }
    }
    seen
}
