//! Configuration key paths.
//!
//! Keys are `:`-delimited paths such as `Logging:LogLevel:Default`. Lookups
//! are case-insensitive; the casing a provider reported is kept for display.

use std::cmp::Ordering;

/// Separator between key segments.
pub const KEY_DELIMITER: char = ':';

/// Joins a parent path and a child segment.
///
/// An empty parent is still a segment, so the result always grows.
///
/// ```
/// use confscope::key;
///
/// assert_eq!(key::combine(None, "Logging"), "Logging");
/// assert_eq!(key::combine(Some("Logging"), "LogLevel"), "Logging:LogLevel");
/// assert_eq!(key::combine(Some(""), ""), ":");
/// ```
pub fn combine(parent: Option<&str>, segment: &str) -> String {
    match parent {
        Some(parent) => format!("{parent}{KEY_DELIMITER}{segment}"),
        None => segment.to_string(),
    }
}

/// Returns the last segment of a path.
pub fn last_segment(path: &str) -> &str {
    path.rsplit(KEY_DELIMITER).next().unwrap_or(path)
}

/// Case-folded form of a key, used for map lookups.
pub fn fold(key: &str) -> String {
    key.to_lowercase()
}

/// Case-insensitive key equality.
pub fn eq(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || fold(a) == fold(b)
}

/// Returns the immediate child segment of `key` below `parent`.
///
/// With no parent this is the first segment. Returns `None` when `key` is not
/// a strict descendant of `parent`.
pub fn child_segment<'a>(key: &'a str, parent: Option<&str>) -> Option<&'a str> {
    let rest = match parent {
        None => key,
        Some(parent) => {
            let head = key.get(..parent.len())?;
            let tail = key.get(parent.len()..)?;

            if !eq(head, parent) {
                return None;
            }

            tail.strip_prefix(KEY_DELIMITER)?
        }
    };

    Some(rest.split(KEY_DELIMITER).next().unwrap_or(rest))
}

/// Appends the segments of `more` that `into` does not already contain
/// (compared case-insensitively), keeping first-seen casing.
pub fn merge_segments(into: &mut Vec<String>, more: impl IntoIterator<Item = String>) {
    for segment in more {
        if !into.iter().any(|existing| eq(existing, &segment)) {
            into.push(segment);
        }
    }
}

/// Display ordering for key names: case-insensitive, then ordinal.
pub fn compare(a: &str, b: &str) -> Ordering {
    fold(a).cmp(&fold(b)).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_keeps_empty_segments() {
        assert_eq!(combine(Some(""), "A"), ":A");
        assert_eq!(combine(Some(":"), ""), "::");
        assert_eq!(combine(Some("A:B"), "C"), "A:B:C");
    }

    #[test]
    fn test_child_segment_of_empty_segments() {
        assert_eq!(child_segment("::", None), Some(""));
        assert_eq!(child_segment("::", Some("")), Some(""));
        assert_eq!(child_segment("::", Some(":")), Some(""));
        assert_eq!(child_segment("::", Some("::")), None);
    }

    #[test]
    fn test_last_segment() {
        assert_eq!(last_segment("A:B:C"), "C");
        assert_eq!(last_segment("A"), "A");
    }

    #[test]
    fn test_child_segment_root() {
        assert_eq!(child_segment("Db:Host", None), Some("Db"));
        assert_eq!(child_segment("Port", None), Some("Port"));
    }

    #[test]
    fn test_child_segment_nested_is_case_insensitive() {
        assert_eq!(child_segment("DB:Host:Name", Some("db")), Some("Host"));
        assert_eq!(child_segment("db:host", Some("DB:HOST")), None);
        assert_eq!(child_segment("Dbx:Host", Some("Db")), None);
        assert_eq!(child_segment("Db", Some("Db")), None);
    }

    #[test]
    fn test_merge_segments_dedups_ignoring_case() {
        let mut keys = vec!["Logging".to_string()];
        merge_segments(
            &mut keys,
            ["LOGGING".to_string(), "Db".to_string(), "db".to_string()],
        );
        assert_eq!(keys, vec!["Logging", "Db"]);
    }

    #[test]
    fn test_compare_is_case_insensitive_first() {
        assert_eq!(compare("apple", "Banana"), Ordering::Less);
        assert_eq!(compare("B", "a"), Ordering::Greater);
        assert_eq!(compare("A", "a"), Ordering::Less);
    }
}
