//! Location and history types.

use std::sync::Arc;

/// A completed navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// Location before the navigation.
    pub from: String,
    /// Location after the navigation.
    pub to: String,
}

/// Callback invoked after the location changed.
pub type HistoryListener = Arc<dyn Fn(&Navigation) + Send + Sync>;

/// Handle returned by [`Document::listen_history`](crate::Document::listen_history).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HistoryListenerId(u64);

impl HistoryListenerId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Normalize a location to path + query + fragment, always rooted.
pub fn normalize_location(location: &str) -> String {
    let trimmed = location.trim();
    // Drop scheme and authority if a full URL was given.
    let without_origin = match trimmed.find("://") {
        Some(idx) => {
            let rest = &trimmed[idx + 3..];
            match rest.find(['/', '?', '#']) {
                Some(start) => &rest[start..],
                None => "",
            }
        }
        None => trimmed,
    };

    if without_origin.starts_with('/') {
        without_origin.to_string()
    } else {
        format!("/{without_origin}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("/page1", "/page1")]
    #[test_case("page1", "/page1")]
    #[test_case("", "/")]
    #[test_case("/search?q=rust#top", "/search?q=rust#top")]
    #[test_case("https://example.com/a/b?c=1", "/a/b?c=1")]
    #[test_case("https://example.com", "/")]
    #[test_case("https://example.com?x=1", "/?x=1")]
    fn test_normalize_location(input: &str, expected: &str) {
        assert_eq!(normalize_location(input), expected);
    }
}
