//! Bounded element snapshots.

use crate::config::PrivacyConfig;
use clicktrail_audit_types::Snapshot;
use clicktrail_dom::Element;

/// Describe `element` without reading its value or descendants.
pub fn extract(element: &Element, privacy: &PrivacyConfig) -> Snapshot {
    Snapshot {
        tag_name: non_empty(element.tag_name()),
        class_name: element.class_name(),
        id: element.id().and_then(non_empty),
        text: element
            .text()
            .and_then(|text| truncate_text(text, privacy.max_text_length)),
        href: element.href().and_then(non_empty),
        kind: element.input_type().and_then(non_empty),
    }
}

/// Collapse whitespace runs and keep at most `max_chars` characters.
///
/// Returns `None` when nothing visible remains.
pub fn truncate_text(text: &str, max_chars: usize) -> Option<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let truncated: String = collapsed.chars().take(max_chars).collect();
    let truncated = truncated.trim_end();
    non_empty(truncated)
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
