//! Element snapshots.

use serde::{Deserialize, Serialize};

/// Bounded description of the element an interaction targeted.
///
/// Every field is omitted from the wire form when the source element does
/// not carry it; empty strings are never emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Lower-cased tag name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,
    /// Space-separated class list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// Element id attribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Trimmed, truncated text content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Link target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// `type` attribute (inputs and buttons).
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "type")]
    pub kind: Option<String>,
}

impl Snapshot {
    /// Check whether the snapshot carries no information at all.
    pub fn is_empty(&self) -> bool {
        self.tag_name.is_none()
            && self.class_name.is_none()
            && self.id.is_none()
            && self.text.is_none()
            && self.href.is_none()
            && self.kind.is_none()
    }

    /// Compact CSS-like description, e.g. `button#buy.btn.primary`.
    pub fn describe(&self) -> String {
        let mut out = self.tag_name.clone().unwrap_or_else(|| "element".to_string());
        if let Some(id) = &self.id {
            out.push('#');
            out.push_str(id);
        }
        if let Some(classes) = &self.class_name {
            for class in classes.split_whitespace() {
                out.push('.');
                out.push_str(class);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_fields_are_omitted() {
        let snapshot = Snapshot {
            tag_name: Some("button".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json, serde_json::json!({ "tagName": "button" }));
    }

    #[test]
    fn test_type_field_name() {
        let snapshot = Snapshot {
            tag_name: Some("input".into()),
            kind: Some("email".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["type"], "email");
    }

    #[test]
    fn test_describe() {
        let snapshot = Snapshot {
            tag_name: Some("button".into()),
            id: Some("buy".into()),
            class_name: Some("btn primary".into()),
            ..Default::default()
        };
        assert_eq!(snapshot.describe(), "button#buy.btn.primary");
        assert_eq!(Snapshot::default().describe(), "element");
        assert!(Snapshot::default().is_empty());
    }
}
