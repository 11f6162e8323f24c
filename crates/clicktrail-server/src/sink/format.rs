//! One-line console rendering of accepted records.

use clicktrail_audit_types::{EventData, ReceivedRecord, Snapshot};
use std::fmt::Write;

/// Render `received` as a single line, prefixed with its event label.
pub fn format_line(received: &ReceivedRecord) -> String {
    let record = &received.record;
    let mut line = format!(
        "{} [{}] user={} path={}",
        received.server_timestamp.to_rfc3339(),
        record.event_type().label(),
        record.user_id,
        record.path
    );

    // Writing into a String cannot fail.
    let _ = match &record.data {
        EventData::RouteChange(data) => match &data.previous_path {
            Some(from) => write!(line, " from={from}"),
            None => write!(line, " initial"),
        },
        EventData::Click(data) => write!(
            line,
            " element={} at=({},{}) button={}",
            describe(record.element_info.as_ref()),
            data.x,
            data.y,
            data.button
        ),
        EventData::FormSubmit(data) => write!(
            line,
            " fields=[{}]{}",
            data.form_fields.join(","),
            data.form_values
                .as_ref()
                .map(|values| format!(" values={}", values.len()))
                .unwrap_or_default()
        ),
        EventData::InputChange(data) => write!(
            line,
            " field={} type={} length={}",
            data.field_name.as_deref().unwrap_or("-"),
            data.input_type,
            data.value_length
        ),
        EventData::Custom(data) => write!(
            line,
            " event={} data={}",
            data.custom_event_type,
            serde_json::Value::Object(data.fields.clone())
        ),
    };

    line
}

/// Compact selector-like description: `tag#id.class1.class2`.
fn describe(snapshot: Option<&Snapshot>) -> String {
    let Some(snapshot) = snapshot else {
        return "-".to_string();
    };

    let mut out = snapshot.tag_name.clone().unwrap_or_else(|| "?".to_string());
    if let Some(id) = &snapshot.id {
        out.push('#');
        out.push_str(id);
    }
    if let Some(classes) = &snapshot.class_name {
        for class in classes.split_whitespace() {
            out.push('.');
            out.push_str(class);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clicktrail_audit_types::{
        AuditRecord, ClickData, CustomData, FormSubmitData, InputChangeData, RouteChangeData,
    };
    use serde_json::{json, Map};

    fn received(record: AuditRecord) -> ReceivedRecord {
        ReceivedRecord::receive(record)
    }

    #[test]
    fn test_route_line() {
        let line = format_line(&received(AuditRecord::new(
            "alice",
            "/page2",
            RouteChangeData {
                previous_path: Some("/page1".into()),
            },
        )));
        assert!(line.ends_with("[ROUTE] user=alice path=/page2 from=/page1"));

        let initial = format_line(&received(AuditRecord::new("alice", "/", RouteChangeData::default())));
        assert!(initial.ends_with("initial"));
    }

    #[test]
    fn test_click_line() {
        let record = AuditRecord::new(
            "u",
            "/",
            ClickData {
                x: 12.0,
                y: 34.0,
                button: 0,
            },
        )
        .with_element(Snapshot {
            tag_name: Some("button".into()),
            id: Some("buy".into()),
            class_name: Some("btn primary".into()),
            ..Default::default()
        });
        let line = format_line(&received(record));
        assert!(line.contains("[CLICK]"));
        assert!(line.ends_with("element=button#buy.btn.primary at=(12,34) button=0"));
    }

    #[test]
    fn test_form_line_omits_values() {
        let mut values = std::collections::BTreeMap::new();
        values.insert("email".to_string(), "a@b.c".to_string());
        let record = AuditRecord::new(
            "u",
            "/signup",
            FormSubmitData {
                form_fields: vec!["email".into(), "password".into()],
                form_values: Some(values),
                ..Default::default()
            },
        );
        let line = format_line(&received(record));
        assert!(line.ends_with("[FORM] user=u path=/signup fields=[email,password] values=1"));
        assert!(!line.contains("a@b.c"));
    }

    #[test]
    fn test_input_line() {
        let record = AuditRecord::new(
            "u",
            "/",
            InputChangeData {
                input_type: "email".into(),
                value_length: 5,
                field_name: Some("email".into()),
                value: None,
            },
        );
        assert!(format_line(&received(record)).ends_with("field=email type=email length=5"));
    }

    #[test]
    fn test_custom_line() {
        let mut fields = Map::new();
        fields.insert("orderId".into(), json!("123"));
        let record = AuditRecord::new("u", "/cart", CustomData::new("business_event_checkout", fields));
        let line = format_line(&received(record));
        assert!(line.contains("[CUSTOM]"));
        assert!(line.ends_with(r#"event=business_event_checkout data={"orderId":"123"}"#));
    }
}
