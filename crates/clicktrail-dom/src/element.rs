//! Document elements.

use std::collections::BTreeMap;
use std::fmt;

/// Identity of an element inside a [`Document`](crate::Document).
///
/// Ids are assigned on insertion and never reused, so they double as
/// document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw id.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// Tags that receive text edits.
const TEXT_INPUT_TYPES: &[&str] = &["text", "email", "search", "tel", "url", "number", "password"];

/// A single element: tag, identity attributes and shallow content.
///
/// Children are tracked by the document, not by the element, so cloning an
/// element is always O(attributes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    node_id: Option<NodeId>,
    tag_name: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    text: Option<String>,
    value: Option<String>,
}

impl Element {
    /// Create a detached element.
    pub fn new(tag_name: impl AsRef<str>) -> Self {
        Self {
            node_id: None,
            tag_name: tag_name.as_ref().trim().to_ascii_lowercase(),
            id: None,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            text: None,
            value: None,
        }
    }

    /// Set the id attribute.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        self.id = (!id.is_empty()).then_some(id);
        self
    }

    /// Add one or more space-separated classes.
    pub fn with_class(mut self, classes: impl AsRef<str>) -> Self {
        for class in classes.as_ref().split_whitespace() {
            if !self.classes.iter().any(|c| c == class) {
                self.classes.push(class.to_string());
            }
        }
        self
    }

    /// Set an attribute. `id` and `class` update the dedicated fields.
    pub fn with_attr(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        let name = name.as_ref().to_ascii_lowercase();
        match name.as_str() {
            "id" => self.with_id(value),
            "class" => {
                self.classes.clear();
                self.with_class(value.into())
            }
            _ => {
                self.attributes.insert(name, value.into());
                self
            }
        }
    }

    /// Set the text content.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the current value (form controls).
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub(crate) fn set_node_id(&mut self, node_id: NodeId) {
        self.node_id = Some(node_id);
    }

    pub(crate) fn set_value(&mut self, value: String) {
        self.value = Some(value);
    }

    pub(crate) fn set_text(&mut self, text: Option<String>) {
        self.text = text;
    }

    /// Identity inside its document; `None` while detached.
    pub fn node_id(&self) -> Option<NodeId> {
        self.node_id
    }

    /// Lower-cased tag name.
    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    /// The id attribute.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Class list in declaration order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Check for a class.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Space-joined class list, `None` when there are no classes.
    pub fn class_name(&self) -> Option<String> {
        (!self.classes.is_empty()).then(|| self.classes.join(" "))
    }

    /// Look up an attribute (`id` and `class` included).
    pub fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "id" => self.id.clone(),
            "class" => self.class_name(),
            _ => self.attributes.get(name).cloned(),
        }
    }

    /// Check whether an attribute is present.
    pub fn has_attribute(&self, name: &str) -> bool {
        match name {
            "id" => self.id.is_some(),
            "class" => !self.classes.is_empty(),
            _ => self.attributes.contains_key(name),
        }
    }

    /// Text content.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Current value.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// `href` attribute.
    pub fn href(&self) -> Option<&str> {
        self.attributes.get("href").map(String::as_str)
    }

    /// `type` attribute.
    pub fn input_type(&self) -> Option<&str> {
        self.attributes.get("type").map(String::as_str)
    }

    /// `name` attribute.
    pub fn name(&self) -> Option<&str> {
        self.attributes.get("name").map(String::as_str)
    }

    /// Whether this is a form control that can carry a submitted value.
    pub fn is_form_control(&self) -> bool {
        matches!(self.tag_name.as_str(), "input" | "select" | "textarea")
    }

    /// Whether edits to this element are free text.
    pub fn is_text_input(&self) -> bool {
        match self.tag_name.as_str() {
            "textarea" => true,
            "input" => match self.input_type() {
                None => true,
                Some(kind) => TEXT_INPUT_TYPES.contains(&kind.to_ascii_lowercase().as_str()),
            },
            _ => false,
        }
    }

    /// Whether this is a password field.
    pub fn is_password(&self) -> bool {
        self.tag_name == "input"
            && self
                .input_type()
                .is_some_and(|kind| kind.eq_ignore_ascii_case("password"))
    }
}
