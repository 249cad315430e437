//! Question definitions ("tags") presented to the user one at a time.
//!
//! A [`FlowTag`] is either a single [`Tag`] or a [`TagGroup`] whose children are
//! shown together as one set of control elements. Tags are replaced wholesale on
//! every flow update and are never mutated by the input component.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Discriminates how a tag is answered.
///
/// Unknown kinds coming from authored forms are preserved in [`TagKind::Custom`]
/// so they round-trip, and are answered with free text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TagKind {
    /// Free-form text entry.
    #[default]
    Text,
    /// A file upload answered through the panel's upload element.
    File,
    /// Exactly one option out of many.
    Radio,
    /// Any number of options out of many.
    Checkbox,
    /// Select-style list where picking an option answers the question.
    Select,
    /// One or more plain buttons.
    Button,
    /// Domain-specific kind not known to this crate.
    Custom(String),
}

impl TagKind {
    /// Canonical string form used in authored definitions.
    pub fn as_str(&self) -> &str {
        match self {
            TagKind::Text => "text",
            TagKind::File => "file",
            TagKind::Radio => "radio",
            TagKind::Checkbox => "checkbox",
            TagKind::Select => "select",
            TagKind::Button => "button",
            TagKind::Custom(other) => other,
        }
    }

    /// Whether answers for this kind are picked from `options`.
    pub fn uses_options(&self) -> bool {
        matches!(self, TagKind::Radio | TagKind::Checkbox | TagKind::Select)
    }
}

impl From<String> for TagKind {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" | "input" | "" => TagKind::Text,
            "file" => TagKind::File,
            "radio" => TagKind::Radio,
            "checkbox" => TagKind::Checkbox,
            "select" => TagKind::Select,
            "button" => TagKind::Button,
            _ => TagKind::Custom(value),
        }
    }
}

impl From<TagKind> for String {
    fn from(value: TagKind) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A selectable option of a radio, checkbox, select or button tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagOption {
    /// Text shown on the control element.
    pub label: String,
    /// Value submitted when the option is chosen. Defaults to the label.
    #[serde(default)]
    pub value: Option<String>,
}

impl TagOption {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: None,
        }
    }

    /// The submitted value, falling back to the label.
    pub fn value(&self) -> &str {
        self.value.as_deref().unwrap_or(&self.label)
    }
}

/// A single question definition.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tag {
    /// Unique name used as the answer key.
    pub name: String,
    /// How the tag is answered.
    #[serde(rename = "type", default)]
    pub kind: TagKind,
    /// Prompt shown to the user.
    #[serde(default)]
    pub question: String,
    /// Fallback message shown when an answer is rejected.
    #[serde(default)]
    pub error_message: Option<String>,
    /// Whether an empty answer is rejected.
    #[serde(default)]
    pub required: bool,
    /// Optional regular expression free-text answers must match.
    #[serde(default)]
    pub pattern: Option<String>,
    /// Options for option-bearing kinds.
    #[serde(default)]
    pub options: Vec<TagOption>,
    /// Maximum accepted upload size in bytes for file tags.
    #[serde(default)]
    pub max_file_size: Option<u64>,
}

impl Tag {
    pub fn new(name: impl Into<String>, kind: TagKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Default::default()
        }
    }

    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.question = question.into();
        self
    }

    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn with_options<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = labels.into_iter().map(TagOption::new).collect();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// An ordered set of tags presented together as one control-elements panel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TagGroup {
    /// Unique name used as the answer key.
    pub name: String,
    /// Prompt shown to the user.
    #[serde(default)]
    pub question: String,
    /// Fallback message shown when an answer is rejected.
    #[serde(default)]
    pub error_message: Option<String>,
    /// Whether submitting without any selection is rejected.
    #[serde(default)]
    pub required: bool,
    /// Child tags, in display order.
    pub elements: Vec<Tag>,
}

/// The current question: a single tag or a group of tags.
///
/// Authored definitions distinguish the two structurally: an entry with an
/// `elements` list is a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlowTag {
    Group(TagGroup),
    Single(Tag),
}

impl FlowTag {
    pub fn name(&self) -> &str {
        match self {
            FlowTag::Group(group) => &group.name,
            FlowTag::Single(tag) => &tag.name,
        }
    }

    pub fn question(&self) -> &str {
        match self {
            FlowTag::Group(group) => &group.question,
            FlowTag::Single(tag) => &tag.question,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            FlowTag::Group(group) => group.error_message.as_deref(),
            FlowTag::Single(tag) => tag.error_message.as_deref(),
        }
    }

    pub fn is_required(&self) -> bool {
        match self {
            FlowTag::Group(group) => group.required,
            FlowTag::Single(tag) => tag.required,
        }
    }

    /// Attribute value describing the tag type ("group" for groups).
    pub fn type_name(&self) -> &str {
        match self {
            FlowTag::Group(_) => "group",
            FlowTag::Single(tag) => tag.kind.as_str(),
        }
    }

    /// Tags the control-elements panel is built from: a single tag becomes a
    /// one-element set, a group's elements are used directly.
    pub fn panel_tags(&self) -> &[Tag] {
        match self {
            FlowTag::Group(group) => &group.elements,
            FlowTag::Single(tag) => std::slice::from_ref(tag),
        }
    }
}

impl From<Tag> for FlowTag {
    fn from(value: Tag) -> Self {
        FlowTag::Single(value)
    }
}

impl From<TagGroup> for FlowTag {
    fn from(value: TagGroup) -> Self {
        FlowTag::Group(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kind_is_preserved() {
        let tag: Tag = serde_json::from_str(r#"{"name": "rating", "type": "stars"}"#).expect("deserialize tag");
        assert_eq!(tag.kind, TagKind::Custom("stars".to_string()));
        let back = serde_json::to_value(&tag).expect("serialize tag");
        assert_eq!(back["type"], "stars");
    }

    #[test]
    fn missing_kind_defaults_to_text() {
        let tag: Tag = serde_json::from_str(r#"{"name": "first_name"}"#).expect("deserialize tag");
        assert_eq!(tag.kind, TagKind::Text);
        assert!(!tag.required);
    }

    #[test]
    fn entry_with_elements_is_a_group() {
        let yaml = r#"
name: toppings
question: Pick your toppings
elements:
  - name: cheese
    type: checkbox
    options:
      - label: Extra cheese
"#;
        let tag: FlowTag = serde_yaml::from_str(yaml).expect("deserialize group");
        assert_eq!(tag.type_name(), "group");
        assert_eq!(tag.panel_tags().len(), 1);
        assert_eq!(tag.panel_tags()[0].kind, TagKind::Checkbox);
    }

    #[test]
    fn single_tag_panel_is_one_element_set() {
        let tag = FlowTag::from(Tag::new("email", TagKind::Text));
        assert_eq!(tag.panel_tags().len(), 1);
        assert_eq!(tag.panel_tags()[0].name, "email");
    }

    #[test]
    fn option_value_falls_back_to_label() {
        let mut option = TagOption::new("Blue");
        assert_eq!(option.value(), "Blue");
        option.value = Some("#00f".into());
        assert_eq!(option.value(), "#00f");
    }
}
