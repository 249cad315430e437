//! Authored form definitions.

use std::collections::HashSet;

use chatform_types::{FlowTag, Tag, TagKind};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Problems found while checking a form definition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("form has no questions")]
    Empty,
    #[error("question name must not be empty (entry {index})")]
    MissingName { index: usize },
    #[error("duplicate question name '{name}'")]
    DuplicateName { name: String },
    #[error("group '{name}' has no elements")]
    EmptyGroup { name: String },
    #[error("question '{name}' of type '{kind}' needs at least one option")]
    MissingOptions { name: String, kind: String },
    #[error("question '{name}' has an invalid pattern: {message}")]
    InvalidPattern { name: String, message: String },
}

/// A sequence of questions presented one at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormDefinition {
    /// Optional title shown above the conversation.
    #[serde(default)]
    pub title: Option<String>,
    /// Questions in presentation order.
    #[serde(default)]
    pub tags: Vec<FlowTag>,
}

impl FormDefinition {
    /// Checks structural invariants the flow manager relies on.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.tags.is_empty() {
            return Err(DefinitionError::Empty);
        }
        let mut seen = HashSet::new();
        for (index, entry) in self.tags.iter().enumerate() {
            let name = entry.name().trim();
            if name.is_empty() {
                return Err(DefinitionError::MissingName { index });
            }
            if !seen.insert(name.to_string()) {
                return Err(DefinitionError::DuplicateName { name: name.to_string() });
            }
            match entry {
                FlowTag::Single(tag) => validate_tag(tag)?,
                FlowTag::Group(group) => {
                    if group.elements.is_empty() {
                        return Err(DefinitionError::EmptyGroup { name: group.name.clone() });
                    }
                    for element in &group.elements {
                        validate_tag(element)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Number of questions in the form.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

fn validate_tag(tag: &Tag) -> Result<(), DefinitionError> {
    if tag.kind.uses_options() && tag.options.is_empty() {
        return Err(DefinitionError::MissingOptions {
            name: tag.name.clone(),
            kind: tag.kind.to_string(),
        });
    }
    if let Some(pattern) = &tag.pattern {
        compile_pattern(&tag.name, pattern)?;
    }
    Ok(())
}

pub(crate) fn compile_pattern(name: &str, pattern: &str) -> Result<Regex, DefinitionError> {
    Regex::new(pattern).map_err(|error| DefinitionError::InvalidPattern {
        name: name.to_string(),
        message: error.to_string(),
    })
}

/// Whether the tag is answered through control elements rather than text.
pub(crate) fn answered_by_controls(tag: &Tag) -> bool {
    match tag.kind {
        TagKind::Radio | TagKind::Checkbox | TagKind::Select | TagKind::Button | TagKind::File => true,
        TagKind::Text | TagKind::Custom(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatform_types::TagGroup;

    fn form(tags: Vec<FlowTag>) -> FormDefinition {
        FormDefinition { title: None, tags }
    }

    #[test]
    fn empty_form_is_rejected() {
        assert_eq!(form(Vec::new()).validate(), Err(DefinitionError::Empty));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let definition = form(vec![
            Tag::new("name", TagKind::Text).into(),
            Tag::new("name", TagKind::Text).into(),
        ]);
        assert_eq!(
            definition.validate(),
            Err(DefinitionError::DuplicateName { name: "name".into() })
        );
    }

    #[test]
    fn option_kinds_need_options() {
        let definition = form(vec![Tag::new("color", TagKind::Radio).into()]);
        assert!(matches!(definition.validate(), Err(DefinitionError::MissingOptions { .. })));
    }

    #[test]
    fn group_children_are_checked() {
        let group = TagGroup {
            name: "extras".into(),
            elements: vec![Tag::new("size", TagKind::Select)],
            ..Default::default()
        };
        assert!(matches!(form(vec![group.into()]).validate(), Err(DefinitionError::MissingOptions { .. })));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let mut tag = Tag::new("zip", TagKind::Text);
        tag.pattern = Some("([0-9".into());
        assert!(matches!(form(vec![tag.into()]).validate(), Err(DefinitionError::InvalidPattern { .. })));
    }
}
