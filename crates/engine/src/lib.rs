//! # Chatform Engine
//!
//! Loads conversational form definitions and sequences them question by
//! question. The engine is the counterpart of the input component: it
//! publishes `flow-update` events for each question and judges the answers
//! that come back as `user-input-submit`.
//!
//! ## Usage
//!
//! ```rust
//! use chatform_engine::{FlowManager, parse_form_file};
//!
//! let temp_dir = tempfile::tempdir()?;
//! let form_path = temp_dir.path().join("signup.yaml");
//! std::fs::write(&form_path, r#"
//! title: Signup
//! tags:
//!   - name: email
//!     type: text
//!     question: What's your email?
//! "#)?;
//!
//! let definition = parse_form_file(&form_path)?;
//! let mut manager = FlowManager::new(definition)?;
//! let first = manager.start();
//! assert_eq!(first.len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::{fs, path::Path};

use anyhow::{Context, Result};

pub mod definition;
pub mod flow_manager;
pub mod validation;

pub use definition::{DefinitionError, FormDefinition};
pub use flow_manager::FlowManager;
pub use validation::Rejection;

/// Loads a form definition with format detection by file extension.
///
/// Files ending in `.json` are parsed as JSON; everything else is parsed as
/// YAML. The definition is validated before it is returned.
pub fn parse_form_file(file_path: impl AsRef<Path>) -> Result<FormDefinition> {
    let file_path = file_path.as_ref();
    let content = fs::read_to_string(file_path).with_context(|| format!("Failed to read form file: {}", file_path.display()))?;

    let is_json = file_path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let definition: FormDefinition = if is_json {
        serde_json::from_str(&content).with_context(|| format!("Invalid JSON form: {}", file_path.display()))?
    } else {
        serde_yaml::from_str(&content).with_context(|| format!("Invalid YAML form: {}", file_path.display()))?
    };

    definition
        .validate()
        .with_context(|| format!("Form definition rejected: {}", file_path.display()))?;
    Ok(definition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatform_types::{FlowTag, TagKind};

    #[test]
    fn parses_yaml_form_with_group() {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        let path = temp_dir.path().join("pizza.yaml");
        fs::write(
            &path,
            r#"
title: Pizza
tags:
  - name: size
    type: radio
    question: Which size?
    options:
      - label: Small
      - label: Large
        value: L
  - name: extras
    question: Anything else?
    elements:
      - name: cheese
        type: checkbox
        options:
          - label: Extra cheese
"#,
        )
        .expect("write form");

        let definition = parse_form_file(&path).expect("parse form");
        assert_eq!(definition.title.as_deref(), Some("Pizza"));
        assert_eq!(definition.len(), 2);
        match &definition.tags[0] {
            FlowTag::Single(tag) => {
                assert_eq!(tag.kind, TagKind::Radio);
                assert_eq!(tag.options[1].value(), "L");
            }
            other => panic!("expected single tag, got {other:?}"),
        }
        assert!(matches!(&definition.tags[1], FlowTag::Group(group) if group.elements.len() == 1));
    }

    #[test]
    fn parses_json_form_by_extension() {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        let path = temp_dir.path().join("form.json");
        fs::write(&path, r#"{"tags": [{"name": "resume", "type": "file", "max_file_size": 1024}]}"#).expect("write form");

        let definition = parse_form_file(&path).expect("parse form");
        assert_eq!(definition.tags[0].type_name(), "file");
    }

    #[test]
    fn invalid_definition_is_an_error() {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        let path = temp_dir.path().join("empty.yaml");
        fs::write(&path, "title: Nothing\ntags: []\n").expect("write form");

        let error = parse_form_file(&path).expect_err("empty form rejected");
        assert!(format!("{error:#}").contains("no questions"));
    }
}
