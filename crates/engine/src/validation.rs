//! Answer validation against the question that was asked.

use std::collections::HashMap;

use chatform_types::{ControlSelection, FlowPayload, FlowTag, Tag, TagKind};
use regex::Regex;
use serde_json::Value;

use crate::definition::answered_by_controls;

/// Why an answer was rejected. `message` is `None` when the question's own
/// error message should be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub message: Option<String>,
}

impl Rejection {
    fn fallback() -> Self {
        Self { message: None }
    }

    fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}

/// Validates `payload` for `tag` and converts it into the recorded answer.
pub(crate) fn validate_answer(tag: &FlowTag, payload: &FlowPayload, patterns: &HashMap<String, Regex>) -> Result<Value, Rejection> {
    match tag {
        FlowTag::Single(single) if answered_by_controls(single) => {
            let selections = selections_of(payload);
            check_selections(single.required, &selections, std::slice::from_ref(single))?;
            Ok(selection_value(single, &selections))
        }
        FlowTag::Single(single) => validate_text(single, payload.text(), patterns),
        FlowTag::Group(group) => {
            let selections = selections_of(payload);
            check_selections(group.required, &selections, &group.elements)?;
            Ok(Value::Array(selections.iter().map(|s| Value::String(s.value.clone())).collect()))
        }
    }
}

fn validate_text(tag: &Tag, text: &str, patterns: &HashMap<String, Regex>) -> Result<Value, Rejection> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        if tag.required {
            return Err(Rejection::fallback());
        }
        return Ok(Value::Null);
    }
    if let Some(pattern) = patterns.get(&tag.name)
        && !pattern.is_match(trimmed)
    {
        return Err(Rejection::fallback());
    }
    Ok(Value::String(trimmed.to_string()))
}

fn selections_of(payload: &FlowPayload) -> Vec<ControlSelection> {
    match payload {
        FlowPayload::Controls(value) => value.selections.clone(),
        FlowPayload::Text(_) => Vec::new(),
    }
}

fn check_selections(required: bool, selections: &[ControlSelection], tags: &[Tag]) -> Result<(), Rejection> {
    if selections.is_empty() {
        return if required { Err(Rejection::fallback()) } else { Ok(()) };
    }
    for selection in selections {
        let Some(tag) = tags.iter().find(|tag| tag.name == selection.tag) else {
            return Err(Rejection::with_message(format!("'{}' does not belong to this question", selection.label)));
        };
        match tag.kind {
            TagKind::File => {
                if selection.file.is_none() {
                    return Err(Rejection::fallback());
                }
            }
            TagKind::Radio | TagKind::Checkbox | TagKind::Select => {
                if !tag.options.iter().any(|option| option.value() == selection.value) {
                    return Err(Rejection::with_message(format!("'{}' is not one of the offered options", selection.label)));
                }
            }
            TagKind::Button | TagKind::Text | TagKind::Custom(_) => {}
        }
    }
    Ok(())
}

fn selection_value(tag: &Tag, selections: &[ControlSelection]) -> Value {
    match tag.kind {
        TagKind::Checkbox => Value::Array(selections.iter().map(|s| Value::String(s.value.clone())).collect()),
        TagKind::File => selections
            .first()
            .and_then(|s| s.file.as_ref())
            .map(|path| Value::String(path.display().to_string()))
            .unwrap_or(Value::Null),
        _ => selections.first().map(|s| Value::String(s.value.clone())).unwrap_or(Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatform_types::ControlValue;
    use serde_json::json;

    fn selection(tag: &str, label: &str) -> ControlSelection {
        ControlSelection {
            tag: tag.into(),
            label: label.into(),
            value: label.into(),
            file: None,
        }
    }

    fn controls(selections: Vec<ControlSelection>) -> FlowPayload {
        FlowPayload::Controls(ControlValue {
            text: String::new(),
            selections,
        })
    }

    #[test]
    fn required_text_rejects_blank_answer() {
        let tag = FlowTag::from(Tag::new("name", TagKind::Text).required());
        let result = validate_answer(&tag, &FlowPayload::Text("   ".into()), &HashMap::new());
        assert_eq!(result, Err(Rejection { message: None }));
    }

    #[test]
    fn pattern_mismatch_is_rejected() {
        let tag = FlowTag::from(Tag::new("zip", TagKind::Text));
        let mut patterns = HashMap::new();
        patterns.insert("zip".to_string(), Regex::new(r"^\d{5}$").expect("regex"));

        assert!(validate_answer(&tag, &FlowPayload::Text("12ab".into()), &patterns).is_err());
        assert_eq!(
            validate_answer(&tag, &FlowPayload::Text(" 12345 ".into()), &patterns),
            Ok(json!("12345"))
        );
    }

    #[test]
    fn radio_answer_must_be_an_offered_option() {
        let tag = FlowTag::from(Tag::new("color", TagKind::Radio).with_options(["Red", "Blue"]));
        assert_eq!(
            validate_answer(&tag, &controls(vec![selection("color", "Blue")]), &HashMap::new()),
            Ok(json!("Blue"))
        );
        let rejected = validate_answer(&tag, &controls(vec![selection("color", "Green")]), &HashMap::new());
        assert!(rejected.expect_err("green is rejected").message.is_some());
    }

    #[test]
    fn checkbox_answer_is_recorded_as_list() {
        let tag = FlowTag::from(Tag::new("extras", TagKind::Checkbox).with_options(["Cheese", "Olives"]));
        let value = validate_answer(
            &tag,
            &controls(vec![selection("extras", "Cheese"), selection("extras", "Olives")]),
            &HashMap::new(),
        );
        assert_eq!(value, Ok(json!(["Cheese", "Olives"])));
    }

    #[test]
    fn required_file_needs_attachment() {
        let tag = FlowTag::from(Tag::new("resume", TagKind::File).required());
        assert!(validate_answer(&tag, &FlowPayload::Text(String::new()), &HashMap::new()).is_err());
    }
}
