//! The flow data-transfer object carrying one user answer in transit.

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

static NEXT_INPUT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a user input component instance.
///
/// A [`FlowDto`] carries this as a back-reference to the component it came
/// from; it is a plain reference and confers no ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputId(u64);

impl InputId {
    /// Allocates a process-unique identifier.
    pub fn next() -> Self {
        Self(NEXT_INPUT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "input#{}", self.0)
    }
}

/// One chosen control element inside a [`ControlValue`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlSelection {
    /// Name of the tag the element was built from.
    pub tag: String,
    /// Label shown on the element.
    pub label: String,
    /// Submitted value.
    pub value: String,
    /// File attached to an upload element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// Structured answer produced by the control-elements panel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ControlValue {
    /// Human readable summary of the selection.
    pub text: String,
    /// Selected elements in display order.
    pub selections: Vec<ControlSelection>,
}

/// The effective payload of an answer: exactly one of free text or a
/// control-element value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "snake_case")]
pub enum FlowPayload {
    Text(String),
    Controls(ControlValue),
}

impl FlowPayload {
    /// Text representation of the payload.
    pub fn text(&self) -> &str {
        match self {
            FlowPayload::Text(text) => text,
            FlowPayload::Controls(value) => &value.text,
        }
    }
}

/// One user answer exchanged between the input component and the flow engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowDto {
    pub payload: FlowPayload,
    /// Originating input component. Always set before the DTO leaves it.
    #[serde(default)]
    pub input: Option<InputId>,
    /// Message to display when the value is rejected upstream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_text: Option<String>,
}

impl FlowDto {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            payload: FlowPayload::Text(text.into()),
            input: None,
            error_text: None,
        }
    }

    pub fn controls(value: ControlValue) -> Self {
        Self {
            payload: FlowPayload::Controls(value),
            input: None,
            error_text: None,
        }
    }

    pub fn with_input(mut self, input: InputId) -> Self {
        self.input = Some(input);
        self
    }

    pub fn with_error_text(mut self, error_text: impl Into<String>) -> Self {
        self.error_text = Some(error_text.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_ids_are_unique() {
        let first = InputId::next();
        let second = InputId::next();
        assert_ne!(first, second);
    }

    #[test]
    fn payload_serializes_with_source_discriminator() {
        let dto = FlowDto::text("hello").with_error_text("too short");
        let json = serde_json::to_value(&dto).expect("serialize dto");
        assert_eq!(json["payload"]["source"], "text");
        assert_eq!(json["payload"]["value"], "hello");
        assert_eq!(json["error_text"], "too short");
    }

    #[test]
    fn controls_payload_text_is_summary() {
        let dto = FlowDto::controls(ControlValue {
            text: "Red, Blue".into(),
            selections: Vec::new(),
        });
        assert_eq!(dto.payload.text(), "Red, Blue");
        assert!(dto.input.is_none());
    }
}
