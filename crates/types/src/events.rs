//! Domain events exchanged over the flow bus.
//!
//! Every event carries a [`Topic`]; subscribers register per topic and only
//! receive the events they asked for. Topic names are part of the contract
//! between the input component, its control elements and the flow engine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::flow::FlowDto;
use crate::tag::FlowTag;

/// Progress reported by a control element that does background work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressState {
    Busy,
    Idle,
}

impl ProgressState {
    pub fn is_busy(self) -> bool {
        matches!(self, ProgressState::Busy)
    }
}

/// Snapshot of a control element as reported in its own events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlElementRef {
    /// Position of the element inside the panel.
    pub index: usize,
    /// Name of the tag the element was built from.
    pub tag: String,
    /// Label shown on the element.
    pub label: String,
    /// Selection state at the time of the event.
    pub checked: bool,
}

/// Payload of a key-change notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputKeyChange {
    /// The answer as it currently stands.
    pub dto: FlowDto,
    /// Numeric key code of the released key.
    pub key_code: u32,
    /// Whether the text field held focus when the key was released.
    pub input_field_active: bool,
}

/// Events travelling over the flow bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "topic", content = "detail", rename_all = "kebab-case")]
pub enum FlowEvent {
    /// A new question is presented.
    FlowUpdate(FlowTag),
    /// The current answer was rejected upstream.
    UserInputInvalid(FlowDto),
    /// A control element asks for its value to be submitted.
    ControlElementSubmitValue(ControlElementRef),
    /// A control element started or finished background work.
    ControlElementProgressChange(ProgressState),
    /// An upload element needs the host to supply a file.
    FileSelectionRequested { element: usize },
    /// The user submitted an answer.
    UserInputSubmit(FlowDto),
    /// The user released a key that is not handled as a submission.
    UserInputKeyChange(InputKeyChange),
    /// The input component attached its control-elements panel.
    ControlElementsAdded,
}

impl FlowEvent {
    pub fn topic(&self) -> Topic {
        match self {
            FlowEvent::FlowUpdate(_) => Topic::FlowUpdate,
            FlowEvent::UserInputInvalid(_) => Topic::UserInputInvalid,
            FlowEvent::ControlElementSubmitValue(_) => Topic::ControlElementSubmitValue,
            FlowEvent::ControlElementProgressChange(_) => Topic::ControlElementProgressChange,
            FlowEvent::FileSelectionRequested { .. } => Topic::FileSelectionRequested,
            FlowEvent::UserInputSubmit(_) => Topic::UserInputSubmit,
            FlowEvent::UserInputKeyChange(_) => Topic::UserInputKeyChange,
            FlowEvent::ControlElementsAdded => Topic::ControlElementsAdded,
        }
    }
}

/// Subscription topics, covering bus events and raw input-device sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    FlowUpdate,
    UserInputInvalid,
    ControlElementSubmitValue,
    ControlElementProgressChange,
    FileSelectionRequested,
    UserInputSubmit,
    UserInputKeyChange,
    ControlElementsAdded,
    KeyDown,
    KeyUp,
    WindowFocus,
    SubmitButtonClick,
}

impl Topic {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Topic::FlowUpdate => "flow-update",
            Topic::UserInputInvalid => "user-input-invalid",
            Topic::ControlElementSubmitValue => "control-element-submit-value",
            Topic::ControlElementProgressChange => "control-element-progress-change",
            Topic::FileSelectionRequested => "control-element-file-selection",
            Topic::UserInputSubmit => "user-input-submit",
            Topic::UserInputKeyChange => "user-input-key-change",
            Topic::ControlElementsAdded => "user-input-control-elements-added",
            Topic::KeyDown => "key-down",
            Topic::KeyUp => "key-up",
            Topic::WindowFocus => "window-focus",
            Topic::SubmitButtonClick => "submit-button-click",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::{Tag, TagKind};

    #[test]
    fn event_topics_match_variants() {
        let update = FlowEvent::FlowUpdate(Tag::new("name", TagKind::Text).into());
        assert_eq!(update.topic(), Topic::FlowUpdate);
        assert_eq!(update.topic().as_str(), "flow-update");
        assert_eq!(
            FlowEvent::ControlElementProgressChange(ProgressState::Busy).topic().to_string(),
            "control-element-progress-change"
        );
    }

    #[test]
    fn events_serialize_with_topic_names() {
        let event = FlowEvent::ControlElementProgressChange(ProgressState::Idle);
        let json = serde_json::to_value(&event).expect("serialize event");
        assert_eq!(json["topic"], "control-element-progress-change");
        assert_eq!(json["detail"], "idle");
    }
}
