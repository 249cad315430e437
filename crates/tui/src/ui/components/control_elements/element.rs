//! Individual control elements: buttons, choices and the upload trigger.

use std::path::{Path, PathBuf};

use chatform_types::{ControlElementRef, ControlSelection, FlowEvent, Tag, TagKind};
use rat_focus::FocusFlag;
use tracing::debug;

use crate::bus::EventPort;

/// Behavioural variant of a control element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    /// Submits its value when activated.
    Button,
    /// Submits its value when activated; exclusive within its tag.
    RadioButton,
    /// Toggles its selection when activated.
    CheckboxButton,
    /// Submits its value when activated; exclusive within its tag.
    OptionButton,
    /// Asks the host for a file when activated.
    UploadFile,
}

impl ControlKind {
    /// Whether selecting this element deselects its siblings of the same tag.
    pub fn is_exclusive(self) -> bool {
        matches!(self, ControlKind::Button | ControlKind::RadioButton | ControlKind::OptionButton)
    }
}

/// One interactive affordance inside the control-elements panel.
#[derive(Debug, Clone)]
pub struct ControlElement {
    index: usize,
    kind: ControlKind,
    tag: String,
    label: String,
    value: String,
    checked: bool,
    visible: bool,
    highlighted: bool,
    file: Option<PathBuf>,
    max_file_size: Option<u64>,
    pub f_element: FocusFlag,
}

impl ControlElement {
    fn new(index: usize, kind: ControlKind, tag: &Tag, label: &str, value: &str) -> Self {
        Self {
            index,
            kind,
            tag: tag.name.clone(),
            label: label.to_string(),
            value: value.to_string(),
            checked: false,
            visible: true,
            highlighted: false,
            file: None,
            max_file_size: tag.max_file_size,
            f_element: FocusFlag::named(&format!("cf-input.controls.list.{index}")),
        }
    }

    /// Builds the elements a tag contributes, numbering them from `first_index`.
    pub fn build_for_tag(tag: &Tag, first_index: usize) -> Vec<ControlElement> {
        let per_option = |kind: ControlKind| -> Vec<ControlElement> {
            tag.options
                .iter()
                .enumerate()
                .map(|(offset, option)| ControlElement::new(first_index + offset, kind, tag, &option.label, option.value()))
                .collect()
        };
        match &tag.kind {
            TagKind::Radio => per_option(ControlKind::RadioButton),
            TagKind::Checkbox => per_option(ControlKind::CheckboxButton),
            TagKind::Select => per_option(ControlKind::OptionButton),
            TagKind::Button if tag.options.is_empty() => {
                let label = if tag.question.is_empty() { tag.name.as_str() } else { tag.question.as_str() };
                vec![ControlElement::new(first_index, ControlKind::Button, tag, label, &tag.name)]
            }
            TagKind::Button => per_option(ControlKind::Button),
            TagKind::File => vec![ControlElement::new(first_index, ControlKind::UploadFile, tag, "Select file", "")],
            TagKind::Text | TagKind::Custom(_) => Vec::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> ControlKind {
        self.kind
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    pub fn set_highlighted(&mut self, highlighted: bool) {
        self.highlighted = highlighted;
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn max_file_size(&self) -> Option<u64> {
        self.max_file_size
    }

    pub fn is_focused(&self) -> bool {
        self.f_element.get()
    }

    /// Records the file chosen for an upload element and marks it selected.
    pub fn attach_file(&mut self, path: PathBuf) {
        self.label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.value = path.display().to_string();
        self.file = Some(path);
        self.checked = true;
    }

    /// Snapshot carried by this element's own events.
    pub fn snapshot(&self) -> ControlElementRef {
        ControlElementRef {
            index: self.index,
            tag: self.tag.clone(),
            label: self.label.clone(),
            checked: self.checked,
        }
    }

    /// Contribution to the panel's answer, when selected.
    pub fn selection(&self) -> Option<ControlSelection> {
        if !self.checked {
            return None;
        }
        if self.kind == ControlKind::UploadFile && self.file.is_none() {
            return None;
        }
        Some(ControlSelection {
            tag: self.tag.clone(),
            label: self.label.clone(),
            value: self.value.clone(),
            file: self.file.clone(),
        })
    }

    /// The element's primary action, as triggered by a click or Space.
    ///
    /// Choices and buttons publish `control-element-submit-value`, checkboxes
    /// toggle locally, and upload elements ask the host for a file.
    pub fn trigger_primary_action(&mut self, port: &mut dyn EventPort) {
        debug!(element = self.index, kind = ?self.kind, "control element: primary action");
        match self.kind {
            ControlKind::Button | ControlKind::RadioButton | ControlKind::OptionButton => {
                self.checked = true;
                port.emit(FlowEvent::ControlElementSubmitValue(self.snapshot()));
            }
            ControlKind::CheckboxButton => {
                self.checked = !self.checked;
            }
            ControlKind::UploadFile => {
                port.emit(FlowEvent::FileSelectionRequested { element: self.index });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::EventBus;

    #[test]
    fn radio_tag_builds_one_element_per_option() {
        let tag = Tag::new("size", TagKind::Radio).with_options(["S", "M", "L"]);
        let elements = ControlElement::build_for_tag(&tag, 2);
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[0].index(), 2);
        assert_eq!(elements[2].label(), "L");
        assert!(elements.iter().all(|e| e.kind() == ControlKind::RadioButton));
    }

    #[test]
    fn text_tag_builds_nothing() {
        assert!(ControlElement::build_for_tag(&Tag::new("name", TagKind::Text), 0).is_empty());
        assert!(ControlElement::build_for_tag(&Tag::new("x", TagKind::Custom("stars".into())), 0).is_empty());
    }

    #[test]
    fn radio_activation_submits_snapshot() {
        let tag = Tag::new("size", TagKind::Radio).with_options(["S"]);
        let mut element = ControlElement::build_for_tag(&tag, 0).remove(0);
        let mut bus = EventBus::new();
        element.trigger_primary_action(&mut bus);

        assert!(element.is_checked());
        match bus.next_event() {
            Some(FlowEvent::ControlElementSubmitValue(snapshot)) => {
                assert_eq!(snapshot.label, "S");
                assert!(snapshot.checked);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn checkbox_activation_toggles_without_events() {
        let tag = Tag::new("extras", TagKind::Checkbox).with_options(["Cheese"]);
        let mut element = ControlElement::build_for_tag(&tag, 0).remove(0);
        let mut bus = EventBus::new();
        element.trigger_primary_action(&mut bus);
        assert!(element.is_checked());
        element.trigger_primary_action(&mut bus);
        assert!(!element.is_checked());
        assert!(bus.next_event().is_none());
    }

    #[test]
    fn upload_requests_file_and_reports_attachment() {
        let tag = Tag::new("resume", TagKind::File);
        let mut element = ControlElement::build_for_tag(&tag, 0).remove(0);
        assert!(element.selection().is_none());

        let mut bus = EventBus::new();
        element.trigger_primary_action(&mut bus);
        assert_eq!(bus.next_event(), Some(FlowEvent::FileSelectionRequested { element: 0 }));

        element.attach_file(PathBuf::from("/tmp/cv.pdf"));
        let selection = element.selection().expect("file selected");
        assert_eq!(selection.label, "cv.pdf");
        assert_eq!(selection.file.as_deref(), Some(Path::new("/tmp/cv.pdf")));
    }
}
