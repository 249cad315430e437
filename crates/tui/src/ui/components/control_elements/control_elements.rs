//! The control-elements panel.
//!
//! Owns the interactive elements built for the current question. The input
//! component drives it through a narrow contract (activity, value, reset,
//! rebuild, selection, focus, highlighted activation). The panel reports
//! back only through its own bus events (`control-element-submit-value`,
//! `control-element-progress-change`, `control-element-file-selection`);
//! it never calls into the input component.

use std::fs;
use std::path::Path;

use chatform_types::{ControlElementRef, ControlValue, FlowDto, FlowEvent, InputKeyChange, ProgressState, Tag};
use chatform_util::InputConfig;
use rat_focus::FocusFlag;
use tracing::{debug, warn};

use crate::bus::EventPort;
use crate::ui::components::control_elements::element::{ControlElement, ControlKind};
use crate::ui::focus::NodeId;
use crate::ui::keys::Key;

/// Position addressed by [`ControlElements::focus_element`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementSlot {
    At(usize),
    Last,
}

#[derive(Debug, Clone)]
pub struct ControlElements {
    elements: Vec<ControlElement>,
    page_size: usize,
    scroll_offset: usize,
    file_too_large: String,
    file_missing: String,
    pub f_prev: FocusFlag,
    pub f_next: FocusFlag,
}

impl ControlElements {
    pub fn new(config: &InputConfig) -> Self {
        Self {
            elements: Vec::new(),
            page_size: config.page_size.max(1),
            scroll_offset: 0,
            file_too_large: config.file_too_large.clone(),
            file_missing: config.file_missing.clone(),
            f_prev: FocusFlag::named("cf-input.controls.prev"),
            f_next: FocusFlag::named("cf-input.controls.next"),
        }
    }

    /// Whether the panel holds at least one element.
    pub fn is_active(&self) -> bool {
        !self.elements.is_empty()
    }

    pub fn elements(&self) -> &[ControlElement] {
        &self.elements
    }

    pub fn get_element(&self, index: usize) -> Option<&ControlElement> {
        self.elements.get(index)
    }

    pub fn get_element_mut(&mut self, index: usize) -> Option<&mut ControlElement> {
        self.elements.get_mut(index)
    }

    /// The structured answer: every selected element, labels joined as text.
    pub fn get_value(&self) -> ControlValue {
        let selections: Vec<_> = self.elements.iter().filter_map(ControlElement::selection).collect();
        let text = selections.iter().map(|s| s.label.as_str()).collect::<Vec<_>>().join(", ");
        ControlValue { text, selections }
    }

    /// Removes all elements.
    pub fn reset(&mut self) {
        self.blur();
        self.elements.clear();
        self.scroll_offset = 0;
    }

    /// Replaces the elements with those built from `tags`.
    pub fn rebuild(&mut self, tags: &[Tag]) {
        self.reset();
        for tag in tags {
            let next_index = self.elements.len();
            self.elements.extend(ControlElement::build_for_tag(tag, next_index));
        }
        debug!(elements = self.elements.len(), "control elements rebuilt");
    }

    /// Mirrors the selection state reported by an element's submit event.
    pub fn apply_selection(&mut self, reported: &ControlElementRef) {
        let Some(position) = self.locate(reported) else {
            warn!(index = reported.index, label = %reported.label, "selection reported for unknown element");
            return;
        };
        let kind = self.elements[position].kind();
        if kind.is_exclusive() {
            for element in self.elements.iter_mut().filter(|e| e.tag() == reported.tag) {
                element.set_checked(false);
            }
        }
        self.elements[position].set_checked(reported.checked || kind.is_exclusive());
    }

    fn locate(&self, reported: &ControlElementRef) -> Option<usize> {
        match self.elements.get(reported.index) {
            Some(element) if element.tag() == reported.tag => Some(reported.index),
            _ => self
                .elements
                .iter()
                .position(|e| e.tag() == reported.tag && e.label() == reported.label),
        }
    }

    /// Moves keyboard focus to an element. Returns the focused index.
    pub fn focus_element(&mut self, slot: ElementSlot) -> Option<usize> {
        let index = match slot {
            ElementSlot::At(index) => self.elements.get(index).map(|_| index),
            ElementSlot::Last => self.visible_indices().last().copied(),
        }?;
        self.blur();
        self.elements[index].f_element.set(true);
        self.scroll_into_view(index);
        Some(index)
    }

    /// Clears focus from every element and both paging affordances.
    pub fn blur(&self) {
        self.f_prev.set(false);
        self.f_next.set(false);
        for element in &self.elements {
            element.f_element.set(false);
        }
    }

    pub fn focused_index(&self) -> Option<usize> {
        self.elements.iter().position(ControlElement::is_focused)
    }

    /// Node inside the panel that holds focus, if any.
    pub fn focused_node(&self) -> Option<NodeId> {
        if self.f_prev.get() {
            Some(NodeId::ControlsPrev)
        } else if self.f_next.get() {
            Some(NodeId::ControlsNext)
        } else {
            self.focused_index().map(NodeId::ControlElement)
        }
    }

    /// Focuses a panel node. Returns `false` for nodes the panel cannot focus.
    pub fn focus_node(&mut self, node: NodeId) -> bool {
        match node {
            NodeId::ControlsPrev if self.has_prev() => {
                self.blur();
                self.f_prev.set(true);
                true
            }
            NodeId::ControlsNext if self.has_next() => {
                self.blur();
                self.f_next.set(true);
                true
            }
            NodeId::ControlElement(index) => self.focus_element(ElementSlot::At(index)).is_some(),
            _ => false,
        }
    }

    /// Panel nodes in tab order: paging affordances around the current page.
    pub fn focusable_nodes(&self) -> Vec<NodeId> {
        let mut nodes = Vec::new();
        if self.has_prev() {
            nodes.push(NodeId::ControlsPrev);
        }
        nodes.extend(self.page().into_iter().map(NodeId::ControlElement));
        if self.has_next() {
            nodes.push(NodeId::ControlsNext);
        }
        nodes
    }

    pub fn highlighted_index(&self) -> Option<usize> {
        self.elements.iter().position(ControlElement::is_highlighted)
    }

    /// Activates the keyboard-highlighted element, if there is one.
    ///
    /// Returns `false` when nothing is highlighted, leaving the caller to
    /// handle the key itself.
    pub fn can_activate_highlighted(&mut self, port: &mut dyn EventPort) -> bool {
        match self.highlighted_index() {
            Some(index) => {
                self.elements[index].trigger_primary_action(port);
                true
            }
            None => false,
        }
    }

    /// Triggers the primary action of the element at `index`.
    pub fn activate(&mut self, index: usize, port: &mut dyn EventPort) {
        if let Some(element) = self.elements.get_mut(index) {
            element.trigger_primary_action(port);
        }
    }

    /// Activates a panel node as a click would: paging affordances turn the
    /// page, elements run their primary action.
    pub fn activate_node(&mut self, node: NodeId, port: &mut dyn EventPort) {
        match node {
            NodeId::ControlsPrev => self.page_prev(),
            NodeId::ControlsNext => self.page_next(),
            NodeId::ControlElement(index) => self.activate(index, port),
            _ => {}
        }
    }

    /// Reacts to a key-change notification from the input component.
    ///
    /// While the text field is active the typed text filters the elements
    /// and Down enters the list; Left and Right stay with the field's cursor.
    /// Inside the list, arrow keys move between the visible elements. The
    /// returned node is where focus should go.
    pub fn handle_key_change(&mut self, change: &InputKeyChange, field_text: &str) -> Option<NodeId> {
        let visible = self.visible_indices();
        if change.input_field_active {
            if change.key_code == Key::Down.key_code() {
                return visible.first().map(|index| NodeId::ControlElement(*index));
            }
            self.filter(field_text);
            return None;
        }

        let current = self.focused_index()?;
        let position = visible.iter().position(|index| *index == current)?;
        if change.key_code == Key::Down.key_code() || change.key_code == Key::Right.key_code() {
            visible.get(position + 1).map(|index| NodeId::ControlElement(*index))
        } else if change.key_code == Key::Up.key_code() || change.key_code == Key::Left.key_code() {
            match position.checked_sub(1) {
                Some(prev) => Some(NodeId::ControlElement(visible[prev])),
                None => Some(NodeId::InputField),
            }
        } else {
            None
        }
    }

    /// Shows only elements whose label contains `text`, highlighting the first
    /// match. Upload elements are never filtered.
    pub fn filter(&mut self, text: &str) {
        let needle = text.trim().to_lowercase();
        for element in &mut self.elements {
            let matches = element.kind() == ControlKind::UploadFile
                || needle.is_empty()
                || element.label().to_lowercase().contains(&needle);
            element.set_visible(matches);
            element.set_highlighted(false);
        }
        if !needle.is_empty()
            && let Some(first) = self
                .elements
                .iter_mut()
                .find(|e| e.is_visible() && e.kind() != ControlKind::UploadFile)
        {
            first.set_highlighted(true);
        }
        self.scroll_offset = 0;
        if let Some(index) = self.highlighted_index() {
            self.scroll_into_view(index);
        }
    }

    /// Indices of visible elements, in display order.
    pub fn visible_indices(&self) -> Vec<usize> {
        self.elements
            .iter()
            .filter(|e| e.is_visible())
            .map(ControlElement::index)
            .collect()
    }

    /// Visible elements inside the current page window.
    pub fn page(&self) -> Vec<usize> {
        self.visible_indices().into_iter().skip(self.scroll_offset).take(self.page_size).collect()
    }

    /// Whether the "previous" paging affordance is shown.
    pub fn has_prev(&self) -> bool {
        self.scroll_offset > 0
    }

    /// Whether the "next" paging affordance is shown.
    pub fn has_next(&self) -> bool {
        self.scroll_offset + self.page_size < self.visible_indices().len()
    }

    pub fn page_prev(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(self.page_size);
    }

    pub fn page_next(&mut self) {
        if self.has_next() {
            self.scroll_offset += self.page_size;
        }
    }

    fn scroll_into_view(&mut self, index: usize) {
        let Some(position) = self.visible_indices().iter().position(|i| *i == index) else {
            return;
        };
        if position < self.scroll_offset {
            self.scroll_offset = position;
        } else if position >= self.scroll_offset + self.page_size {
            self.scroll_offset = position + 1 - self.page_size;
        }
    }

    /// Completes an upload element's file selection.
    ///
    /// Rejections (missing file, too large) are published as
    /// `user-input-invalid`. Accepted files are reported with a busy/idle
    /// progress pair followed by `control-element-submit-value`.
    pub fn complete_file_selection(&mut self, index: usize, path: &Path, port: &mut dyn EventPort) {
        let Some(element) = self.elements.get_mut(index).filter(|e| e.kind() == ControlKind::UploadFile) else {
            warn!(index, "file selection completed for a non-upload element");
            return;
        };

        let metadata = match fs::metadata(path) {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) | Err(_) => {
                debug!(path = %path.display(), "selected file is not readable");
                port.emit(FlowEvent::UserInputInvalid(FlowDto::text("").with_error_text(self.file_missing.clone())));
                return;
            }
        };
        if let Some(max) = element.max_file_size()
            && metadata.len() > max
        {
            debug!(path = %path.display(), size = metadata.len(), max, "selected file is too large");
            port.emit(FlowEvent::UserInputInvalid(FlowDto::text("").with_error_text(self.file_too_large.clone())));
            return;
        }

        port.emit(FlowEvent::ControlElementProgressChange(ProgressState::Busy));
        element.attach_file(path.to_path_buf());
        port.emit(FlowEvent::ControlElementProgressChange(ProgressState::Idle));
        port.emit(FlowEvent::ControlElementSubmitValue(element.snapshot()));
    }
}
