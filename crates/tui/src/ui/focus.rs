//! Focus node identifiers for the input component's markup.
//!
//! The component's root exposes one text field, one submit affordance and a
//! control-elements container with previous/next paging affordances and a
//! list region. Each node maps to a dotted identifier, so "is a descendant of
//! the root" is a structural question rather than a tree walk.

/// Root node identifier.
pub const ROOT: &str = "cf-input";

/// Child node identifiers under [`ROOT`].
pub mod ids {
    /// Text entry field.
    pub const INPUT_FIELD: &str = "cf-input.field";
    /// Submit affordance.
    pub const SUBMIT_BUTTON: &str = "cf-input.button";
    /// Control-elements container.
    pub const CONTROLS: &str = "cf-input.controls";
    /// "Previous page" affordance inside the container.
    pub const CONTROLS_PREV: &str = "cf-input.controls.prev";
    /// "Next page" affordance inside the container.
    pub const CONTROLS_NEXT: &str = "cf-input.controls.next";
    /// List region holding the control elements.
    pub const CONTROLS_LIST: &str = "cf-input.controls.list";
}

/// Node an event originated from or that currently holds focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeId {
    Root,
    InputField,
    SubmitButton,
    Controls,
    ControlsPrev,
    ControlsNext,
    ControlsList,
    /// Control element at the given panel index.
    ControlElement(usize),
    /// Anything that is not part of the component.
    Outside,
}

impl NodeId {
    /// Canonical identifier; control elements share the list region's prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeId::Root => ROOT,
            NodeId::InputField => ids::INPUT_FIELD,
            NodeId::SubmitButton => ids::SUBMIT_BUTTON,
            NodeId::Controls => ids::CONTROLS,
            NodeId::ControlsPrev => ids::CONTROLS_PREV,
            NodeId::ControlsNext => ids::CONTROLS_NEXT,
            NodeId::ControlsList | NodeId::ControlElement(_) => ids::CONTROLS_LIST,
            NodeId::Outside => "",
        }
    }

    /// Whether the node lies strictly below the component's root.
    pub fn is_descendant_of_root(&self) -> bool {
        self.as_str()
            .strip_prefix(ROOT)
            .is_some_and(|rest| rest.starts_with('.'))
    }
}

/// Natural tab order inside the component.
///
/// Built fresh from the nodes that are currently focusable; `next`/`prev`
/// wrap around like a browser's tab sequence confined to one form.
#[derive(Debug, Default, Clone)]
pub struct FocusRing {
    nodes: Vec<NodeId>,
}

impl FocusRing {
    pub fn new(nodes: Vec<NodeId>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Node after `current`, or the first node when `current` is not in the ring.
    pub fn next(&self, current: Option<NodeId>) -> Option<NodeId> {
        let position = current.and_then(|node| self.nodes.iter().position(|n| *n == node));
        match position {
            Some(idx) => self.nodes.get((idx + 1) % self.nodes.len()).copied(),
            None => self.nodes.first().copied(),
        }
    }

    /// Node before `current`, or the last node when `current` is not in the ring.
    pub fn prev(&self, current: Option<NodeId>) -> Option<NodeId> {
        let position = current.and_then(|node| self.nodes.iter().position(|n| *n == node));
        match position {
            Some(idx) => self.nodes.get((idx + self.nodes.len() - 1) % self.nodes.len()).copied(),
            None => self.nodes.last().copied(),
        }
    }
}
