//! Component system for the chatform TUI.
//!
//! Components are self-contained UI elements that own their state, react to
//! the flow events they are interested in, and render themselves into a
//! provided `Rect`. They never reach for shared state: every side effect is
//! published through the [`EventPort`] handed to them.

use chatform_types::FlowEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::bus::EventPort;
use crate::ui::theme::Theme;

/// A UI element with its own state and behavior.
///
/// # Component Lifecycle
///
/// 1. **Event handling**: the runtime delivers every bus event to
///    `handle_flow_event`, in emit order. Components decide for themselves
///    which topics matter.
/// 2. **Rendering**: `render()` draws the component into the frame area.
///    Implementations should be side-effect free except for frame drawing
///    and cursor placement.
pub trait Component {
    /// React to a flow event, publishing any follow-up events into `port`.
    fn handle_flow_event(&mut self, _event: &FlowEvent, _port: &mut dyn EventPort) {}

    /// Render the component into the given area.
    fn render(&mut self, frame: &mut Frame, rect: Rect, theme: &dyn Theme);
}
