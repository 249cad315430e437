//! The user input component: the single surface through which a question is
//! answered.
//!
//! It mediates three sources of events into one interaction sequence:
//!
//! - raw device events (key-down, key-up, window focus, submit click), delivered
//!   through [`UserInputComponent::handle_input_event`];
//! - domain events from the flow engine and from its own control elements,
//!   delivered through [`UserInputComponent::handle_flow_event`];
//! - expiry of its two timers, checked by [`UserInputComponent::poll_timers`].
//!
//! Only two events ever leave the component: `user-input-submit` and
//! `user-input-key-change` (plus the one-off `user-input-control-elements-added`
//! on mount). Everything else is observable as state on the input surface and
//! the control-elements panel.

use std::rc::Rc;

use chatform_types::{
    ControlElementRef, FlowDto, FlowEvent, FlowTag, InputId, InputKeyChange, ProgressState, TagKind, Topic,
};
use chatform_util::InputConfig;
use rat_focus::FocusFlag;
use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use tracing::debug;

use crate::bus::{EventPort, SubscriptionId};
use crate::timer::{Clock, TimerSlot};
use crate::ui::components::component::Component;
use crate::ui::components::control_elements::{ControlElements, ElementSlot};
use crate::ui::components::user_input::user_input_view::{self, UserInputLayout};
use crate::ui::components::user_input::InputSurface;
use crate::ui::focus::{FocusRing, NodeId};
use crate::ui::keys::{InputEvent, Key, KeyStroke};
use crate::ui::theme::Theme;

/// Topics the component listens to while mounted.
const INBOUND_TOPICS: [Topic; 8] = [
    Topic::FlowUpdate,
    Topic::UserInputInvalid,
    Topic::ControlElementSubmitValue,
    Topic::ControlElementProgressChange,
    Topic::KeyDown,
    Topic::KeyUp,
    Topic::WindowFocus,
    Topic::SubmitButtonClick,
];

/// Observable interaction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    /// Ready for input.
    Idle,
    /// Waiting for a submitted answer or a busy control element.
    Busy,
    /// A rejection message is on display until the recovery timer fires.
    ErrorDisplay,
    /// A new question is settling in; input opens when the settle timer fires.
    AnimatingIn,
}

#[derive(Debug)]
pub struct UserInputComponent {
    id: InputId,
    config: InputConfig,
    clock: Rc<dyn Clock>,
    surface: InputSurface,
    controls: ControlElements,
    pub f_submit: FocusFlag,
    current_tag: Option<FlowTag>,
    disabled: bool,
    /// An answer left since the last question arrived.
    submitted: bool,
    error_active: bool,
    error_timer: TimerSlot,
    settle_timer: TimerSlot,
    shift_is_down: bool,
    subscriptions: Vec<(Topic, SubscriptionId)>,
    disposed: bool,
    layout: UserInputLayout,
}

impl UserInputComponent {
    pub fn new(config: InputConfig, clock: Rc<dyn Clock>) -> Self {
        Self {
            id: InputId::next(),
            surface: InputSurface::new(config.placeholder.clone()),
            controls: ControlElements::new(&config),
            f_submit: FocusFlag::named("cf-input.button"),
            config,
            clock,
            current_tag: None,
            disabled: false,
            submitted: false,
            error_active: false,
            error_timer: TimerSlot::default(),
            settle_timer: TimerSlot::default(),
            shift_is_down: false,
            subscriptions: Vec::new(),
            disposed: false,
            layout: UserInputLayout::default(),
        }
    }

    pub fn id(&self) -> InputId {
        self.id
    }

    /// Registers the inbound subscriptions and announces the control elements.
    pub fn mount(&mut self, port: &mut dyn EventPort) {
        if self.disposed || !self.subscriptions.is_empty() {
            return;
        }
        self.subscriptions = INBOUND_TOPICS.iter().map(|topic| (*topic, port.on(*topic))).collect();
        self.dispatch(port, FlowEvent::ControlElementsAdded);
    }

    /// Releases every subscription, cancels both timers and drops any
    /// rejection on display. The component ignores all events afterwards.
    pub fn dispose(&mut self, port: &mut dyn EventPort) {
        for (topic, subscription) in self.subscriptions.drain(..) {
            debug!(input = %self.id, %topic, "user input: unsubscribe");
            port.off(subscription);
        }
        self.error_timer.cancel();
        self.error_active = false;
        self.surface.set_error(false);
        self.settle_timer.cancel();
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn is_subscribed(&self, topic: Topic) -> bool {
        !self.disposed && self.subscriptions.iter().any(|(t, _)| *t == topic)
    }

    pub fn state(&self) -> InteractionState {
        if self.error_active {
            InteractionState::ErrorDisplay
        } else if self.settle_timer.is_armed() && !self.submitted {
            InteractionState::AnimatingIn
        } else if self.disabled {
            InteractionState::Busy
        } else {
            InteractionState::Idle
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn is_error_active(&self) -> bool {
        self.error_active
    }

    pub fn is_shift_down(&self) -> bool {
        self.shift_is_down
    }

    pub fn current_tag(&self) -> Option<&FlowTag> {
        self.current_tag.as_ref()
    }

    pub fn surface(&self) -> &InputSurface {
        &self.surface
    }

    pub fn controls(&self) -> &ControlElements {
        &self.controls
    }

    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    /// The answer as it currently stands: the panel's value when it has
    /// elements, otherwise the typed text.
    pub fn get_flow_dto(&self) -> FlowDto {
        let dto = if self.controls.is_active() {
            FlowDto::controls(self.controls.get_value())
        } else {
            FlowDto::text(self.surface.value())
        };
        dto.with_input(self.id)
    }

    /// Earliest pending timer deadline, for hosts that sleep between ticks.
    pub fn next_deadline(&self) -> Option<std::time::Instant> {
        match (self.error_timer.deadline(), self.settle_timer.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Fires expired timers. Returns `true` when anything changed.
    pub fn poll_timers(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        let now = self.clock.now();
        let mut changed = false;
        if self.settle_timer.fire_if_due(now) {
            debug!(input = %self.id, "user input: settled");
            // The recovery timer owns the enabled state while a rejection is shown.
            if !self.error_active {
                self.set_disabled(false);
            }
            changed = true;
        }
        if self.error_timer.fire_if_due(now) {
            self.recover_from_error();
            changed = true;
        }
        changed
    }

    /// Node holding keyboard focus, or [`NodeId::Outside`].
    pub fn focused_node(&self) -> NodeId {
        if self.surface.is_focused() {
            NodeId::InputField
        } else if self.f_submit.get() {
            NodeId::SubmitButton
        } else {
            self.controls.focused_node().unwrap_or(NodeId::Outside)
        }
    }

    /// Moves keyboard focus. Nodes that cannot take focus leave it unchanged.
    pub fn focus_node(&mut self, node: NodeId) -> bool {
        match node {
            NodeId::InputField => {
                self.blur_all();
                self.surface.f_field.set(true);
                true
            }
            NodeId::SubmitButton => {
                self.blur_all();
                self.f_submit.set(true);
                true
            }
            NodeId::Outside => {
                self.blur_all();
                true
            }
            NodeId::ControlsPrev | NodeId::ControlsNext | NodeId::ControlElement(_) => {
                let input_focused = self.surface.is_focused();
                let submit_focused = self.f_submit.get();
                self.surface.f_field.set(false);
                self.f_submit.set(false);
                let focused = self.controls.focus_node(node);
                if !focused {
                    self.surface.f_field.set(input_focused);
                    self.f_submit.set(submit_focused);
                }
                focused
            }
            NodeId::Root | NodeId::Controls | NodeId::ControlsList => false,
        }
    }

    fn blur_all(&self) {
        self.surface.f_field.set(false);
        self.f_submit.set(false);
        self.controls.blur();
    }

    /// Natural tab order: input field, panel, submit affordance.
    pub fn focus_ring(&self) -> FocusRing {
        let mut nodes = vec![NodeId::InputField];
        nodes.extend(self.controls.focusable_nodes());
        nodes.push(NodeId::SubmitButton);
        FocusRing::new(nodes)
    }

    /// Rows needed to render the current content.
    pub fn preferred_height(&self) -> u16 {
        user_input_view::height(self)
    }

    /// Node under a screen position, using the regions of the last render.
    pub fn hit_test(&self, column: u16, row: u16) -> Option<NodeId> {
        let position = Position::new(column, row);
        if self.layout.submit.contains(position) {
            return Some(NodeId::SubmitButton);
        }
        if self.layout.field.contains(position) {
            return Some(NodeId::InputField);
        }
        let list = self.layout.list;
        if !list.contains(position) {
            return None;
        }
        if row == list.y {
            return self.controls.has_prev().then_some(NodeId::ControlsPrev);
        }
        if row + 1 == list.bottom() {
            return self.controls.has_next().then_some(NodeId::ControlsNext);
        }
        let offset = usize::from(row - list.y - 1);
        self.controls.page().get(offset).copied().map(NodeId::ControlElement)
    }

    /// Pointer activation of a node: the submit affordance is clicked, the
    /// field takes focus, panel nodes take focus and run their action.
    pub fn click(&mut self, node: NodeId, port: &mut dyn EventPort) {
        match node {
            NodeId::SubmitButton => self.handle_input_event(InputEvent::SubmitButtonClick, port),
            NodeId::InputField => {
                self.focus_node(NodeId::InputField);
            }
            NodeId::ControlsPrev | NodeId::ControlsNext | NodeId::ControlElement(_) => {
                if self.disposed {
                    return;
                }
                self.focus_node(node);
                self.controls.activate_node(node, port);
            }
            NodeId::Root | NodeId::Controls | NodeId::ControlsList | NodeId::Outside => {}
        }
    }

    /// Completes the host-side file selection for an upload element.
    pub fn complete_file_selection(&mut self, element: usize, path: &std::path::Path, port: &mut dyn EventPort) {
        if self.disposed {
            return;
        }
        self.controls.complete_file_selection(element, path, port);
    }

    /// Handles a raw device event.
    pub fn handle_input_event(&mut self, event: InputEvent, port: &mut dyn EventPort) {
        if !self.is_subscribed(event.topic()) {
            return;
        }
        match event {
            InputEvent::KeyDown(stroke) => self.on_key_down(stroke),
            InputEvent::KeyUp(stroke) => self.on_key_up(stroke, port),
            InputEvent::WindowFocus => {
                self.focus_node(NodeId::InputField);
            }
            InputEvent::SubmitButtonClick => self.enter_or_submit(port),
        }
    }

    fn on_flow_update(&mut self, tag: &FlowTag) {
        self.surface.mark_animated_in();
        self.surface.set_tag_type(tag.type_name());
        self.current_tag = Some(tag.clone());
        self.submitted = false;

        self.error_timer.cancel();
        self.error_active = false;
        self.surface.set_error(false);
        self.surface.set_stashed_value("");
        self.surface.set_value("");
        self.surface.set_placeholder(self.config.placeholder.clone());
        self.focus_node(NodeId::InputField);

        self.controls.reset();
        self.controls.rebuild(tag.panel_tags());

        self.set_disabled(true);
        self.settle_timer.arm(self.clock.now(), self.config.settle_delay());
    }

    fn on_input_invalid(&mut self, dto: &FlowDto) {
        let current = self.surface.value().to_string();
        self.surface.set_stashed_value(current);
        self.surface.set_value("");
        self.surface.set_error(true);
        self.set_disabled(true);

        let message = dto
            .error_text
            .clone()
            .or_else(|| self.current_tag.as_ref().and_then(|tag| tag.error_message().map(str::to_string)))
            .unwrap_or_else(|| self.config.error_placeholder.clone());
        self.surface.set_placeholder(message);

        self.error_active = true;
        self.error_timer.arm(self.clock.now(), self.config.error_duration());
    }

    fn recover_from_error(&mut self) {
        debug!(input = %self.id, "user input: error display over");
        self.error_active = false;
        self.set_disabled(false);
        self.surface.set_error(false);
        let stashed = self.surface.stashed_value().to_string();
        self.surface.set_value(stashed);
        self.surface.set_stashed_value("");
        self.surface.set_placeholder(self.config.placeholder.clone());
        self.focus_node(NodeId::InputField);
    }

    fn on_control_element_submit(&mut self, element: &ControlElementRef, port: &mut dyn EventPort) {
        self.controls.apply_selection(element);
        self.do_submit(port);
    }

    fn on_control_element_progress(&mut self, progress: ProgressState) {
        self.set_disabled(progress.is_busy());
    }

    fn on_key_down(&mut self, stroke: KeyStroke) {
        match stroke.key {
            Key::Shift => self.shift_is_down = true,
            Key::Tab if stroke.target.is_descendant_of_root() => {
                let ring = self.focus_ring();
                let current = Some(self.focused_node());
                let target = if self.shift_is_down { ring.prev(current) } else { ring.next(current) };
                if let Some(node) = target {
                    self.focus_node(node);
                }
            }
            key if stroke.target == NodeId::InputField && self.surface.is_focused() && !self.disabled => {
                self.surface.apply_native_edit(key);
            }
            _ => {}
        }
    }

    fn on_key_up(&mut self, stroke: KeyStroke, port: &mut dyn EventPort) {
        if stroke.key == Key::Shift {
            self.shift_is_down = false;
        }

        if stroke.key == Key::Tab && !stroke.target.is_descendant_of_root() {
            debug!(input = %self.id, shift = self.shift_is_down, "user input: focus trapped");
            if self.shift_is_down && self.controls.is_active() {
                self.blur_all();
                if self.controls.focus_element(ElementSlot::Last).is_none() {
                    self.focus_node(NodeId::InputField);
                }
            } else {
                self.focus_node(NodeId::InputField);
            }
        }

        if self.disabled {
            return;
        }

        let dto = self.get_flow_dto();
        let input_focused = self.surface.is_focused();
        match stroke.key {
            Key::Enter if input_focused => {
                if !self.controls.is_active() || !self.controls.can_activate_highlighted(port) {
                    self.enter_or_submit(port);
                }
            }
            Key::Enter => self.enter_or_submit(port),
            Key::Space => match self.focused_node() {
                NodeId::SubmitButton => self.enter_or_submit(port),
                node @ (NodeId::ControlsPrev | NodeId::ControlsNext | NodeId::ControlElement(_)) => {
                    self.controls.activate_node(node, port);
                }
                _ => {}
            },
            key => {
                let change = InputKeyChange {
                    dto,
                    key_code: key.key_code(),
                    input_field_active: input_focused,
                };
                if self.controls.is_active()
                    && let Some(node) = self.controls.handle_key_change(&change, self.surface.value())
                {
                    self.focus_node(node);
                }
                self.dispatch(port, FlowEvent::UserInputKeyChange(change));
            }
        }
    }

    /// Submit-button activation: upload questions open the file picker,
    /// everything else submits.
    fn enter_or_submit(&mut self, port: &mut dyn EventPort) {
        let opens_file_picker = match &self.current_tag {
            Some(FlowTag::Single(tag)) => match tag.kind {
                TagKind::File => true,
                TagKind::Text
                | TagKind::Radio
                | TagKind::Checkbox
                | TagKind::Select
                | TagKind::Button
                | TagKind::Custom(_) => false,
            },
            Some(FlowTag::Group(_)) | None => false,
        };

        if !opens_file_picker {
            self.do_submit(port);
            return;
        }
        match self.controls.get_element_mut(0) {
            Some(element) => element.trigger_primary_action(port),
            None => debug!(input = %self.id, "user input: upload question without an upload element"),
        }
    }

    fn do_submit(&mut self, port: &mut dyn EventPort) {
        let dto = self.get_flow_dto();
        self.set_disabled(true);
        self.submitted = true;
        if self.error_active {
            self.error_timer.cancel();
            self.error_active = false;
            self.surface.set_placeholder(self.config.placeholder.clone());
        }
        self.surface.set_error(false);
        self.surface.set_stashed_value("");
        self.dispatch(port, FlowEvent::UserInputSubmit(dto));
    }

    fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
        self.surface.set_enabled(!disabled);
    }

    fn dispatch(&self, port: &mut dyn EventPort, event: FlowEvent) {
        debug!(input = %self.id, direction = "dispatch", topic = %event.topic(), "user input: flow event");
        port.emit(event);
    }
}

impl Component for UserInputComponent {
    /// Handles a domain event. Events on topics the component is not
    /// subscribed to are ignored.
    fn handle_flow_event(&mut self, event: &FlowEvent, port: &mut dyn EventPort) {
        if !self.is_subscribed(event.topic()) {
            return;
        }
        debug!(input = %self.id, direction = "receive", topic = %event.topic(), "user input: flow event");
        match event {
            FlowEvent::FlowUpdate(tag) => self.on_flow_update(tag),
            FlowEvent::UserInputInvalid(dto) => self.on_input_invalid(dto),
            FlowEvent::ControlElementSubmitValue(element) => self.on_control_element_submit(element, port),
            FlowEvent::ControlElementProgressChange(progress) => self.on_control_element_progress(*progress),
            FlowEvent::FileSelectionRequested { .. }
            | FlowEvent::UserInputSubmit(_)
            | FlowEvent::UserInputKeyChange(_)
            | FlowEvent::ControlElementsAdded => {}
        }
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, theme: &dyn Theme) {
        self.layout = user_input_view::layout(rect, self);
        user_input_view::render(frame, self.layout, self, theme);
    }
}
