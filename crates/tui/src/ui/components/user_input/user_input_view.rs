//! Rendering for the user input component.
//!
//! Layout, top to bottom: the control-elements list (only while the panel is
//! active) framed by its paging affordances, then the text field with the
//! submit affordance to its right.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use crate::ui::components::control_elements::{ControlElement, ControlKind};
use crate::ui::components::user_input::{InteractionState, UserInputComponent};
use crate::ui::focus::NodeId;
use crate::ui::theme::Theme;
use crate::ui::theme::helpers as th;

const SUBMIT_WIDTH: u16 = 10;
const FIELD_HEIGHT: u16 = 3;

/// Screen regions of the last render, retained for pointer hit-testing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserInputLayout {
    /// Control-elements list including its border; empty while the panel is inactive.
    pub list: Rect,
    pub field: Rect,
    pub submit: Rect,
}

/// Rows the component needs for its current content.
pub(crate) fn height(input: &UserInputComponent) -> u16 {
    list_height(input) + FIELD_HEIGHT
}

fn list_height(input: &UserInputComponent) -> u16 {
    let controls = input.controls();
    if controls.is_active() {
        controls.page().len() as u16 + 2
    } else {
        0
    }
}

pub(crate) fn layout(rect: Rect, input: &UserInputComponent) -> UserInputLayout {
    let rect = Rect {
        height: rect.height.min(height(input)),
        ..rect
    };
    let [list, input_area] =
        Layout::vertical([Constraint::Length(list_height(input)), Constraint::Length(FIELD_HEIGHT)]).areas(rect);
    let [field, submit] = Layout::horizontal([Constraint::Fill(1), Constraint::Length(SUBMIT_WIDTH)]).areas(input_area);
    UserInputLayout { list, field, submit }
}

pub(crate) fn render(frame: &mut Frame, layout: UserInputLayout, input: &UserInputComponent, theme: &dyn Theme) {
    if input.controls().is_active() {
        render_controls(frame, layout.list, input, theme);
    }
    render_field(frame, layout.field, input, theme);
    render_submit(frame, layout.submit, input, theme);
}

fn render_controls(frame: &mut Frame, area: Rect, input: &UserInputComponent, theme: &dyn Theme) {
    let controls = input.controls();
    let focused = input.focused_node();
    let in_panel = matches!(
        focused,
        NodeId::ControlsPrev | NodeId::ControlsNext | NodeId::ControlElement(_)
    );

    let mut block = th::block(theme, None, in_panel);
    if controls.has_prev() {
        let style = th::button_style(theme, focused == NodeId::ControlsPrev, true);
        block = block.title(Line::from(Span::styled(" ▲ more ", style)).right_aligned());
    }
    if controls.has_next() {
        let style = th::button_style(theme, focused == NodeId::ControlsNext, true);
        block = block.title_bottom(Line::from(Span::styled(" ▼ more ", style)).right_aligned());
    }

    let lines: Vec<Line> = controls
        .page()
        .into_iter()
        .filter_map(|index| controls.get_element(index))
        .map(|element| element_line(element, theme))
        .collect();
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn element_line<'a>(element: &'a ControlElement, theme: &dyn Theme) -> Line<'a> {
    let marker = match (element.kind(), element.is_checked()) {
        (ControlKind::RadioButton, true) => "(•) ",
        (ControlKind::RadioButton, false) => "( ) ",
        (ControlKind::CheckboxButton, true) => "[x] ",
        (ControlKind::CheckboxButton, false) => "[ ] ",
        (ControlKind::OptionButton, true) => "» ",
        (ControlKind::OptionButton, false) => "  ",
        (ControlKind::Button, _) => "› ",
        (ControlKind::UploadFile, _) => "⇪ ",
    };
    let style = if element.is_focused() {
        theme.selection_style().add_modifier(Modifier::BOLD)
    } else if element.is_highlighted() {
        theme.accent_emphasis_style()
    } else {
        theme.text_primary_style()
    };
    Line::from(vec![
        Span::styled(marker, theme.accent_secondary_style()),
        Span::styled(element.label(), style),
    ])
}

fn render_field(frame: &mut Frame, area: Rect, input: &UserInputComponent, theme: &dyn Theme) {
    let surface = input.surface();
    let mut block = th::block(theme, None, surface.is_focused());
    if surface.has_error() {
        block = block.border_style(theme.status_error());
    }

    let content = if surface.value().is_empty() {
        let style = if surface.has_error() {
            theme.status_error()
        } else {
            theme.text_muted_style()
        };
        Span::styled(surface.placeholder(), style)
    } else if surface.is_enabled() {
        Span::styled(surface.value(), theme.text_primary_style())
    } else {
        Span::styled(surface.value(), theme.text_muted_style())
    };
    frame.render_widget(
        Paragraph::new(Line::from(content)).block(block).wrap(Wrap { trim: false }),
        area,
    );

    if surface.is_focused() && surface.is_enabled() {
        let column = surface.text_state().cursor_column() as u16;
        let x = area.x.saturating_add(1).saturating_add(column).min(area.right().saturating_sub(2));
        frame.set_cursor_position(Position::new(x, area.y + 1));
    }
}

fn render_submit(frame: &mut Frame, area: Rect, input: &UserInputComponent, theme: &dyn Theme) {
    let focused = input.focused_node() == NodeId::SubmitButton;
    let label = match input.state() {
        InteractionState::Busy | InteractionState::AnimatingIn => "···",
        InteractionState::ErrorDisplay => "!",
        InteractionState::Idle if input.surface().tag_type() == Some("file") => "Attach",
        InteractionState::Idle => "Send",
    };
    let style = th::button_style(theme, focused, !input.is_disabled());
    let button = Paragraph::new(Line::from(Span::styled(label, style)).centered()).block(th::block(theme, None, focused));
    frame.render_widget(button, area);
}
