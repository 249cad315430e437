use ratatui::{
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, BorderType, Borders},
};

use super::roles::{Theme, ThemeRoles};

/// Build a standard Block with theme surfaces and borders.
pub fn block<'a, T: Theme + ?Sized>(theme: &'a T, title: Option<&'a str>, focused: bool) -> Block<'a> {
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme.border_style(focused))
        .style(panel_style(theme));
    if let Some(t) = title {
        block = block.title(Span::styled(t, theme.text_secondary_style().add_modifier(Modifier::BOLD)));
    }
    block
}

/// Style for panel-like containers (set background on widget using `.style`).
pub fn panel_style<T: Theme + ?Sized>(theme: &T) -> Style {
    let ThemeRoles { surface, text, .. } = *theme.roles();
    Style::default().bg(surface).fg(text)
}

/// Label style for a button-like affordance.
pub fn button_style<T: Theme + ?Sized>(theme: &T, focused: bool, enabled: bool) -> Style {
    if !enabled {
        theme.text_muted_style()
    } else if focused {
        theme.selection_style().add_modifier(Modifier::BOLD)
    } else {
        theme.accent_primary_style()
    }
}
