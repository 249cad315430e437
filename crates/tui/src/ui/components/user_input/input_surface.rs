//! The text-entry affordance of the input component.

use rat_focus::FocusFlag;

use crate::ui::components::common::TextInputState;
use crate::ui::keys::Key;

/// Encapsulated text field state.
///
/// Exposes only the capabilities the input component needs: read and write
/// the value, enable or disable, focus, set the placeholder, and the `error`
/// and stashed-value attributes used while a rejection is displayed.
#[derive(Debug, Clone, Default)]
pub struct InputSurface {
    text: TextInputState,
    placeholder: String,
    enabled: bool,
    error: bool,
    stashed_value: String,
    tag_type: Option<String>,
    animate_in: bool,
    pub f_field: FocusFlag,
}

impl InputSurface {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            f_field: FocusFlag::named("cf-input.field"),
            ..Default::default()
        }
    }

    pub fn value(&self) -> &str {
        self.text.input()
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.text.set_input(value);
    }

    pub fn text_state(&self) -> &TextInputState {
        &self.text
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn set_placeholder(&mut self, placeholder: impl Into<String>) {
        self.placeholder = placeholder.into();
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn has_error(&self) -> bool {
        self.error
    }

    pub fn set_error(&mut self, error: bool) {
        self.error = error;
    }

    /// Value captured while the rejection message occupies the field.
    pub fn stashed_value(&self) -> &str {
        &self.stashed_value
    }

    pub fn set_stashed_value(&mut self, value: impl Into<String>) {
        self.stashed_value = value.into();
    }

    pub fn tag_type(&self) -> Option<&str> {
        self.tag_type.as_deref()
    }

    pub fn set_tag_type(&mut self, tag_type: impl Into<String>) {
        self.tag_type = Some(tag_type.into());
    }

    pub fn is_animated_in(&self) -> bool {
        self.animate_in
    }

    pub fn mark_animated_in(&mut self) {
        self.animate_in = true;
    }

    pub fn is_focused(&self) -> bool {
        self.f_field.get()
    }

    /// Applies the field's native editing behaviour for `key`.
    ///
    /// Returns `true` when the key edited the value or moved the cursor.
    pub fn apply_native_edit(&mut self, key: Key) -> bool {
        if let Some(c) = key.printable() {
            self.text.insert_char(c);
            return true;
        }
        match key {
            Key::Backspace => self.text.backspace(),
            Key::Delete => self.text.delete(),
            Key::Left => self.text.move_left(),
            Key::Right => self.text.move_right(),
            Key::Home => self.text.move_home(),
            Key::End => self.text.move_end(),
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_edits_change_value() {
        let mut surface = InputSurface::new("Type here");
        assert!(surface.apply_native_edit(Key::Char('h')));
        assert!(surface.apply_native_edit(Key::Char('i')));
        assert!(surface.apply_native_edit(Key::Space));
        assert_eq!(surface.value(), "hi ");
        assert!(surface.apply_native_edit(Key::Backspace));
        assert_eq!(surface.value(), "hi");
        assert!(!surface.apply_native_edit(Key::Enter));
    }

    #[test]
    fn focus_flag_drives_is_focused() {
        let surface = InputSurface::new("Type here");
        assert!(!surface.is_focused());
        surface.f_field.set(true);
        assert!(surface.is_focused());
    }
}
