//! UTF-8 safe single-line text buffer with cursor management.

use unicode_width::UnicodeWidthStr;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextInputState {
    /// The underlying text buffer
    input: String,
    /// Cursor byte index into `input` (always on a UTF-8 boundary)
    cursor: usize,
}

impl TextInputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Display column of the cursor.
    pub fn cursor_column(&self) -> usize {
        self.input[..self.cursor].width()
    }

    /// Replaces the buffer and moves the cursor to its end.
    pub fn set_input<S: Into<String>>(&mut self, s: S) {
        self.input = s.into();
        self.cursor = self.input.len();
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.cursor = 0;
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = self.input[..self.cursor].chars().next_back() {
            self.cursor -= prev.len_utf8();
        }
    }

    pub fn move_right(&mut self) {
        if let Some(next) = self.input[self.cursor..].chars().next() {
            self.cursor += next.len_utf8();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.input.len();
    }

    pub fn insert_char(&mut self, c: char) {
        self.input.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Removes the char before the cursor.
    pub fn backspace(&mut self) {
        if let Some(prev) = self.input[..self.cursor].chars().next_back() {
            let start = self.cursor - prev.len_utf8();
            self.input.drain(start..self.cursor);
            self.cursor = start;
        }
    }

    /// Removes the char under the cursor.
    pub fn delete(&mut self) {
        if let Some(next) = self.input[self.cursor..].chars().next() {
            self.input.drain(self.cursor..self.cursor + next.len_utf8());
        }
    }
}
