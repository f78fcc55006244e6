//! Single-line text input.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::{Buffer, Rect, Style, theme};

/// What a key did to an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Ignored,
    /// Cursor moved; text unchanged.
    Handled,
    Changed,
    Submitted,
}

/// Text plus a cursor counted in characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    text: String,
    cursor: usize,
}

impl TextInput {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    pub fn value(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set(&mut self, text: impl Into<String>) {
        *self = Self::new(text);
    }

    pub fn clear(&mut self) {
        self.set(String::new());
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> InputEvent {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('u') if ctrl => {
                if self.text.is_empty() {
                    return InputEvent::Handled;
                }
                self.clear();
                InputEvent::Changed
            }
            KeyCode::Char(c) if !ctrl => {
                let at = self.byte_index(self.cursor);
                self.text.insert(at, c);
                self.cursor += 1;
                InputEvent::Changed
            }
            KeyCode::Backspace => {
                if self.cursor == 0 {
                    return InputEvent::Handled;
                }
                let start = self.byte_index(self.cursor - 1);
                let end = self.byte_index(self.cursor);
                self.text.replace_range(start..end, "");
                self.cursor -= 1;
                InputEvent::Changed
            }
            KeyCode::Delete => {
                if self.cursor >= self.text.chars().count() {
                    return InputEvent::Handled;
                }
                let start = self.byte_index(self.cursor);
                let end = self.byte_index(self.cursor + 1);
                self.text.replace_range(start..end, "");
                InputEvent::Changed
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                InputEvent::Handled
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.text.chars().count());
                InputEvent::Handled
            }
            KeyCode::Home => {
                self.cursor = 0;
                InputEvent::Handled
            }
            KeyCode::End => {
                self.cursor = self.text.chars().count();
                InputEvent::Handled
            }
            KeyCode::Enter => InputEvent::Submitted,
            _ => InputEvent::Ignored,
        }
    }

    fn byte_index(&self, chars: usize) -> usize {
        self.text
            .char_indices()
            .nth(chars)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    /// Draw as `label: [value]` on one row; the cursor shows when focused.
    pub fn draw(&self, buf: &mut Buffer, area: Rect, label: &str, focused: bool) {
        if area.is_empty() {
            return;
        }
        let label_style = if focused { theme::title() } else { theme::muted() };
        let used = buf.put_str(area.x, area.y, &format!("{}: ", label), label_style, area.width);

        let field = Rect::new(area.x + used, area.y, area.width.saturating_sub(used), 1);
        let field_style = Style::new().fg(theme::TEXT).bg(theme::SURFACE);
        buf.fill(field, field_style);

        // Keep the cursor visible by scrolling the text left.
        let visible = field.width.saturating_sub(1) as usize;
        let skip = self.cursor.saturating_sub(visible);
        let shown: String = self.text.chars().skip(skip).collect();
        buf.put_str(field.x, field.y, &shown, field_style, field.width);

        if focused {
            let column = field.x + (self.cursor - skip) as u16;
            if column < field.right() {
                let under = self.text.chars().nth(self.cursor).unwrap_or(' ');
                buf.put_char(column, field.y, under, Style::new().fg(theme::BACKGROUND).bg(theme::PRIMARY));
            }
        }
    }
}
