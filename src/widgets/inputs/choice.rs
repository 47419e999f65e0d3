use crate::terminal::{CursorPos, KeyCode};
use crate::ui::span::{Span, SpanLine};
use crate::ui::style::{Color, Style};

/// Highlight shared by the one-row-per-option inputs.
#[derive(Debug, Clone, Default)]
pub struct OptionCursor {
    highlighted: usize,
}

impl OptionCursor {
    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    /// Up/Down wrap around; returns false for any other key.
    pub fn navigate(&mut self, code: KeyCode, len: usize) -> bool {
        if len == 0 {
            return false;
        }
        match code {
            KeyCode::Up => {
                self.highlighted = (self.highlighted + len - 1) % len;
                true
            }
            KeyCode::Down => {
                self.highlighted = (self.highlighted + 1) % len;
                true
            }
            KeyCode::Home => {
                self.highlighted = 0;
                true
            }
            KeyCode::End => {
                self.highlighted = len - 1;
                true
            }
            _ => false,
        }
    }

    pub fn cursor_pos(&self) -> CursorPos {
        CursorPos {
            col: 1,
            row: self.highlighted as u16,
        }
    }
}

pub fn option_line(symbol: &str, selected: bool, highlighted: bool, text: &str) -> SpanLine {
    let symbol_style = if selected {
        Style::new().color(Color::Green)
    } else {
        Style::default()
    };
    let text_style = if highlighted {
        Style::new().color(Color::Cyan).bold()
    } else {
        Style::default()
    };
    vec![
        Span::styled(symbol.to_string(), symbol_style),
        Span::new(" "),
        Span::styled(text.to_string(), text_style),
    ]
}
