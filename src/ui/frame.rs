use crate::terminal::CursorPos;
use crate::ui::span::{Span, SpanLine};
use crate::ui::style::{Color, Style};
use crate::widgets::traits::DrawOutput;

/// One full screen of lines plus where the cursor belongs.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub lines: Vec<SpanLine>,
    pub cursor: Option<CursorPos>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: SpanLine) {
        self.lines.push(line);
    }

    pub fn push_text(&mut self, text: impl Into<String>, style: Style) {
        self.lines.push(vec![Span::styled(text, style)]);
    }

    pub fn blank(&mut self) {
        self.lines.push(Vec::new());
    }

    pub fn heading(&mut self, title: &str) {
        self.lines.push(vec![Span::styled(
            format!("── {title} "),
            Style::new().color(Color::Blue).bold(),
        )]);
    }

    /// Appends drawn output; a cursor relative to its first line becomes absolute.
    pub fn append(&mut self, output: DrawOutput, cursor: Option<CursorPos>) {
        let top = self.lines.len() as u16;
        if let Some(pos) = cursor {
            self.cursor = Some(CursorPos {
                col: pos.col,
                row: top + pos.row,
            });
        }
        self.lines.extend(output.lines);
    }
}
