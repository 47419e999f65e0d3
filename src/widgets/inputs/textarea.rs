use super::text_edit;
use crate::core::value::Value;
use crate::terminal::{CursorPos, KeyCode, KeyEvent, KeyModifiers};
use crate::ui::span::Span;
use crate::ui::style::{Color, Style};
use crate::widgets::base::WidgetBase;
use crate::widgets::traits::{
    DrawOutput, Drawable, InteractionResult, Interactive, RenderContext, TextAction,
    TextEditState, ValidationMode,
};
use crate::widgets::validators::{Validator, validate_with_mode};
use unicode_width::UnicodeWidthChar;

const GUTTER: &str = "│ ";

pub struct TextAreaInput {
    base: WidgetBase,
    /// Always at least one element.
    lines: Vec<String>,
    row: usize,
    col: usize,
    top: usize,
    min_height: usize,
    max_height: usize,
    placeholder: Option<String>,
    validators: Vec<Validator>,
}

impl TextAreaInput {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            base: WidgetBase::new(id, label),
            lines: vec![String::new()],
            row: 0,
            col: 0,
            top: 0,
            min_height: 3,
            max_height: 8,
            placeholder: None,
            validators: Vec::new(),
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_validators(mut self, validators: Vec<Validator>) -> Self {
        self.validators = validators;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.set_value(value.into());
        self
    }

    fn text(&self) -> String {
        self.lines.join("\n")
    }

    fn visible_height(&self) -> usize {
        self.lines.len().clamp(self.min_height, self.max_height)
    }

    fn ensure_visible(&mut self) {
        let height = self.max_height;
        if self.row < self.top {
            self.top = self.row;
        } else if self.row >= self.top + height {
            self.top = self.row + 1 - height;
        }
    }

    fn current_line_len(&self) -> usize {
        text_edit::char_count(&self.lines[self.row])
    }

    fn split_line(&mut self) {
        let col = self.col.min(self.current_line_len());
        let byte = text_edit::byte_index_at_char(&self.lines[self.row], col);
        let right = self.lines[self.row][byte..].to_string();
        self.lines[self.row].truncate(byte);
        self.row += 1;
        self.col = 0;
        self.lines.insert(self.row, right);
    }

    fn merge_with_prev(&mut self) -> bool {
        if self.row == 0 {
            return false;
        }
        let prev_len = text_edit::char_count(&self.lines[self.row - 1]);
        let current = self.lines.remove(self.row);
        self.lines[self.row - 1].push_str(&current);
        self.row -= 1;
        self.col = prev_len;
        true
    }

    fn merge_with_next(&mut self) -> bool {
        if self.row + 1 >= self.lines.len() {
            return false;
        }
        let next = self.lines.remove(self.row + 1);
        self.lines[self.row].push_str(&next);
        true
    }

    fn edited(&mut self) -> InteractionResult {
        self.ensure_visible();
        InteractionResult::value_changed(self.base.id(), Value::Text(self.text()))
    }

    fn moved(&mut self) -> InteractionResult {
        self.ensure_visible();
        InteractionResult::handled()
    }
}

impl Drawable for TextAreaInput {
    fn id(&self) -> &str {
        self.base.id()
    }

    fn label(&self) -> &str {
        self.base.label()
    }

    fn draw(&self, _ctx: &RenderContext) -> DrawOutput {
        let gutter_style = Style::new().color(Color::DarkGrey);
        let empty = self.lines.len() == 1 && self.lines[0].is_empty();

        let mut lines = Vec::with_capacity(self.visible_height());
        for offset in 0..self.visible_height() {
            let idx = self.top + offset;
            let mut line = vec![Span::styled(GUTTER, gutter_style)];
            match (self.lines.get(idx), &self.placeholder) {
                (Some(_), Some(placeholder)) if empty && idx == 0 => {
                    line.push(Span::styled(placeholder.clone(), gutter_style));
                }
                (Some(text), _) => line.push(Span::new(text.clone())),
                (None, _) => {}
            }
            lines.push(line);
        }
        DrawOutput { lines }
    }
}

impl Interactive for TextAreaInput {
    fn on_key(&mut self, key: KeyEvent) -> InteractionResult {
        if key.modifiers.contains(KeyModifiers::CONTROL) || key.modifiers.contains(KeyModifiers::ALT)
        {
            return InteractionResult::ignored();
        }
        match key.code {
            KeyCode::Enter => {
                self.split_line();
                self.edited()
            }
            KeyCode::Char(ch) => {
                text_edit::insert_char(&mut self.lines[self.row], &mut self.col, ch);
                self.edited()
            }
            KeyCode::Backspace => {
                let changed = if self.col > 0 {
                    text_edit::backspace_char(&mut self.lines[self.row], &mut self.col)
                } else {
                    self.merge_with_prev()
                };
                if changed {
                    return self.edited();
                }
                InteractionResult::ignored()
            }
            KeyCode::Delete => {
                let changed = if self.col < self.current_line_len() {
                    text_edit::delete_char(&mut self.lines[self.row], &mut self.col)
                } else {
                    self.merge_with_next()
                };
                if changed {
                    return self.edited();
                }
                InteractionResult::ignored()
            }
            KeyCode::Left => {
                if self.col > 0 {
                    text_edit::move_left(&mut self.col, &self.lines[self.row]);
                } else if self.row > 0 {
                    self.row -= 1;
                    self.col = self.current_line_len();
                }
                self.moved()
            }
            KeyCode::Right => {
                if self.col < self.current_line_len() {
                    text_edit::move_right(&mut self.col, &self.lines[self.row]);
                } else if self.row + 1 < self.lines.len() {
                    self.row += 1;
                    self.col = 0;
                }
                self.moved()
            }
            KeyCode::Up if self.row > 0 => {
                self.row -= 1;
                self.col = self.col.min(self.current_line_len());
                self.moved()
            }
            KeyCode::Down if self.row + 1 < self.lines.len() => {
                self.row += 1;
                self.col = self.col.min(self.current_line_len());
                self.moved()
            }
            KeyCode::Home => {
                self.col = 0;
                InteractionResult::handled()
            }
            KeyCode::End => {
                self.col = self.current_line_len();
                InteractionResult::handled()
            }
            _ => InteractionResult::ignored(),
        }
    }

    fn text_editing(&mut self) -> Option<TextEditState<'_>> {
        Some(TextEditState {
            value: &mut self.lines[self.row],
            cursor: &mut self.col,
        })
    }

    fn on_text_action(&mut self, action: TextAction) -> InteractionResult {
        let Some(mut state) = self.text_editing() else {
            return InteractionResult::ignored();
        };
        if action.apply(&mut state) {
            return self.edited();
        }
        InteractionResult::ignored()
    }

    fn value(&self) -> Option<Value> {
        Some(Value::Text(self.text()))
    }

    fn set_value(&mut self, value: Value) {
        if let Some(text) = value.to_text_scalar() {
            self.lines = text.split('\n').map(String::from).collect();
            self.row = self.lines.len() - 1;
            self.col = self.current_line_len();
            self.top = 0;
            self.ensure_visible();
        }
    }

    fn validate(&self, mode: ValidationMode) -> Result<(), String> {
        validate_with_mode(&self.validators, &Value::Text(self.text()), mode)
    }

    fn cursor_pos(&self) -> Option<CursorPos> {
        let display_col: usize = self.lines[self.row]
            .chars()
            .take(self.col)
            .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(1))
            .sum();
        Some(CursorPos {
            row: self.row.saturating_sub(self.top) as u16,
            col: (GUTTER.chars().count() + display_col) as u16,
        })
    }
}
