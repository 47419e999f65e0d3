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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextMode {
    #[default]
    Plain,
    /// Drawn as one `*` per character.
    Password,
}

/// What the entered text is reported as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextKind {
    #[default]
    Text,
    /// Reported as a number once the text parses, as text before that.
    Number,
}

/// Single-line input used by every text-like field type.
pub struct TextInput {
    base: WidgetBase,
    value: String,
    cursor: usize,
    mode: TextMode,
    kind: TextKind,
    placeholder: Option<String>,
    validators: Vec<Validator>,
}

impl TextInput {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            base: WidgetBase::new(id, label),
            value: String::new(),
            cursor: 0,
            mode: TextMode::Plain,
            kind: TextKind::Text,
            placeholder: None,
            validators: Vec::new(),
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_mode(mut self, mode: TextMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_kind(mut self, kind: TextKind) -> Self {
        self.kind = kind;
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

    fn display_value(&self) -> String {
        match self.mode {
            TextMode::Plain => self.value.clone(),
            TextMode::Password => "*".repeat(text_edit::char_count(&self.value)),
        }
    }

    fn current_value(&self) -> Value {
        match self.kind {
            TextKind::Number => match self.value.trim().parse::<f64>() {
                Ok(number) if !self.value.trim().is_empty() => Value::Number(number),
                _ => Value::Text(self.value.clone()),
            },
            TextKind::Text => Value::Text(self.value.clone()),
        }
    }

    fn edited_result(&self) -> InteractionResult {
        InteractionResult::value_changed(self.base.id(), self.current_value())
    }
}

impl Drawable for TextInput {
    fn id(&self) -> &str {
        self.base.id()
    }

    fn label(&self) -> &str {
        self.base.label()
    }

    fn draw(&self, _ctx: &RenderContext) -> DrawOutput {
        let line = match (&self.placeholder, self.value.is_empty()) {
            (Some(placeholder), true) => vec![Span::styled(
                placeholder.clone(),
                Style::new().color(Color::DarkGrey),
            )],
            _ => vec![Span::new(self.display_value())],
        };
        DrawOutput { lines: vec![line] }
    }
}

impl Interactive for TextInput {
    fn on_key(&mut self, key: KeyEvent) -> InteractionResult {
        if key.modifiers.contains(KeyModifiers::CONTROL) || key.modifiers.contains(KeyModifiers::ALT)
        {
            return InteractionResult::ignored();
        }
        match key.code {
            KeyCode::Char(ch) => {
                text_edit::insert_char(&mut self.value, &mut self.cursor, ch);
                self.edited_result()
            }
            KeyCode::Backspace => {
                if text_edit::backspace_char(&mut self.value, &mut self.cursor) {
                    return self.edited_result();
                }
                InteractionResult::ignored()
            }
            KeyCode::Delete => {
                if text_edit::delete_char(&mut self.value, &mut self.cursor) {
                    return self.edited_result();
                }
                InteractionResult::ignored()
            }
            KeyCode::Left => {
                if text_edit::move_left(&mut self.cursor, &self.value) {
                    return InteractionResult::handled();
                }
                InteractionResult::ignored()
            }
            KeyCode::Right => {
                if text_edit::move_right(&mut self.cursor, &self.value) {
                    return InteractionResult::handled();
                }
                InteractionResult::ignored()
            }
            KeyCode::Home => {
                self.cursor = 0;
                InteractionResult::handled()
            }
            KeyCode::End => {
                self.cursor = text_edit::char_count(&self.value);
                InteractionResult::handled()
            }
            KeyCode::Enter => InteractionResult::input_done(),
            _ => InteractionResult::ignored(),
        }
    }

    fn text_editing(&mut self) -> Option<TextEditState<'_>> {
        if self.mode != TextMode::Plain {
            return None;
        }
        Some(TextEditState {
            value: &mut self.value,
            cursor: &mut self.cursor,
        })
    }

    fn on_text_action(&mut self, action: TextAction) -> InteractionResult {
        let Some(mut state) = self.text_editing() else {
            return InteractionResult::ignored();
        };
        if action.apply(&mut state) {
            return self.edited_result();
        }
        InteractionResult::ignored()
    }

    fn value(&self) -> Option<Value> {
        Some(self.current_value())
    }

    fn set_value(&mut self, value: Value) {
        if let Some(text) = value.to_text_scalar() {
            self.value = text;
            self.cursor = text_edit::char_count(&self.value);
        }
    }

    fn validate(&self, mode: ValidationMode) -> Result<(), String> {
        validate_with_mode(&self.validators, &self.current_value(), mode)
    }

    fn cursor_pos(&self) -> Option<CursorPos> {
        let shown = text_edit::clamp_cursor(self.cursor, &self.value);
        let col: usize = match self.mode {
            TextMode::Password => shown,
            TextMode::Plain => self
                .value
                .chars()
                .take(shown)
                .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(0))
                .sum(),
        };
        Some(CursorPos {
            col: col as u16,
            row: 0,
        })
    }
}
