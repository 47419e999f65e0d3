use super::choice::{OptionCursor, option_line};
use crate::core::value::Value;
use crate::terminal::{CursorPos, KeyCode, KeyEvent};
use crate::widgets::base::WidgetBase;
use crate::widgets::traits::{
    DrawOutput, Drawable, InteractionResult, Interactive, RenderContext, ValidationMode,
};
use crate::widgets::validators::{Validator, validate_with_mode};

/// One control per option; at most one selected.
pub struct RadioInput {
    base: WidgetBase,
    options: Vec<String>,
    selected: Option<usize>,
    cursor: OptionCursor,
    validators: Vec<Validator>,
}

impl RadioInput {
    pub fn new(id: impl Into<String>, label: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            base: WidgetBase::new(id, label),
            options,
            selected: None,
            cursor: OptionCursor::default(),
            validators: Vec::new(),
        }
    }

    pub fn with_validators(mut self, validators: Vec<Validator>) -> Self {
        self.validators = validators;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.set_value(value.into());
        self
    }

    fn selected_value(&self) -> Value {
        self.selected
            .and_then(|idx| self.options.get(idx))
            .map(|option| Value::text(option.as_str()))
            .unwrap_or_else(Value::empty_text)
    }
}

impl Drawable for RadioInput {
    fn id(&self) -> &str {
        self.base.id()
    }

    fn label(&self) -> &str {
        self.base.label()
    }

    fn draw(&self, ctx: &RenderContext) -> DrawOutput {
        let focused = self.base.is_focused(ctx);
        let lines = self
            .options
            .iter()
            .enumerate()
            .map(|(idx, option)| {
                let selected = self.selected == Some(idx);
                let symbol = if selected { "(•)" } else { "( )" };
                option_line(
                    symbol,
                    selected,
                    focused && self.cursor.highlighted() == idx,
                    option,
                )
            })
            .collect();
        DrawOutput { lines }
    }
}

impl Interactive for RadioInput {
    fn on_key(&mut self, key: KeyEvent) -> InteractionResult {
        if self.cursor.navigate(key.code, self.options.len()) {
            return InteractionResult::handled();
        }
        match key.code {
            KeyCode::Char(' ') | KeyCode::Enter if !self.options.is_empty() => {
                let highlighted = self.cursor.highlighted();
                if self.selected == Some(highlighted) {
                    return InteractionResult::handled();
                }
                self.selected = Some(highlighted);
                InteractionResult::value_changed(self.base.id(), self.selected_value())
            }
            _ => InteractionResult::ignored(),
        }
    }

    fn value(&self) -> Option<Value> {
        Some(self.selected_value())
    }

    fn set_value(&mut self, value: Value) {
        let Some(text) = value.to_text_scalar() else {
            return;
        };
        self.selected = self.options.iter().position(|option| option == &text);
    }

    fn validate(&self, mode: ValidationMode) -> Result<(), String> {
        validate_with_mode(&self.validators, &self.selected_value(), mode)
    }

    fn cursor_pos(&self) -> Option<CursorPos> {
        Some(self.cursor.cursor_pos())
    }
}
