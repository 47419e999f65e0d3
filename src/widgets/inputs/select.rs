use crate::core::value::Value;
use crate::terminal::{KeyCode, KeyEvent};
use crate::ui::span::Span;
use crate::ui::style::{Color, Style};
use crate::widgets::base::WidgetBase;
use crate::widgets::traits::{
    DrawOutput, Drawable, InteractionResult, Interactive, RenderContext, ValidationMode,
};
use crate::widgets::validators::{Validator, validate_with_mode};

pub const SELECT_SENTINEL: &str = "Select an option";

/// Single choice cycled with Left/Right; position 0 is the empty sentinel.
pub struct SelectInput {
    base: WidgetBase,
    options: Vec<String>,
    /// 0 is the sentinel, `n` is `options[n - 1]`.
    position: usize,
    validators: Vec<Validator>,
}

impl SelectInput {
    pub fn new(id: impl Into<String>, label: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            base: WidgetBase::new(id, label),
            options,
            position: 0,
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

    fn selected_text(&self) -> &str {
        match self.position {
            0 => "",
            n => self.options.get(n - 1).map(String::as_str).unwrap_or(""),
        }
    }

    fn shift(&mut self, forward: bool) -> InteractionResult {
        let slots = self.options.len() + 1;
        self.position = if forward {
            (self.position + 1) % slots
        } else {
            (self.position + slots - 1) % slots
        };
        InteractionResult::value_changed(
            self.base.id(),
            Value::Text(self.selected_text().to_string()),
        )
    }
}

impl Drawable for SelectInput {
    fn id(&self) -> &str {
        self.base.id()
    }

    fn label(&self) -> &str {
        self.base.label()
    }

    fn draw(&self, _ctx: &RenderContext) -> DrawOutput {
        let choice = if self.position == 0 {
            Span::styled(SELECT_SENTINEL, Style::new().color(Color::DarkGrey))
        } else {
            Span::new(self.selected_text())
        };
        DrawOutput {
            lines: vec![vec![Span::new("‹ "), choice, Span::new(" ›")]],
        }
    }
}

impl Interactive for SelectInput {
    fn on_key(&mut self, key: KeyEvent) -> InteractionResult {
        match key.code {
            KeyCode::Left => self.shift(false),
            KeyCode::Right | KeyCode::Char(' ') => self.shift(true),
            KeyCode::Enter => InteractionResult::input_done(),
            _ => InteractionResult::ignored(),
        }
    }

    fn value(&self) -> Option<Value> {
        Some(Value::Text(self.selected_text().to_string()))
    }

    fn set_value(&mut self, value: Value) {
        let Some(text) = value.to_text_scalar() else {
            return;
        };
        self.position = self
            .options
            .iter()
            .position(|option| option == &text)
            .map(|idx| idx + 1)
            .unwrap_or(0);
    }

    fn validate(&self, mode: ValidationMode) -> Result<(), String> {
        validate_with_mode(
            &self.validators,
            &Value::Text(self.selected_text().to_string()),
            mode,
        )
    }
}
