use crate::core::value::Value;
use crate::terminal::{KeyCode, KeyEvent};
use crate::ui::span::Span;
use crate::ui::style::{Color, Style};
use crate::widgets::base::WidgetBase;
use crate::widgets::traits::{
    DrawOutput, Drawable, InteractionResult, Interactive, RenderContext, ValidationMode,
};
use crate::widgets::validators::{Validator, run_validators};

/// A single boolean box with its label drawn beside it.
pub struct CheckboxInput {
    base: WidgetBase,
    checked: bool,
    validators: Vec<Validator>,
}

impl CheckboxInput {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            base: WidgetBase::new(id, label),
            checked: false,
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
}

impl Drawable for CheckboxInput {
    fn id(&self) -> &str {
        self.base.id()
    }

    fn label(&self) -> &str {
        self.base.label()
    }

    fn draw(&self, _ctx: &RenderContext) -> DrawOutput {
        let (symbol, style) = if self.checked {
            ("[✓]", Style::new().color(Color::Green))
        } else {
            ("[ ]", Style::default())
        };
        DrawOutput {
            lines: vec![vec![
                Span::styled(symbol, style),
                Span::new(format!(" {}", self.base.label())),
            ]],
        }
    }
}

impl Interactive for CheckboxInput {
    fn on_key(&mut self, key: KeyEvent) -> InteractionResult {
        match key.code {
            KeyCode::Char(' ') => {
                self.checked = !self.checked;
                InteractionResult::value_changed(self.base.id(), Value::Bool(self.checked))
            }
            KeyCode::Enter => InteractionResult::input_done(),
            _ => InteractionResult::ignored(),
        }
    }

    fn value(&self) -> Option<Value> {
        Some(Value::Bool(self.checked))
    }

    fn set_value(&mut self, value: Value) {
        if let Some(flag) = value.to_bool() {
            self.checked = flag;
        }
    }

    fn validate(&self, mode: ValidationMode) -> Result<(), String> {
        if mode == ValidationMode::Live {
            return Ok(());
        }
        run_validators(&self.validators, &Value::Bool(self.checked))
    }
}
