use super::choice::{OptionCursor, option_line};
use crate::core::value::Value;
use crate::terminal::{CursorPos, KeyCode, KeyEvent};
use crate::widgets::base::WidgetBase;
use crate::widgets::traits::{
    DrawOutput, Drawable, InteractionResult, Interactive, RenderContext, ValidationMode,
};
use crate::widgets::validators::{Validator, validate_with_mode};

/// Marks any subset of options; the value lists marked options in option order.
pub struct MultiSelectInput {
    base: WidgetBase,
    options: Vec<String>,
    marked: Vec<bool>,
    cursor: OptionCursor,
    validators: Vec<Validator>,
}

impl MultiSelectInput {
    pub fn new(id: impl Into<String>, label: impl Into<String>, options: Vec<String>) -> Self {
        let marked = vec![false; options.len()];
        Self {
            base: WidgetBase::new(id, label),
            options,
            marked,
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

    fn selected(&self) -> Vec<String> {
        self.options
            .iter()
            .zip(&self.marked)
            .filter(|(_, marked)| **marked)
            .map(|(option, _)| option.clone())
            .collect()
    }
}

impl Drawable for MultiSelectInput {
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
            .zip(&self.marked)
            .enumerate()
            .map(|(idx, (option, marked))| {
                let symbol = if *marked { "◉" } else { "○" };
                option_line(
                    symbol,
                    *marked,
                    focused && self.cursor.highlighted() == idx,
                    option,
                )
            })
            .collect();
        DrawOutput { lines }
    }
}

impl Interactive for MultiSelectInput {
    fn on_key(&mut self, key: KeyEvent) -> InteractionResult {
        if self.cursor.navigate(key.code, self.options.len()) {
            return InteractionResult::handled();
        }
        match key.code {
            KeyCode::Char(' ') => {
                let Some(mark) = self.marked.get_mut(self.cursor.highlighted()) else {
                    return InteractionResult::ignored();
                };
                *mark = !*mark;
                InteractionResult::value_changed(self.base.id(), Value::List(self.selected()))
            }
            KeyCode::Enter => InteractionResult::input_done(),
            _ => InteractionResult::ignored(),
        }
    }

    fn value(&self) -> Option<Value> {
        Some(Value::List(self.selected()))
    }

    fn set_value(&mut self, value: Value) {
        let wanted = value.to_list();
        self.marked = self
            .options
            .iter()
            .map(|option| wanted.contains(option))
            .collect();
    }

    fn validate(&self, mode: ValidationMode) -> Result<(), String> {
        validate_with_mode(&self.validators, &Value::List(self.selected()), mode)
    }

    fn cursor_pos(&self) -> Option<CursorPos> {
        Some(self.cursor.cursor_pos())
    }
}

#[cfg(test)]
mod tests {
    use super::MultiSelectInput;
    use crate::core::value::Value;
    use crate::terminal::{KeyCode, KeyEvent};
    use crate::widgets::traits::Interactive;

    #[test]
    fn value_follows_option_order_not_click_order() {
        let mut input = MultiSelectInput::new(
            "langs",
            "Languages",
            vec!["Rust".to_string(), "Go".to_string(), "Zig".to_string()],
        );
        input.on_key(KeyEvent::plain(KeyCode::End));
        input.on_key(KeyEvent::plain(KeyCode::Char(' ')));
        input.on_key(KeyEvent::plain(KeyCode::Home));
        let result = input.on_key(KeyEvent::plain(KeyCode::Char(' ')));

        assert_eq!(
            result.changes().next().map(|change| change.value.clone()),
            Some(Value::List(vec!["Rust".to_string(), "Zig".to_string()]))
        );
    }

    #[test]
    fn set_value_ignores_unknown_entries() {
        let mut input =
            MultiSelectInput::new("tags", "Tags", vec!["a".to_string(), "b".to_string()]);
        input.set_value(Value::List(vec!["b".to_string(), "zzz".to_string()]));
        assert_eq!(input.value(), Some(Value::List(vec!["b".to_string()])));
    }
}
