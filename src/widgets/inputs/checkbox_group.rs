use super::choice::{OptionCursor, option_line};
use crate::core::value::Value;
use crate::terminal::{CursorPos, KeyCode, KeyEvent};
use crate::widgets::base::WidgetBase;
use crate::widgets::traits::{
    DrawOutput, Drawable, InteractionResult, Interactive, RenderContext, ValidationMode,
};
use crate::widgets::validators::{SELECT_ONE_MESSAGE, Validator, run_validators};

/// One checkbox per option. Checked options are kept in the order they were
/// checked; unchecking removes one entry and leaves the rest in place.
pub struct CheckboxGroupInput {
    base: WidgetBase,
    options: Vec<String>,
    checked: Vec<String>,
    cursor: OptionCursor,
    required: bool,
    empty_message: String,
    touched: bool,
    validators: Vec<Validator>,
}

impl CheckboxGroupInput {
    pub fn new(id: impl Into<String>, label: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            base: WidgetBase::new(id, label),
            options,
            checked: Vec::new(),
            cursor: OptionCursor::default(),
            required: false,
            empty_message: SELECT_ONE_MESSAGE.to_string(),
            touched: false,
            validators: Vec::new(),
        }
    }

    /// An empty selection is reported as soon as the last box is unchecked.
    pub fn with_required(mut self, required: bool, message: Option<&str>) -> Self {
        self.required = required;
        if let Some(message) = message {
            self.empty_message = message.to_string();
        }
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

    fn toggle(&mut self, option: String) {
        match self.checked.iter().position(|entry| entry == &option) {
            Some(idx) => {
                self.checked.remove(idx);
            }
            None => self.checked.push(option),
        }
        self.touched = true;
    }

    fn current(&self) -> Value {
        Value::List(self.checked.clone())
    }
}

impl Drawable for CheckboxGroupInput {
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
                let checked = self.checked.contains(option);
                let symbol = if checked { "[✓]" } else { "[ ]" };
                option_line(
                    symbol,
                    checked,
                    focused && self.cursor.highlighted() == idx,
                    option,
                )
            })
            .collect();
        DrawOutput { lines }
    }
}

impl Interactive for CheckboxGroupInput {
    fn on_key(&mut self, key: KeyEvent) -> InteractionResult {
        if self.cursor.navigate(key.code, self.options.len()) {
            return InteractionResult::handled();
        }
        match key.code {
            KeyCode::Char(' ') => {
                let Some(option) = self.options.get(self.cursor.highlighted()).cloned() else {
                    return InteractionResult::ignored();
                };
                self.toggle(option);
                InteractionResult::value_changed(self.base.id(), self.current())
            }
            KeyCode::Enter => InteractionResult::input_done(),
            _ => InteractionResult::ignored(),
        }
    }

    fn value(&self) -> Option<Value> {
        Some(self.current())
    }

    fn set_value(&mut self, value: Value) {
        self.checked = value
            .to_list()
            .into_iter()
            .filter(|entry| self.options.contains(entry))
            .collect();
        self.touched = false;
    }

    fn validate(&self, mode: ValidationMode) -> Result<(), String> {
        if self.required && self.checked.is_empty() {
            if mode == ValidationMode::Submit || self.touched {
                return Err(self.empty_message.clone());
            }
            return Ok(());
        }
        run_validators(&self.validators, &self.current())
    }

    fn reports_live_errors(&self) -> bool {
        true
    }

    fn cursor_pos(&self) -> Option<CursorPos> {
        Some(self.cursor.cursor_pos())
    }
}

#[cfg(test)]
mod tests {
    use super::CheckboxGroupInput;
    use crate::core::value::Value;
    use crate::terminal::{KeyCode, KeyEvent};
    use crate::widgets::traits::{Interactive, ValidationMode};

    fn toppings() -> CheckboxGroupInput {
        CheckboxGroupInput::new(
            "toppings",
            "Toppings",
            vec!["A".to_string(), "B".to_string(), "C".to_string()],
        )
    }

    fn space(input: &mut CheckboxGroupInput) -> Option<Value> {
        input
            .on_key(KeyEvent::plain(KeyCode::Char(' ')))
            .changes()
            .next()
            .map(|change| change.value.clone())
    }

    #[test]
    fn check_a_then_b_then_uncheck_a_leaves_b() {
        let mut input = toppings();
        assert_eq!(space(&mut input), Some(Value::List(vec!["A".to_string()])));
        input.on_key(KeyEvent::plain(KeyCode::Down));
        assert_eq!(
            space(&mut input),
            Some(Value::List(vec!["A".to_string(), "B".to_string()]))
        );
        input.on_key(KeyEvent::plain(KeyCode::Up));
        assert_eq!(space(&mut input), Some(Value::List(vec!["B".to_string()])));
    }

    #[test]
    fn keeps_check_order() {
        let mut input = toppings();
        input.on_key(KeyEvent::plain(KeyCode::End));
        space(&mut input);
        input.on_key(KeyEvent::plain(KeyCode::Home));
        assert_eq!(
            space(&mut input),
            Some(Value::List(vec!["C".to_string(), "A".to_string()]))
        );
    }

    #[test]
    fn required_group_errors_once_emptied_and_recovers() {
        let mut input = toppings().with_required(true, None);
        assert!(input.validate(ValidationMode::Live).is_ok());
        assert!(input.validate(ValidationMode::Submit).is_err());

        space(&mut input);
        assert!(input.validate(ValidationMode::Live).is_ok());
        space(&mut input);
        assert_eq!(
            input.validate(ValidationMode::Live),
            Err("Please select at least one option".to_string())
        );
        space(&mut input);
        assert!(input.validate(ValidationMode::Live).is_ok());
    }

    #[test]
    fn custom_empty_message() {
        let input = toppings().with_required(true, Some("Pick a topping"));
        assert_eq!(
            input.validate(ValidationMode::Submit),
            Err("Pick a topping".to_string())
        );
    }
}
