use crate::core::value::{Value, format_number};
use crate::terminal::{KeyCode, KeyEvent};
use crate::ui::span::Span;
use crate::ui::style::{Color, Style};
use crate::widgets::base::WidgetBase;
use crate::widgets::traits::{
    DrawOutput, Drawable, InteractionResult, Interactive, RenderContext, ValidationMode,
};
use crate::widgets::validators::{Validator, run_validators};

pub const DEFAULT_MIN: f64 = 0.0;
pub const DEFAULT_MAX: f64 = 100.0;
const STEP: f64 = 1.0;

/// Bounded numeric slider with its live value drawn beside the track.
pub struct RangeInput {
    base: WidgetBase,
    min: f64,
    max: f64,
    value: f64,
    track_len: usize,
    validators: Vec<Validator>,
}

impl RangeInput {
    pub fn new(id: impl Into<String>, label: impl Into<String>, min: f64, max: f64) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            base: WidgetBase::new(id, label),
            min,
            max,
            value: min,
            track_len: 20,
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

    fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    fn move_to(&mut self, target: f64) -> InteractionResult {
        let next = self.clamp(target);
        if next == self.value {
            return InteractionResult::ignored();
        }
        self.value = next;
        InteractionResult::value_changed(self.base.id(), Value::Number(self.value))
    }

    fn knob_position(&self) -> usize {
        if self.max <= self.min {
            return 0;
        }
        let ratio = (self.value - self.min) / (self.max - self.min);
        let raw = (ratio * (self.track_len as f64 - 1.0)).round();
        raw.clamp(0.0, (self.track_len - 1) as f64) as usize
    }
}

impl Drawable for RangeInput {
    fn id(&self) -> &str {
        self.base.id()
    }

    fn label(&self) -> &str {
        self.base.label()
    }

    fn draw(&self, _ctx: &RenderContext) -> DrawOutput {
        let active = Style::new().color(Color::Green);
        let knob = self.knob_position();

        let mut spans = vec![Span::styled(format_number(self.min), Style::new().color(Color::DarkGrey))];
        spans.push(Span::new(" ‹"));
        for idx in 0..self.track_len {
            let symbol = if idx == knob { "◈" } else { "—" };
            if idx <= knob {
                spans.push(Span::styled(symbol, active));
            } else {
                spans.push(Span::new(symbol));
            }
        }
        spans.push(Span::new("› "));
        spans.push(Span::styled(
            format_number(self.max),
            Style::new().color(Color::DarkGrey),
        ));
        spans.push(Span::new("  "));
        spans.push(Span::styled(format_number(self.value), Style::new().bold()));

        DrawOutput { lines: vec![spans] }
    }
}

impl Interactive for RangeInput {
    fn on_key(&mut self, key: KeyEvent) -> InteractionResult {
        match key.code {
            KeyCode::Left | KeyCode::Down => self.move_to(self.value - STEP),
            KeyCode::Right | KeyCode::Up => self.move_to(self.value + STEP),
            KeyCode::PageDown => self.move_to(self.value - STEP * 10.0),
            KeyCode::PageUp => self.move_to(self.value + STEP * 10.0),
            KeyCode::Home => self.move_to(self.min),
            KeyCode::End => self.move_to(self.max),
            KeyCode::Enter => InteractionResult::input_done(),
            _ => InteractionResult::ignored(),
        }
    }

    fn value(&self) -> Option<Value> {
        Some(Value::Number(self.value))
    }

    fn set_value(&mut self, value: Value) {
        if let Some(number) = value.to_number() {
            self.value = self.clamp(number);
        }
    }

    fn validate(&self, _mode: ValidationMode) -> Result<(), String> {
        run_validators(&self.validators, &Value::Number(self.value))
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_MAX, DEFAULT_MIN, RangeInput};
    use crate::core::value::Value;
    use crate::terminal::{KeyCode, KeyEvent};
    use crate::ui::span::line_text;
    use crate::widgets::traits::{Drawable, Interactive, RenderContext};

    #[test]
    fn arrows_move_within_bounds() {
        let mut input = RangeInput::new("volume", "Volume", DEFAULT_MIN, DEFAULT_MAX);
        assert!(!input.on_key(KeyEvent::plain(KeyCode::Left)).handled);

        let result = input.on_key(KeyEvent::plain(KeyCode::Right));
        assert_eq!(
            result.changes().next().map(|change| change.value.clone()),
            Some(Value::Number(1.0))
        );
        input.on_key(KeyEvent::plain(KeyCode::End));
        assert_eq!(input.value(), Some(Value::Number(100.0)));
        assert!(!input.on_key(KeyEvent::plain(KeyCode::Right)).handled);
    }

    #[test]
    fn value_is_clamped_and_drawn() {
        let mut input = RangeInput::new("rating", "Rating", 1.0, 5.0).with_default(9.0);
        assert_eq!(input.value(), Some(Value::Number(5.0)));
        input.set_value(Value::text("3"));
        let drawn = line_text(&input.draw(&RenderContext::default()).lines[0]);
        assert!(drawn.ends_with("  3"), "{drawn}");
    }
}
