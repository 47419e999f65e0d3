use crate::core::schema::{FieldDescriptor, FieldType};
use crate::core::value::Value;
use crate::terminal::{CursorPos, KeyEvent};
use crate::ui::span::{Span, SpanLine};
use crate::ui::style::{Color, Style};
use crate::widgets::traits::{
    DrawOutput, InteractionResult, InteractiveNode, RenderContext, TextAction, ValidationMode,
};

const INDENT: &str = "    ";

/// A rendered field: label chrome, help text and inline error around one input.
pub struct FieldWidget {
    name: String,
    label: String,
    kind: FieldType,
    required: bool,
    help_text: Option<String>,
    input: Box<dyn InteractiveNode>,
    error: Option<String>,
}

impl FieldWidget {
    pub fn new(field: &FieldDescriptor, input: Box<dyn InteractiveNode>) -> Self {
        Self {
            name: field.name.clone(),
            label: field.display_label().to_string(),
            kind: field.kind,
            required: field.required,
            help_text: field
                .help_text
                .clone()
                .filter(|text| !text.trim().is_empty()),
            input,
            error: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldType {
        self.kind
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn value(&self) -> Value {
        self.input.value().unwrap_or_else(Value::empty_text)
    }

    /// Replaces the shown value without reporting a change, e.g. after a reset.
    pub fn set_value(&mut self, value: Value) {
        self.input.set_value(value);
        self.error = None;
    }

    pub fn on_key(&mut self, key: KeyEvent) -> InteractionResult {
        let result = self.input.on_key(key);
        if result.handled {
            self.refresh_error();
        }
        result
    }

    pub fn on_text_action(&mut self, action: TextAction) -> InteractionResult {
        let result = self.input.on_text_action(action);
        if result.handled {
            self.refresh_error();
        }
        result
    }

    pub fn validate(&self, mode: ValidationMode) -> Result<(), String> {
        self.input.validate(mode)
    }

    /// Runs submit validation and shows the outcome inline.
    pub fn check_submit(&mut self) -> bool {
        match self.input.validate(ValidationMode::Submit) {
            Ok(()) => {
                self.error = None;
                true
            }
            Err(message) => {
                self.error = Some(message);
                false
            }
        }
    }

    // A shown error stays until live validation passes again.
    fn refresh_error(&mut self) {
        match self.input.validate(ValidationMode::Live) {
            Ok(()) => self.error = None,
            Err(message) => {
                if self.error.is_some() || self.input.reports_live_errors() {
                    self.error = Some(message);
                }
            }
        }
    }

    fn is_focused(&self, ctx: &RenderContext) -> bool {
        ctx.focused_id.as_deref() == Some(self.name.as_str())
    }

    fn marker(&self, focused: bool) -> Span {
        if focused {
            Span::styled("> ", Style::new().color(Color::Cyan).bold())
        } else {
            Span::new("  ")
        }
    }

    fn required_marker(&self) -> Option<Span> {
        self.required
            .then(|| Span::styled(" *", Style::new().color(Color::Red)))
    }

    fn inline_label(&self) -> bool {
        self.kind == FieldType::Checkbox
    }

    pub fn draw(&self, ctx: &RenderContext) -> DrawOutput {
        let focused = self.is_focused(ctx);
        let input = self.input.draw(ctx);
        let mut lines = Vec::<SpanLine>::with_capacity(input.lines.len() + 3);

        if self.inline_label() {
            for (idx, line) in input.lines.into_iter().enumerate() {
                let mut spans = vec![if idx == 0 {
                    self.marker(focused)
                } else {
                    Span::new("  ")
                }];
                spans.extend(line);
                if idx == 0 {
                    spans.extend(self.required_marker());
                }
                lines.push(spans);
            }
        } else {
            let mut header = vec![
                self.marker(focused),
                Span::styled(self.label.clone(), Style::new().bold()),
            ];
            header.extend(self.required_marker());
            lines.push(header);
            for line in input.lines {
                let mut spans = vec![Span::new(INDENT)];
                spans.extend(line);
                lines.push(spans);
            }
        }

        if let Some(help) = &self.help_text {
            lines.push(vec![
                Span::new(INDENT),
                Span::styled(help.clone(), Style::new().color(Color::DarkGrey)),
            ]);
        }
        if let Some(error) = &self.error {
            lines.push(vec![
                Span::new(INDENT),
                Span::styled(format!("✗ {error}"), Style::new().color(Color::Red)),
            ]);
        }

        DrawOutput { lines }
    }

    /// Cursor relative to the first line returned by `draw`, when focused.
    pub fn cursor_pos(&self, ctx: &RenderContext) -> Option<CursorPos> {
        if !self.is_focused(ctx) {
            return None;
        }
        let inner = self.input.cursor_pos().unwrap_or(CursorPos { col: 0, row: 0 });
        if self.inline_label() {
            return Some(CursorPos {
                col: 3,
                row: inner.row,
            });
        }
        Some(CursorPos {
            col: inner.col + INDENT.len() as u16,
            row: inner.row + 1,
        })
    }
}
