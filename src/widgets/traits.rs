use crate::core::value::Value;
use crate::runtime::event::{ValueChange, WidgetAction};
use crate::terminal::{CursorPos, KeyEvent};
use crate::ui::span::SpanLine;
use crate::widgets::inputs::text_edit;

/// Controls how strictly a widget validates its current value.
///
/// - `Live`: called after every keystroke; incomplete input is tolerated
///   and an empty value is never an error.
/// - `Submit`: called before the form is submitted; `required` and every
///   constraint are enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    Live,
    Submit,
}

#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    pub focused_id: Option<String>,
}

impl RenderContext {
    pub fn focused(id: impl Into<String>) -> Self {
        Self {
            focused_id: Some(id.into()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DrawOutput {
    pub lines: Vec<SpanLine>,
}

pub trait Drawable: Send {
    fn id(&self) -> &str;
    fn label(&self) -> &str {
        ""
    }
    fn draw(&self, ctx: &RenderContext) -> DrawOutput;
}

#[derive(Debug, Clone, Default)]
pub struct InteractionResult {
    pub handled: bool,
    pub request_render: bool,
    pub actions: Vec<WidgetAction>,
}

impl InteractionResult {
    pub fn ignored() -> Self {
        Self::default()
    }

    pub fn handled() -> Self {
        Self {
            handled: true,
            request_render: true,
            actions: Vec::new(),
        }
    }

    pub fn with_action(action: WidgetAction) -> Self {
        Self {
            handled: true,
            request_render: true,
            actions: vec![action],
        }
    }

    pub fn input_done() -> Self {
        Self::with_action(WidgetAction::InputDone)
    }

    pub fn value_changed(target: &str, value: Value) -> Self {
        Self::with_action(WidgetAction::ValueChanged {
            change: ValueChange::new(target, value),
        })
    }

    pub fn changes(&self) -> impl Iterator<Item = &ValueChange> {
        self.actions.iter().filter_map(|action| match action {
            WidgetAction::ValueChanged { change } => Some(change),
            WidgetAction::InputDone => None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAction {
    DeleteWordLeft,
    DeleteWordRight,
}

pub struct TextEditState<'a> {
    pub value: &'a mut String,
    pub cursor: &'a mut usize,
}

impl TextAction {
    pub(crate) fn apply(self, state: &mut TextEditState<'_>) -> bool {
        match self {
            Self::DeleteWordLeft => text_edit::delete_word_left(state.value, state.cursor),
            Self::DeleteWordRight => text_edit::delete_word_right(state.value, state.cursor),
        }
    }
}

pub trait Interactive: Send {
    fn on_key(&mut self, key: KeyEvent) -> InteractionResult;

    /// Word-level editing hooks; only free-text inputs opt in.
    fn text_editing(&mut self) -> Option<TextEditState<'_>> {
        None
    }
    fn on_text_action(&mut self, _action: TextAction) -> InteractionResult {
        InteractionResult::ignored()
    }

    fn value(&self) -> Option<Value>;
    fn set_value(&mut self, value: Value);

    fn validate(&self, _mode: ValidationMode) -> Result<(), String> {
        Ok(())
    }

    /// Inputs whose live errors show up without waiting for a submit attempt.
    fn reports_live_errors(&self) -> bool {
        false
    }

    /// Cursor position relative to the input's first drawn line.
    fn cursor_pos(&self) -> Option<CursorPos> {
        None
    }
}

pub trait InteractiveNode: Drawable + Interactive {}

impl<T: Drawable + Interactive> InteractiveNode for T {}
