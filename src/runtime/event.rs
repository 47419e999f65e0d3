use crate::core::value::Value;

/// New value for the field named `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueChange {
    pub target: String,
    pub value: Value,
}

impl ValueChange {
    pub fn new(target: impl Into<String>, value: Value) -> Self {
        Self {
            target: target.into(),
            value,
        }
    }
}

/// What a widget asks the session to do after handling a key.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetAction {
    ValueChanged { change: ValueChange },
    InputDone,
}
