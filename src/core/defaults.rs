use crate::core::schema::{FieldDescriptor, FieldType};
use crate::core::value::Value;
use crate::state::store::ValueStore;

/// Initial value for a single field.
///
/// A set `defaultValue` wins verbatim; otherwise the type decides. Only the
/// empty string counts as unset.
pub fn default_for(field: &FieldDescriptor) -> Value {
    let unset = |value: &&Value| matches!(value, Value::Text(text) if text.is_empty());
    if let Some(value) = field.default_value.as_ref().filter(|value| !unset(value)) {
        return value.clone();
    }
    match field.kind {
        FieldType::Multiselect | FieldType::Checkboxgroup => Value::List(Vec::new()),
        FieldType::Checkbox => Value::Bool(false),
        FieldType::Radio => Value::empty_text(),
        FieldType::Number | FieldType::Range => Value::Number(field.min().unwrap_or(0.0)),
        _ => Value::empty_text(),
    }
}

/// Fresh value map for a field list, one entry per field in field order.
pub fn defaults_for(fields: &[FieldDescriptor]) -> ValueStore {
    let mut store = ValueStore::new();
    for field in fields {
        store.set(field.name.clone(), default_for(field));
    }
    store
}
