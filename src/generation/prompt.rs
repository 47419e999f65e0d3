use crate::core::schema::{FieldDescriptor, FieldType};

const INSTRUCTIONS: &str = r#"You are an assistant that generates form definitions.
Given a description of a form, answer with a JSON array of form field objects and nothing else: no prose, no Markdown.

Each object uses exactly these properties:
- label (string): text shown next to the control
- name (string, camelCase, no spaces, unique within the array)
- type (string): one of TYPES
- required (boolean)
- options (array of strings): only for select, multiselect, radio and checkboxgroup, never empty for those
- validation (object, optional): any of minLength, maxLength, pattern (regex), min, max, errorMessage
- placeholder (string, optional)
- helpText (string, optional): helper text shown below the control
- defaultValue (optional): initial value
- section (string, optional): section name used to group related fields

Example output: [{"label": "Full Name", "name": "fullName", "type": "text", "required": true}]"#;

/// System instruction sent ahead of every user prompt.
pub fn system_prompt() -> String {
    let types = FieldType::ALL
        .iter()
        .map(|kind| format!("\"{kind}\""))
        .collect::<Vec<_>>()
        .join(", ");
    let schema = schemars::schema_for!(FieldDescriptor);
    let schema = serde_json::to_string(&schema).unwrap_or_default();

    format!(
        "{}\n\nJSON Schema of one field object:\n{schema}",
        INSTRUCTIONS.replace("TYPES", &types)
    )
}

pub fn user_prompt(description: &str) -> String {
    format!("Create a JSON array of form fields based on this description: \"{description}\"")
}
