use crate::core::value::Value;
use crate::error::ValidationError;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;

/// The closed set of field types a descriptor may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Email,
    Number,
    Password,
    Url,
    Time,
    Date,
    Textarea,
    Select,
    Multiselect,
    Checkbox,
    Checkboxgroup,
    Radio,
    Range,
    Color,
    File,
}

impl FieldType {
    pub const ALL: [FieldType; 16] = [
        Self::Text,
        Self::Email,
        Self::Number,
        Self::Password,
        Self::Url,
        Self::Time,
        Self::Date,
        Self::Textarea,
        Self::Select,
        Self::Multiselect,
        Self::Checkbox,
        Self::Checkboxgroup,
        Self::Radio,
        Self::Range,
        Self::Color,
        Self::File,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Number => "number",
            Self::Password => "password",
            Self::Url => "url",
            Self::Time => "time",
            Self::Date => "date",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::Multiselect => "multiselect",
            Self::Checkbox => "checkbox",
            Self::Checkboxgroup => "checkboxgroup",
            Self::Radio => "radio",
            Self::Range => "range",
            Self::Color => "color",
            Self::File => "file",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let needle = raw.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|kind| kind.as_str() == needle)
    }

    /// Choice types render one control per option and need a non-empty list.
    pub fn requires_options(self) -> bool {
        matches!(
            self,
            Self::Select | Self::Multiselect | Self::Radio | Self::Checkboxgroup
        )
    }

    pub fn holds_list(self) -> bool {
        matches!(self, Self::Multiselect | Self::Checkboxgroup)
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Number | Self::Range)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw).unwrap_or_else(|| {
            tracing::warn!(field_type = %raw, "unrecognised field type, rendering as text");
            Self::Text
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// One requested form field, as produced by the model or stored in a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    #[serde(default)]
    pub label: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<serde_json::Value>")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

impl FieldDescriptor {
    pub fn new(label: impl Into<String>, name: impl Into<String>, kind: FieldType) -> Self {
        Self {
            label: label.into(),
            name: name.into(),
            kind,
            required: false,
            options: Vec::new(),
            validation: None,
            placeholder: None,
            help_text: None,
            default_value: None,
            section: None,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_validation(mut self, validation: FieldValidation) -> Self {
        self.validation = Some(validation);
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_help_text(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = Some(help_text.into());
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    /// Falls back to `name` when the model left the label out.
    pub fn display_label(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.name
        } else {
            &self.label
        }
    }

    pub fn min(&self) -> Option<f64> {
        self.validation.as_ref().and_then(|v| v.min)
    }

    pub fn max(&self) -> Option<f64> {
        self.validation.as_ref().and_then(|v| v.max)
    }

    pub fn error_message(&self) -> Option<&str> {
        self.validation
            .as_ref()
            .and_then(|v| v.error_message.as_deref())
    }

    /// Section title, `None` for the implicit default group.
    pub fn section_title(&self) -> Option<&str> {
        self.section
            .as_deref()
            .map(str::trim)
            .filter(|section| !section.is_empty())
    }
}

/// Checks the list-level invariants: non-blank unique names, options for choice types.
pub fn validate_fields(fields: &[FieldDescriptor]) -> Result<(), ValidationError> {
    let mut seen = HashSet::<&str>::new();
    for (index, field) in fields.iter().enumerate() {
        if field.name.trim().is_empty() {
            return Err(ValidationError::EmptyName { index });
        }
        if !seen.insert(field.name.as_str()) {
            return Err(ValidationError::DuplicateName {
                name: field.name.clone(),
            });
        }
        if field.kind.requires_options() && field.options.is_empty() {
            return Err(ValidationError::MissingOptions {
                name: field.name.clone(),
                kind: field.kind,
            });
        }
    }
    Ok(())
}

/// Best-effort decoding of model output into a field list.
///
/// Surrounding whitespace and a single Markdown code fence are stripped
/// before parsing; anything else that is not a JSON array of descriptors
/// is a parse error.
pub fn decode_fields(raw: &str) -> Result<Vec<FieldDescriptor>, serde_json::Error> {
    serde_json::from_str(strip_code_fence(raw))
}

pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line.
    match body.find('\n') {
        Some(newline) => body[newline + 1..].trim(),
        None => body.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldDescriptor, FieldType, decode_fields, strip_code_fence, validate_fields};
    use crate::core::value::Value;
    use crate::error::ValidationError;

    #[test]
    fn decodes_minimal_descriptors_with_defaults() {
        let fields = decode_fields(
            r#"[{"label":"Full Name","name":"fullName","type":"text","required":true},
                {"label":"Email","name":"email","type":"email"}]"#,
        )
        .expect("fields should decode");

        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].kind, FieldType::Text);
        assert!(fields[0].required);
        assert_eq!(fields[1].kind, FieldType::Email);
        assert!(!fields[1].required);
        assert!(fields[1].options.is_empty());
    }

    #[test]
    fn decodes_full_vocabulary() {
        let fields = decode_fields(
            r#"[{"label":"Age","name":"age","type":"range","required":false,
                 "validation":{"min":18,"max":99,"errorMessage":"Too young"},
                 "helpText":"Your age","defaultValue":21,"section":"About"}]"#,
        )
        .expect("fields should decode");

        let age = &fields[0];
        assert_eq!(age.kind, FieldType::Range);
        assert_eq!(age.min(), Some(18.0));
        assert_eq!(age.max(), Some(99.0));
        assert_eq!(age.error_message(), Some("Too young"));
        assert_eq!(age.help_text.as_deref(), Some("Your age"));
        assert_eq!(age.default_value, Some(Value::Number(21.0)));
        assert_eq!(age.section_title(), Some("About"));
    }

    #[test]
    fn unknown_type_falls_back_to_text() {
        let fields = decode_fields(r#"[{"label":"Phone","name":"phone","type":"tel"}]"#)
            .expect("fields should decode");
        assert_eq!(fields[0].kind, FieldType::Text);
    }

    #[test]
    fn strips_markdown_fence() {
        let raw = "```json\n[{\"name\":\"a\",\"type\":\"text\"}]\n```";
        assert_eq!(strip_code_fence(raw), "[{\"name\":\"a\",\"type\":\"text\"}]");
        assert_eq!(decode_fields(raw).expect("fenced output").len(), 1);
    }

    #[test]
    fn prose_is_a_parse_error() {
        assert!(decode_fields("Sure! Here is your form.").is_err());
    }

    #[test]
    fn serializes_camel_case_and_skips_empty_optionals() {
        let field = FieldDescriptor::new("Bio", "bio", FieldType::Textarea).with_help_text("Short");
        let json = serde_json::to_value(&field).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "label": "Bio",
                "name": "bio",
                "type": "textarea",
                "required": false,
                "helpText": "Short",
            })
        );
    }

    #[test]
    fn rejects_duplicate_names() {
        let fields = vec![
            FieldDescriptor::new("A", "dup", FieldType::Text),
            FieldDescriptor::new("B", "dup", FieldType::Email),
        ];
        let Err(ValidationError::DuplicateName { name }) = validate_fields(&fields) else {
            panic!("expected duplicate name error");
        };
        assert_eq!(name, "dup");
    }

    #[test]
    fn rejects_choice_field_without_options() {
        let fields = vec![FieldDescriptor::new("Pick", "pick", FieldType::Radio)];
        assert!(matches!(
            validate_fields(&fields),
            Err(ValidationError::MissingOptions { .. })
        ));
    }

    #[test]
    fn checkbox_does_not_need_options() {
        let fields = vec![FieldDescriptor::new("Agree", "agree", FieldType::Checkbox)];
        assert!(validate_fields(&fields).is_ok());
    }
}
