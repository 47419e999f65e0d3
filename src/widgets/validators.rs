use crate::core::schema::{FieldDescriptor, FieldType};
use crate::core::value::{Value, format_number};
use crate::widgets::traits::ValidationMode;
use regex::Regex;
use std::sync::OnceLock;

pub type Validator = Box<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

pub const REQUIRED_MESSAGE: &str = "This field is required";
pub const SELECT_ONE_MESSAGE: &str = "Please select at least one option";

/// Run a list of validators against `value`, returning the first error.
pub fn run_validators(validators: &[Validator], value: &Value) -> Result<(), String> {
    for validator in validators {
        validator(value)?;
    }
    Ok(())
}

/// `Live` never reports an empty value; `Submit` runs every validator.
pub fn validate_with_mode(
    validators: &[Validator],
    value: &Value,
    mode: ValidationMode,
) -> Result<(), String> {
    if mode == ValidationMode::Live && value.is_empty() {
        return Ok(());
    }
    run_validators(validators, value)
}

pub fn required(message: impl Into<String>) -> Validator {
    let message = message.into();
    Box::new(move |value: &Value| match value {
        Value::Bool(false) => Err(message.clone()),
        other if other.is_empty() => Err(message.clone()),
        _ => Ok(()),
    })
}

pub fn min_length(min_len: usize, message: impl Into<String>) -> Validator {
    let message = message.into();
    Box::new(move |value: &Value| match value.as_text() {
        Some(text) if !text.is_empty() && text.chars().count() < min_len => Err(message.clone()),
        _ => Ok(()),
    })
}

pub fn max_length(max_len: usize, message: impl Into<String>) -> Validator {
    let message = message.into();
    Box::new(move |value: &Value| match value.as_text() {
        Some(text) if text.chars().count() > max_len => Err(message.clone()),
        _ => Ok(()),
    })
}

/// Whole-value match; empty values pass so `required` stays the only emptiness check.
pub fn pattern(re: Regex, message: impl Into<String>) -> Validator {
    let message = message.into();
    Box::new(move |value: &Value| match value.as_text() {
        Some(text) if !text.is_empty() && !re.is_match(text) => Err(message.clone()),
        _ => Ok(()),
    })
}

pub fn min(bound: f64, message: impl Into<String>) -> Validator {
    let message = message.into();
    Box::new(move |value: &Value| match value.to_number() {
        Some(number) if number < bound => Err(message.clone()),
        _ => Ok(()),
    })
}

pub fn max(bound: f64, message: impl Into<String>) -> Validator {
    let message = message.into();
    Box::new(move |value: &Value| match value.to_number() {
        Some(number) if number > bound => Err(message.clone()),
        _ => Ok(()),
    })
}

pub fn number(message: impl Into<String>) -> Validator {
    let message = message.into();
    Box::new(move |value: &Value| match value {
        Value::Text(text) if !text.trim().is_empty() && text.trim().parse::<f64>().is_err() => {
            Err(message.clone())
        }
        _ => Ok(()),
    })
}

pub fn email(message: impl Into<String>) -> Validator {
    format_check(email_regex(), message)
}

pub fn url(message: impl Into<String>) -> Validator {
    format_check(url_regex(), message)
}

fn format_check(re: Option<&'static Regex>, message: impl Into<String>) -> Validator {
    let message = message.into();
    Box::new(move |value: &Value| {
        let (Some(re), Some(text)) = (re, value.as_text()) else {
            return Ok(());
        };
        if text.is_empty() || re.is_match(text.trim()) {
            Ok(())
        } else {
            Err(message.clone())
        }
    })
}

fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
}

fn url_regex() -> Option<&'static Regex> {
    static URL: OnceLock<Option<Regex>> = OnceLock::new();
    URL.get_or_init(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://[^\s/?#]+\S*$").ok())
        .as_ref()
}

/// Builds the validator chain a descriptor asks for.
///
/// `validation.errorMessage`, when set, replaces every built-in message.
pub fn validators_for(field: &FieldDescriptor) -> Vec<Validator> {
    let custom = field.error_message().map(str::to_string);
    let message = |fallback: String| custom.clone().unwrap_or(fallback);
    let mut validators = Vec::<Validator>::new();

    if field.required {
        let fallback = match field.kind {
            FieldType::Checkboxgroup | FieldType::Multiselect => SELECT_ONE_MESSAGE,
            _ => REQUIRED_MESSAGE,
        };
        validators.push(required(message(fallback.to_string())));
    }

    match field.kind {
        FieldType::Email => validators.push(email(message(
            "Please enter a valid email address".to_string(),
        ))),
        FieldType::Url => validators.push(url(message("Please enter a valid URL".to_string()))),
        FieldType::Number => validators.push(number(message("Please enter a number".to_string()))),
        _ => {}
    }

    let Some(rules) = field.validation.as_ref() else {
        return validators;
    };

    if field.kind.is_numeric() {
        if let Some(bound) = rules.min {
            validators.push(min(
                bound,
                message(format!("Must be at least {}", format_number(bound))),
            ));
        }
        if let Some(bound) = rules.max {
            validators.push(max(
                bound,
                message(format!("Must be at most {}", format_number(bound))),
            ));
        }
    }

    if accepts_text_rules(field.kind) {
        if let Some(len) = rules.min_length {
            validators.push(min_length(
                len,
                message(format!("Must be at least {len} characters")),
            ));
        }
        if let Some(len) = rules.max_length {
            validators.push(max_length(
                len,
                message(format!("Must be at most {len} characters")),
            ));
        }
        if let Some(raw) = rules.pattern.as_deref().filter(|raw| !raw.is_empty()) {
            match Regex::new(&format!("^(?:{raw})$")) {
                Ok(re) => validators.push(pattern(
                    re,
                    message("Please match the requested format".to_string()),
                )),
                Err(err) => {
                    tracing::warn!(field = %field.name, pattern = %raw, error = %err, "ignoring invalid pattern");
                }
            }
        }
    }

    validators
}

fn accepts_text_rules(kind: FieldType) -> bool {
    matches!(
        kind,
        FieldType::Text
            | FieldType::Email
            | FieldType::Password
            | FieldType::Url
            | FieldType::Textarea
            | FieldType::Time
            | FieldType::Date
    )
}

#[cfg(test)]
mod tests {
    use super::{REQUIRED_MESSAGE, run_validators, validate_with_mode, validators_for};
    use crate::core::schema::{FieldDescriptor, FieldType, FieldValidation};
    use crate::core::value::Value;
    use crate::widgets::traits::ValidationMode;

    fn check(field: &FieldDescriptor, value: impl Into<Value>) -> Result<(), String> {
        run_validators(&validators_for(field), &value.into())
    }

    #[test]
    fn required_rejects_blank_text_and_unchecked_box() {
        let text = FieldDescriptor::new("Name", "name", FieldType::Text).required(true);
        assert_eq!(check(&text, "  "), Err(REQUIRED_MESSAGE.to_string()));
        assert_eq!(check(&text, "Ada"), Ok(()));

        let agree = FieldDescriptor::new("Agree", "agree", FieldType::Checkbox).required(true);
        assert!(check(&agree, false).is_err());
        assert!(check(&agree, true).is_ok());
    }

    #[test]
    fn email_and_url_formats() {
        let email = FieldDescriptor::new("Email", "email", FieldType::Email);
        assert!(check(&email, "jane@example.com").is_ok());
        assert!(check(&email, "jane@").is_err());
        assert!(check(&email, "").is_ok());

        let site = FieldDescriptor::new("Site", "site", FieldType::Url);
        assert!(check(&site, "https://example.com/a?b=c").is_ok());
        assert!(check(&site, "example").is_err());
    }

    #[test]
    fn numeric_bounds_and_partial_text() {
        let age = FieldDescriptor::new("Age", "age", FieldType::Number).with_validation(
            FieldValidation {
                min: Some(18.0),
                max: Some(99.0),
                ..FieldValidation::default()
            },
        );
        assert_eq!(check(&age, 12.0), Err("Must be at least 18".to_string()));
        assert_eq!(check(&age, 120.0), Err("Must be at most 99".to_string()));
        assert!(check(&age, 30.0).is_ok());
        assert_eq!(check(&age, "-"), Err("Please enter a number".to_string()));
    }

    #[test]
    fn length_and_pattern_use_custom_message() {
        let zip = FieldDescriptor::new("Zip", "zip", FieldType::Text).with_validation(
            FieldValidation {
                min_length: Some(5),
                pattern: Some("[0-9]+".to_string()),
                error_message: Some("Five digits please".to_string()),
                ..FieldValidation::default()
            },
        );
        assert_eq!(check(&zip, "123"), Err("Five digits please".to_string()));
        assert_eq!(check(&zip, "12a45"), Err("Five digits please".to_string()));
        assert!(check(&zip, "12345").is_ok());
    }

    #[test]
    fn invalid_pattern_is_skipped() {
        let field = FieldDescriptor::new("Code", "code", FieldType::Text).with_validation(
            FieldValidation {
                pattern: Some("([a-z".to_string()),
                ..FieldValidation::default()
            },
        );
        assert!(check(&field, "anything").is_ok());
    }

    #[test]
    fn live_mode_tolerates_empty_values() {
        let field = FieldDescriptor::new("Name", "name", FieldType::Text).required(true);
        let validators = validators_for(&field);
        let empty = Value::empty_text();
        assert!(validate_with_mode(&validators, &empty, ValidationMode::Live).is_ok());
        assert!(validate_with_mode(&validators, &empty, ValidationMode::Submit).is_err());
    }
}
