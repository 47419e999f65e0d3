use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn empty_text() -> Self {
        Self::Text(String::new())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(v) => v.trim().is_empty(),
            Self::List(v) => v.is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Coerces scalar values to text. Lists are not scalars.
    pub fn to_text_scalar(&self) -> Option<String> {
        match self {
            Self::Text(v) => Some(v.clone()),
            Self::Bool(v) => Some(v.to_string()),
            Self::Number(v) => Some(format_number(*v)),
            Self::List(_) => None,
        }
    }

    pub fn to_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            Self::Text(v) => match v.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Some(true),
                "false" | "0" | "no" | "off" | "" => Some(false),
                _ => None,
            },
            Self::Number(v) => Some(*v != 0.0),
            Self::List(_) => None,
        }
    }

    pub fn to_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(v) => v.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// A single text value is promoted to a one-element list.
    pub fn to_list(&self) -> Vec<String> {
        match self {
            Self::List(v) => v.clone(),
            Self::Text(v) if v.is_empty() => Vec::new(),
            Self::Text(v) => vec![v.clone()],
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(v) => f.write_str(v),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Number(v) => f.write_str(&format_number(*v)),
            Self::List(v) => f.write_str(&v.join(", ")),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
