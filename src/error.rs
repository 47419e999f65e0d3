use crate::core::schema::FieldType;
use thiserror::Error;

/// Failure while turning a prompt into a field list.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Please describe the form you want to generate")]
    EmptyPrompt,
    #[error("A form is already being generated")]
    Busy,
    #[error("Error generating form: {0}")]
    Transport(String),
    #[error("Error generating form: {message}")]
    Status { status: u16, message: String },
    #[error("Error generating form: response contained no message content")]
    MissingContent,
    #[error("Error generating form: model output is not a field list: {source}")]
    Parse {
        raw: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Error generating form: worker stopped before reporting a result")]
    Runner,
}

impl GenerationError {
    /// Raw model text, when the failure happened after the model answered.
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            Self::Parse { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

/// A field list that violates the list-level invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("field #{index} has no name")]
    EmptyName { index: usize },
    #[error("field name '{name}' is used more than once")]
    DuplicateName { name: String },
    #[error("{kind} field '{name}' has no options")]
    MissingOptions { name: String, kind: FieldType },
}

/// Durable blob could not be read or written.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not encode collection: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("could not decode collection: {0}")]
    Decode(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("template {0} not found")]
    NotFound(u64),
    #[error("Please generate a form before saving")]
    NoFields,
    #[error("Please enter a prompt before saving")]
    EmptyPrompt,
    #[error("invalid field list: {0}")]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("invalid field list: {0}")]
    Validation(#[from] ValidationError),
    #[error("no form is loaded")]
    NotLoaded,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),
}
