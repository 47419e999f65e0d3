use crate::core::schema::{FieldDescriptor, decode_fields};
use crate::error::GenerationError;
use crate::generation::prompt::{system_prompt, user_prompt};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

/// Body of a chat-completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// Carries one chat request to the model (or a relay) and returns the raw body.
pub trait ChatTransport: Send + Sync {
    fn send(&self, request: &ChatRequest) -> Result<String, GenerationError>;
}

/// Blocking HTTP transport.
pub struct HttpTransport {
    agent: ureq::Agent,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .build();
        Self {
            agent,
            endpoint: endpoint.into(),
            api_key,
        }
    }
}

impl ChatTransport for HttpTransport {
    fn send(&self, request: &ChatRequest) -> Result<String, GenerationError> {
        let body = serde_json::to_string(request)
            .map_err(|err| GenerationError::Transport(err.to_string()))?;

        let mut call = self
            .agent
            .post(&self.endpoint)
            .set("Content-Type", "application/json");
        if let Some(key) = &self.api_key {
            call = call.set("Authorization", &format!("Bearer {key}"));
        }

        match call.send_string(&body) {
            Ok(response) => response
                .into_string()
                .map_err(|err| GenerationError::Transport(err.to_string())),
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().unwrap_or_default();
                Err(status_error(status, &body))
            }
            Err(ureq::Error::Transport(transport)) => {
                Err(GenerationError::Transport(transport.to_string()))
            }
        }
    }
}

/// Prefers the upstream `error.message`, then a short plain-text body.
pub fn status_error(status: u16, body: &str) -> GenerationError {
    let upstream = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .and_then(|detail| detail.message);
    let message = match upstream {
        Some(message) => message,
        None if !body.trim().is_empty() && !body.trim_start().starts_with('{') => {
            body.trim().to_string()
        }
        None => format!("API request failed with status {status}"),
    };
    GenerationError::Status { status, message }
}

#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.7,
            max_tokens: 500,
        }
    }
}

/// A parsed field list together with the model text it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub raw: String,
    pub fields: Vec<FieldDescriptor>,
}

impl Generated {
    /// Raw output re-indented for display; falls back to the text as returned.
    pub fn pretty_raw(&self) -> String {
        serde_json::from_str::<serde_json::Value>(crate::core::schema::strip_code_fence(&self.raw))
            .and_then(|value| serde_json::to_string_pretty(&value))
            .unwrap_or_else(|_| self.raw.clone())
    }
}

pub struct GenerationClient<T: ChatTransport> {
    transport: T,
    settings: GenerationSettings,
}

impl<T: ChatTransport> GenerationClient<T> {
    pub fn new(transport: T, settings: GenerationSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn request_for(&self, prompt: &str) -> ChatRequest {
        ChatRequest {
            model: self.settings.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt(),
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt(prompt),
                },
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        }
    }

    /// One attempt, no retry.
    pub fn generate(&self, prompt: &str) -> Result<Generated, GenerationError> {
        if prompt.trim().is_empty() {
            return Err(GenerationError::EmptyPrompt);
        }

        tracing::info!(model = %self.settings.model, "requesting form generation");
        let body = self.transport.send(&self.request_for(prompt))?;

        let response: ChatResponse = serde_json::from_str(&body).map_err(|err| {
            GenerationError::Transport(format!("unexpected response body: {err}"))
        })?;
        let raw = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(GenerationError::MissingContent)?;

        match decode_fields(&raw) {
            Ok(fields) => {
                tracing::info!(fields = fields.len(), "model returned field list");
                Ok(Generated { raw, fields })
            }
            Err(source) => {
                tracing::warn!(error = %source, "model output did not parse");
                Err(GenerationError::Parse { raw, source })
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{
        ChatRequest, ChatTransport, GenerationClient, GenerationSettings, status_error,
    };
    use crate::core::schema::FieldType;
    use crate::error::GenerationError;
    use std::sync::Mutex;

    /// Answers every request with a fixed body and records what was sent.
    pub(crate) struct CannedTransport {
        pub(crate) reply: Result<String, u16>,
        pub(crate) sent: Mutex<Vec<ChatRequest>>,
    }

    impl CannedTransport {
        pub(crate) fn content(content: &str) -> Self {
            let body = serde_json::json!({
                "choices": [{ "message": { "role": "assistant", "content": content } }]
            });
            Self {
                reply: Ok(body.to_string()),
                sent: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn status(status: u16) -> Self {
            Self {
                reply: Err(status),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    impl ChatTransport for CannedTransport {
        fn send(&self, request: &ChatRequest) -> Result<String, GenerationError> {
            self.sent.lock().expect("lock").push(request.clone());
            match &self.reply {
                Ok(body) => Ok(body.clone()),
                Err(status) => Err(status_error(
                    *status,
                    r#"{"error":{"message":"Incorrect API key provided"}}"#,
                )),
            }
        }
    }

    fn client(transport: CannedTransport) -> GenerationClient<CannedTransport> {
        GenerationClient::new(transport, GenerationSettings::default())
    }

    #[test]
    fn parses_field_list_and_keeps_raw_text() {
        let content = r#"  [{"label":"Full Name","name":"fullName","type":"text","required":true},
            {"label":"Email","name":"email","type":"email","required":true}]  "#;
        let generated = client(CannedTransport::content(content))
            .generate("contact form with name and email")
            .expect("generate");

        assert_eq!(generated.fields.len(), 2);
        assert_eq!(generated.fields[1].kind, FieldType::Email);
        assert_eq!(generated.raw, content.trim());
    }

    #[test]
    fn sends_system_and_user_messages() {
        let client = client(CannedTransport::content("[]"));
        client.generate("survey").expect("generate");

        let sent = client.transport.sent.lock().expect("lock");
        assert_eq!(sent.len(), 1);
        let request = &sent[0];
        assert_eq!(request.model, "gpt-3.5-turbo");
        assert_eq!(request.max_tokens, 500);
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(request.messages[1].role, "user");
        assert!(request.messages[1].content.contains("\"survey\""));
    }

    #[test]
    fn malformed_output_is_a_parse_error_with_raw_text() {
        let err = client(CannedTransport::content("Here is your form: name, email"))
            .generate("contact")
            .expect_err("should fail");
        assert!(matches!(err, GenerationError::Parse { .. }));
        assert_eq!(err.raw_output(), Some("Here is your form: name, email"));
    }

    #[test]
    fn fenced_output_is_accepted() {
        let generated = client(CannedTransport::content(
            "```json\n[{\"label\":\"Age\",\"name\":\"age\",\"type\":\"number\"}]\n```",
        ))
        .generate("age")
        .expect("generate");
        assert_eq!(generated.fields[0].kind, FieldType::Number);
        assert!(generated.pretty_raw().starts_with('['));
    }

    #[test]
    fn http_failure_surfaces_upstream_message() {
        let err = client(CannedTransport::status(401))
            .generate("contact")
            .expect_err("should fail");
        let GenerationError::Status { status, message } = err else {
            panic!("expected status error");
        };
        assert_eq!(status, 401);
        assert_eq!(message, "Incorrect API key provided");
    }

    #[test]
    fn status_error_falls_back_to_status_code() {
        let GenerationError::Status { message, .. } = status_error(503, "{}") else {
            panic!("expected status error");
        };
        assert_eq!(message, "API request failed with status 503");

        let GenerationError::Status { message, .. } =
            status_error(500, "Error generating form: quota exceeded")
        else {
            panic!("expected status error");
        };
        assert_eq!(message, "Error generating form: quota exceeded");
    }

    #[test]
    fn empty_choices_is_missing_content() {
        let transport = CannedTransport {
            reply: Ok(r#"{"choices":[]}"#.to_string()),
            sent: std::sync::Mutex::new(Vec::new()),
        };
        assert!(matches!(
            client(transport).generate("x"),
            Err(GenerationError::MissingContent)
        ));
    }

    #[test]
    fn blank_prompt_is_rejected_without_a_request() {
        let client = client(CannedTransport::content("[]"));
        assert!(matches!(
            client.generate("   "),
            Err(GenerationError::EmptyPrompt)
        ));
        assert!(client.transport.sent.lock().expect("lock").is_empty());
    }
}
