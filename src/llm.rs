//! Chat-completion client used for drafting.
//!
//! [`CompletionModel`] is the seam between composition logic and the
//! network: production code talks to the OpenAI chat completions API
//! through [`OpenAiClient`], tests script responses. One request, one
//! answer; there are no retries, a failed call surfaces immediately so
//! the caller can decide whether the article or just one section is
//! lost.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MAX_TOKENS: u32 = 2000;
const DEFAULT_TEMPERATURE: f32 = 0.7;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("completion came back empty")]
    EmptyCompletion,
}

/// One prompt for the model, with the persona it should answer as.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        CompletionRequest {
            system: system.into(),
            prompt: prompt.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Smaller budget for short answers (titles, keyword lists).
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Anything that can turn a prompt into text.
pub trait CompletionModel {
    fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}

/// Blocking client for the OpenAI chat completions endpoint.
pub struct OpenAiClient {
    http: reqwest::blocking::Client,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        // Completions regularly outlast the blocking client's 30 second
        // default timeout; calls wait for as long as the API takes.
        OpenAiClient {
            http: reqwest::blocking::Client::builder()
                .timeout(None)
                .build()
                .expect("Failed to build HTTP client"),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

impl CompletionModel for OpenAiClient {
    fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .http
            .post(OPENAI_API_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            // The API wraps errors in {"error": {"message": ...}}; fall
            // back to the raw body for anything else.
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .ok()
                .and_then(|body| body.error)
                .map(|detail| detail.message)
                .unwrap_or(text);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response.json()?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        let cleaned = strip_formatting(&content);
        if cleaned.is_empty() {
            return Err(LlmError::EmptyCompletion);
        }
        Ok(cleaned)
    }
}

/// Remove decoration models like to add around an answer: code fences
/// (with or without a language tag), a leading `Title:` style label,
/// and wrapping quotes.
pub fn strip_formatting(raw: &str) -> String {
    let mut text = raw.trim();

    if let Some(after_open) = text.strip_prefix("```") {
        let inner = match after_open.find('\n') {
            Some(newline) => &after_open[newline + 1..],
            None => after_open,
        };
        text = inner.strip_suffix("```").unwrap_or(inner).trim();
    }

    for label in ["Title:", "title:", "タイトル:", "タイトル："] {
        if let Some(rest) = text.strip_prefix(label) {
            text = rest.trim_start();
            break;
        }
    }

    if let Some(unquoted) = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
    {
        text = unquoted;
    }

    text.trim().to_string()
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Scripted stand-in for the real API: hands out pre-seeded
    /// responses in order and records every prompt it was given. Once
    /// the script runs dry it answers with [`LlmError::EmptyCompletion`].
    pub struct ScriptedModel {
        responses: Mutex<Vec<String>>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        pub fn new(responses: &[&str]) -> Self {
            ScriptedModel {
                responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn prompt_count(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    impl CompletionModel for ScriptedModel {
        fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(request.prompt.clone());
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Err(LlmError::EmptyCompletion);
            }
            Ok(responses.remove(0))
        }
    }

    // =========================================================================
    // strip_formatting tests
    // =========================================================================

    #[test]
    fn strips_plain_code_fences() {
        assert_eq!(strip_formatting("```\nhello\n```"), "hello");
    }

    #[test]
    fn strips_fences_with_language_tag() {
        assert_eq!(
            strip_formatting("```markdown\n## Section\n\ntext\n```"),
            "## Section\n\ntext"
        );
    }

    #[test]
    fn strips_title_label() {
        assert_eq!(strip_formatting("Title: Seven Solid Habits"), "Seven Solid Habits");
        assert_eq!(strip_formatting("タイトル：七つの習慣"), "七つの習慣");
    }

    #[test]
    fn strips_wrapping_quotes() {
        assert_eq!(strip_formatting("\"Seven Solid Habits\""), "Seven Solid Habits");
    }

    #[test]
    fn strips_stacked_decoration() {
        assert_eq!(
            strip_formatting("```\nTitle: \"Seven Solid Habits\"\n```"),
            "Seven Solid Habits"
        );
    }

    #[test]
    fn interior_quotes_survive() {
        assert_eq!(
            strip_formatting("The \"right\" way to plan"),
            "The \"right\" way to plan"
        );
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(strip_formatting("  already clean  "), "already clean");
    }

    // =========================================================================
    // ScriptedModel tests
    // =========================================================================

    #[test]
    fn scripted_model_pops_in_order_then_errors() {
        let model = ScriptedModel::new(&["first", "second"]);
        let request = CompletionRequest::new("sys", "p1");
        assert_eq!(model.complete(&request).unwrap(), "first");
        assert_eq!(model.complete(&request).unwrap(), "second");
        assert!(matches!(
            model.complete(&request),
            Err(LlmError::EmptyCompletion)
        ));
        assert_eq!(model.prompt_count(), 3);
    }

    // =========================================================================
    // wire format tests
    // =========================================================================

    #[test]
    fn chat_request_serializes_both_messages() {
        let body = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![
                ChatMessage { role: "system", content: "persona" },
                ChatMessage { role: "user", content: "prompt" },
            ],
            temperature: 0.7,
            max_tokens: 2000,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "prompt");
        assert_eq!(json["max_tokens"], 2000);
    }

    #[test]
    fn chat_response_parses_the_first_choice() {
        let raw = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"an answer"},"finish_reason":"stop"}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        let content = parsed.choices.into_iter().next().unwrap().message.content;
        assert_eq!(content.as_deref(), Some("an answer"));
    }

    #[test]
    fn api_error_body_parses() {
        let raw = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
        let parsed: ApiErrorBody = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.error.unwrap().message, "Incorrect API key provided");
    }
}
