//! Command Oracle Adapter.
//!
//! Sends the user's text plus a fixed instruction prompt to an external
//! chat-completion service and extracts a structured-intent object from the
//! reply. Command interpretation never fails the caller: configuration,
//! transport, and decoding problems all degrade to an `unknown` intent and
//! are logged, not raised. No retries — a failed call degrades immediately.

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

const COMMAND_TIMEOUT: Duration = Duration::from_secs(10);
const CHAT_TIMEOUT: Duration = Duration::from_secs(30);
const COMMAND_MAX_TOKENS: u32 = 300;
const CHAT_MAX_TOKENS: u32 = 500;
/// Pinned low for deterministic command parsing.
const TEMPERATURE: f64 = 0.1;

const DEFAULT_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("oracle credential not configured")]
    NotConfigured,
    #[error("oracle transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("oracle returned no completion")]
    EmptyCompletion,
}

#[derive(Clone)]
pub struct OracleClient {
    http: reqwest::Client,
    api_key: Option<String>,
    api_url: String,
    model: String,
}

impl OracleClient {
    pub fn new(api_key: Option<String>, api_url: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            api_url,
            model,
        }
    }

    /// Whether a credential is present. Health reporting only; the chat
    /// paths handle the missing-credential case themselves.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Build from `ORACLE_API_KEY` / `ORACLE_API_URL` / `ORACLE_MODEL`.
    /// A missing key is a soft degradation, never a startup failure.
    pub fn from_env() -> Self {
        let api_key = std::env::var("ORACLE_API_KEY").ok().filter(|k| !k.is_empty());
        if api_key.is_none() {
            tracing::warn!("ORACLE_API_KEY not set; chat commands will report the assistant as not configured");
        }
        let api_url = std::env::var("ORACLE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let model = std::env::var("ORACLE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        Self::new(api_key, api_url, model)
    }

    /// Interpret one free-text command. Always returns an object with an
    /// `action` field.
    pub async fn interpret(&self, system_prompt: &str, message: &str) -> Value {
        let Some(api_key) = &self.api_key else {
            return json!({"action": "unknown", "message": "AI assistant not configured"});
        };

        match self.request_command(api_key, system_prompt, message).await {
            Ok(content) => extract_intent(&content, message),
            Err(err) => {
                tracing::warn!(error = %err, "oracle command call failed");
                json!({"action": "unknown", "message": "AI service unavailable"})
            }
        }
    }

    async fn request_command(
        &self,
        api_key: &str,
        system_prompt: &str,
        message: &str,
    ) -> Result<String, OracleError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system",
                    content: system_prompt.to_string(),
                },
                Message {
                    role: "user",
                    content: message.to_string(),
                },
            ],
            temperature: Some(TEMPERATURE),
            max_tokens: Some(COMMAND_MAX_TOKENS),
            max_completion_tokens: None,
            response_format: Some(ResponseFormat { kind: "json_object" }),
        };

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(api_key)
            .timeout(COMMAND_TIMEOUT)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let completion: CompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(OracleError::EmptyCompletion)
    }

    /// Free-form assistant chat. Unlike command parsing this surfaces the
    /// error; the route decides how to report it.
    pub async fn chat(&self, system_prompt: &str, message: &str) -> Result<String, OracleError> {
        let api_key = self.api_key.as_ref().ok_or(OracleError::NotConfigured)?;

        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system",
                    content: system_prompt.to_string(),
                },
                Message {
                    role: "user",
                    content: message.to_string(),
                },
            ],
            temperature: None,
            max_tokens: None,
            max_completion_tokens: Some(CHAT_MAX_TOKENS),
            response_format: None,
        };

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(api_key)
            .timeout(CHAT_TIMEOUT)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let completion: CompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(OracleError::EmptyCompletion)
    }
}

fn action_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""action"\s*:\s*"([^"]+)""#).unwrap())
}

/// Decode a completion into an intent object. Falls back to a regex scan
/// for the action field when the completion is not valid JSON, and to a
/// bare `unknown` after that.
pub(crate) fn extract_intent(content: &str, original_message: &str) -> Value {
    if let Ok(Value::Object(mut obj)) = serde_json::from_str::<Value>(content) {
        obj.entry("action".to_string())
            .or_insert_with(|| Value::String("unknown".to_string()));
        return Value::Object(obj);
    }

    if let Some(caps) = action_pattern().captures(content) {
        return json!({"action": caps[1].to_string(), "original": original_message});
    }

    json!({"action": "unknown", "message": "Could not parse command"})
}

// OpenAI-compatible chat-completion wire format.

#[derive(Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_json_object_passes_through() {
        let intent = extract_intent(r#"{"action": "add", "task_name": "buy milk"}"#, "add buy milk");
        assert_eq!(intent["action"], "add");
        assert_eq!(intent["task_name"], "buy milk");
    }

    #[test]
    fn object_without_action_gets_unknown() {
        let intent = extract_intent(r#"{"task_name": "buy milk"}"#, "add buy milk");
        assert_eq!(intent["action"], "unknown");
        assert_eq!(intent["task_name"], "buy milk");
    }

    #[test]
    fn regex_fallback_recovers_action_from_malformed_json() {
        let content = r#"Sure! Here is the parse: {"action": "complete", "task_identifier": 5,}"#;
        let intent = extract_intent(content, "complete task 5");
        assert_eq!(intent["action"], "complete");
        assert_eq!(intent["original"], "complete task 5");
    }

    #[test]
    fn garbage_yields_unknown() {
        let intent = extract_intent("I cannot help with that.", "do something");
        assert_eq!(intent["action"], "unknown");
        assert_eq!(intent["message"], "Could not parse command");
    }

    #[test]
    fn non_object_json_falls_back() {
        let intent = extract_intent(r#""just a string""#, "hello");
        assert_eq!(intent["action"], "unknown");
    }

    #[test]
    fn reports_credential_configuration() {
        let unconfigured = OracleClient::new(None, "url".into(), "model".into());
        assert!(!unconfigured.is_configured());
        let configured = OracleClient::new(Some("key".into()), "url".into(), "model".into());
        assert!(configured.is_configured());
    }

    #[tokio::test]
    async fn missing_credential_degrades_without_a_network_call() {
        let client = OracleClient::new(None, "http://127.0.0.1:1".into(), "test".into());
        let intent = client.interpret("prompt", "add buy milk").await;
        assert_eq!(intent["action"], "unknown");
        assert_eq!(intent["message"], "AI assistant not configured");
    }

    #[tokio::test]
    async fn transport_failure_degrades_to_service_unavailable() {
        // Nothing listens on this port; the connect fails fast.
        let client = OracleClient::new(
            Some("test-key".into()),
            "http://127.0.0.1:1/v1/chat/completions".into(),
            "test".into(),
        );
        let intent = client.interpret("prompt", "add buy milk").await;
        assert_eq!(intent["action"], "unknown");
        assert_eq!(intent["message"], "AI service unavailable");
    }
}
