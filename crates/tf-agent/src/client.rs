//! Anthropic Messages API client.

use serde::{Deserialize, Serialize};

use tf_core::AgentError;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// Default generation budget per completion.
const MAX_TOKENS: u32 = 8192;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClaudeConfig {
    pub model: String,
    pub max_tokens: u32,
}

impl Default for ClaudeConfig {
    fn default() -> Self {
        Self {
            model: "claude-3-5-sonnet-latest".to_string(),
            max_tokens: MAX_TOKENS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// An assistant turn used to prefill the start of the reply (e.g. an
    /// opening code fence, or the beginning of a JSON object).
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [Message],
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

/// Thin HTTP wrapper around the Messages endpoint.
pub struct ClaudeClient {
    http: reqwest::Client,
    api_key: String,
    config: ClaudeConfig,
}

impl ClaudeClient {
    #[must_use]
    pub fn new(api_key: impl Into<String>, config: ClaudeConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            config,
        }
    }

    /// Build a client from `ANTHROPIC_API_KEY`.
    pub fn from_env() -> Result<Self, AgentError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| AgentError::MissingApiKey)?;
        Ok(Self::new(api_key, ClaudeConfig::default()))
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Send a conversation and return the text of the first non-empty
    /// content block.
    pub async fn complete(&self, messages: &[Message]) -> Result<String, AgentError> {
        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages,
        };

        let response = self
            .http
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|err| AgentError::Request(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Request(format!("{status}: {body}")));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|err| AgentError::Request(err.to_string()))?;

        parsed
            .content
            .into_iter()
            .map(|block| block.text)
            .find(|text| !text.is_empty())
            .ok_or(AgentError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_latest_sonnet() {
        let config = ClaudeConfig::default();
        assert_eq!(config.model, "claude-3-5-sonnet-latest");
        assert_eq!(config.max_tokens, 8192);
    }

    #[test]
    fn message_roles_serialize_lowercase() {
        let message = Message::assistant("```rust");
        let json = serde_json::to_string(&message).unwrap();
        assert!(json.contains(r#""role":"assistant""#));
    }
}
