//! OpenAI chat completions provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::provider::{status_error, CodeProvider, ProviderError};
use crate::config::OpenAiSettings;

const MAX_TOKENS: u32 = 4000;
const TEMPERATURE: f32 = 0.7;

/// Chat completions client used for code generation.
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenAiProvider {
    /// Creates a provider for `{api_url}/v1/chat/completions`.
    pub fn new(
        client: reqwest::Client,
        api_key: impl Into<String>,
        model: impl Into<String>,
        api_url: &str,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            endpoint: format!("{}/v1/chat/completions", api_url.trim_end_matches('/')),
        }
    }

    /// Creates a provider from settings, or `None` without an API key.
    pub fn from_settings(client: reqwest::Client, settings: &OpenAiSettings) -> Option<Self> {
        let key = settings.api_key.as_ref()?;
        Some(Self::new(client, key, &settings.model, &settings.api_url))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl CodeProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::Parse("no choices in response".to_string()))?;

        debug!(model = %self.model, chars = content.len(), "OpenAI completion received");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_complete_sends_chat_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(json!({
                "model": "gpt-4",
                "max_tokens": 4000,
                "messages": [{"role": "user", "content": "build it"}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"{\"a.js\":\"x\"}"}}]}"#)
            .create_async()
            .await;

        let provider = OpenAiProvider::new(reqwest::Client::new(), "sk-test", "gpt-4", &server.url());
        let text = provider.complete("build it").await.unwrap();

        assert_eq!(text, r#"{"a.js":"x"}"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_status_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let provider = OpenAiProvider::new(reqwest::Client::new(), "k", "gpt-4", &server.url());
        let err = provider.complete("x").await.unwrap_err();

        assert!(matches!(err, ProviderError::Status { status: 429, .. }));
    }

    #[tokio::test]
    async fn test_complete_empty_choices() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let provider = OpenAiProvider::new(reqwest::Client::new(), "k", "gpt-4", &server.url());
        assert!(matches!(
            provider.complete("x").await,
            Err(ProviderError::Parse(_))
        ));
    }

    #[test]
    fn test_from_settings_requires_key() {
        let mut settings = crate::config::FactoryConfig::default().openai;
        assert!(OpenAiProvider::from_settings(reqwest::Client::new(), &settings).is_none());
        settings.api_key = Some("k".to_string());
        assert!(OpenAiProvider::from_settings(reqwest::Client::new(), &settings).is_some());
    }
}
