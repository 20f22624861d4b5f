//! Chat relay to a chat-completion API.
//!
//! Every call produces a reply: if the API is not configured or the call
//! fails, a local mock reply is synthesized.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use appfactory_models::CursorResponse;

use crate::config::ChatSettings;
use crate::http::http_client;

const RELAY_MODEL: &str = "cursor-ai";
const MOCK_MODEL: &str = "mock-cursor-ai";

/// A reply from the chat relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// True when the reply was synthesized locally.
    pub mock: bool,
    pub metadata: Value,
}

impl ChatReply {
    /// The locally synthesized reply to `message`.
    pub fn mock(message: &str) -> Self {
        let now = Utc::now();
        Self {
            id: format!("mock_{}", now.timestamp_millis()),
            content: format!(
                "I received your message: \"{}\". This is a mock response from Cursor AI. \
                 In a real implementation, this would be processed by the actual Cursor API.",
                message
            ),
            timestamp: now,
            mock: true,
            metadata: json!({
                "model": MOCK_MODEL,
                "usage": {"prompt_tokens": message.len(), "completion_tokens": 50}
            }),
        }
    }
}

impl From<&ChatReply> for CursorResponse {
    fn from(reply: &ChatReply) -> Self {
        CursorResponse {
            id: reply.id.clone(),
            content: reply.content.clone(),
            timestamp: reply.timestamp,
            metadata: reply.metadata.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    message: &'a str,
    conversation_id: Option<&'a str>,
    model: &'a str,
    stream: bool,
}

/// Client for the chat-completion relay endpoint.
#[derive(Clone)]
pub struct ChatRelay {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl ChatRelay {
    pub fn new(client: reqwest::Client, api_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint: format!("{}/v1/chat/completions", api_url.trim_end_matches('/')),
            api_key,
        }
    }

    pub fn from_settings(settings: &ChatSettings) -> Self {
        Self::new(http_client(None), &settings.api_url, settings.api_key.clone())
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Sends `message` and returns the reply, falling back to a mock.
    pub async fn send(&self, message: &str, conversation_id: Option<&str>) -> ChatReply {
        let Some(api_key) = self.api_key.as_deref() else {
            return ChatReply::mock(message);
        };

        match self.request(api_key, message, conversation_id).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Chat API call failed, using mock reply");
                ChatReply::mock(message)
            }
        }
    }

    async fn request(
        &self,
        api_key: &str,
        message: &str,
        conversation_id: Option<&str>,
    ) -> Result<ChatReply, String> {
        let body = RelayRequest {
            message,
            conversation_id,
            model: RELAY_MODEL,
            stream: false,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(format!("chat API error {}: {}", status.as_u16(), text));
        }

        let payload: Value = response.json().await.map_err(|e| e.to_string())?;
        let content = payload
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .ok_or_else(|| "response has no choices[0].message.content".to_string())?
            .to_string();
        let id = payload
            .get("id")
            .and_then(Value::as_str)
            .map(String::from)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        debug!(id = %id, "Chat reply received");
        Ok(ChatReply {
            id,
            content,
            timestamp: Utc::now(),
            mock: false,
            metadata: payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_unconfigured_is_mock() {
        let relay = ChatRelay::new(reqwest::Client::new(), "http://unused", None);
        let reply = relay.send("hello", Some("web_1")).await;

        assert!(reply.mock);
        assert!(reply.id.starts_with("mock_"));
        assert!(reply.content.starts_with("I received your message: \"hello\"."));
        assert_eq!(reply.metadata["model"], "mock-cursor-ai");
        assert_eq!(reply.metadata["usage"]["prompt_tokens"], 5);
        assert_eq!(reply.metadata["usage"]["completion_tokens"], 50);
    }

    #[tokio::test]
    async fn test_relay_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer ck")
            .match_body(Matcher::Json(json!({
                "message": "hi",
                "conversation_id": "telegram_5",
                "model": "cursor-ai",
                "stream": false
            })))
            .with_status(200)
            .with_body(r#"{"id":"r1","choices":[{"message":{"content":"hello back"}}]}"#)
            .create_async()
            .await;

        let relay = ChatRelay::new(reqwest::Client::new(), &server.url(), Some("ck".into()));
        let reply = relay.send("hi", Some("telegram_5")).await;

        mock.assert_async().await;
        assert!(!reply.mock);
        assert_eq!(reply.id, "r1");
        assert_eq!(reply.content, "hello back");
        assert_eq!(reply.metadata["id"], "r1");
    }

    #[tokio::test]
    async fn test_malformed_payload_is_mock() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let relay = ChatRelay::new(reqwest::Client::new(), &server.url(), Some("ck".into()));
        assert!(relay.send("hi", None).await.mock);
    }

    #[tokio::test]
    async fn test_server_error_is_mock() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(502)
            .create_async()
            .await;

        let relay = ChatRelay::new(reqwest::Client::new(), &server.url(), Some("ck".into()));
        let reply = relay.send("ping", None).await;
        assert!(reply.mock);
        assert!(reply.content.contains("\"ping\""));
    }

    #[test]
    fn test_cursor_response_conversion() {
        let reply = ChatReply::mock("x");
        let event: CursorResponse = (&reply).into();
        assert_eq!(event.id, reply.id);
        assert_eq!(event.content, reply.content);
    }
}
