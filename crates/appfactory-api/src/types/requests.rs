//! Request DTOs for the API.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Send message request.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    /// Message content.
    #[serde(default)]
    pub message: String,
    /// Conversation to record the turn in.
    #[serde(rename = "conversationId", default)]
    pub conversation_id: Option<String>,
}

/// Create app request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAppRequest {
    /// Requested app name.
    #[serde(rename = "appName", default)]
    pub app_name: String,
    /// Caller identifier, used in the repository name. Numbers and
    /// strings are both accepted.
    #[serde(rename = "userId", default, deserialize_with = "string_or_number")]
    pub user_id: Option<String>,
}

/// Cleanup request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CleanupRequest {
    /// Repositories to delete; all registered apps when absent.
    #[serde(default)]
    pub repos: Option<Vec<String>>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_app_user_id_forms() {
        let req: CreateAppRequest =
            serde_json::from_value(json!({"appName": "todo", "userId": 42})).unwrap();
        assert_eq!(req.user_id.as_deref(), Some("42"));

        let req: CreateAppRequest =
            serde_json::from_value(json!({"appName": "todo", "userId": "web"})).unwrap();
        assert_eq!(req.user_id.as_deref(), Some("web"));

        let req: CreateAppRequest = serde_json::from_value(json!({"appName": "todo"})).unwrap();
        assert!(req.user_id.is_none());
    }

    #[test]
    fn test_send_message_defaults() {
        let req: SendMessageRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.message.is_empty());
        assert!(req.conversation_id.is_none());
    }
}
