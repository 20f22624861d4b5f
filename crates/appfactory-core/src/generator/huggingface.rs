//! HuggingFace inference API provider.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::provider::{status_error, CodeProvider, ProviderError};
use crate::config::HuggingFaceSettings;

const MAX_NEW_TOKENS: u32 = 2048;

/// Text-generation client for a hosted HuggingFace model.
pub struct HuggingFaceProvider {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl HuggingFaceProvider {
    /// Creates a provider for `{api_url}/models/{model}`.
    pub fn new(
        client: reqwest::Client,
        api_key: impl Into<String>,
        model: &str,
        api_url: &str,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            endpoint: format!("{}/models/{}", api_url.trim_end_matches('/'), model),
        }
    }

    /// Creates a provider from settings, or `None` without an API key.
    pub fn from_settings(client: reqwest::Client, settings: &HuggingFaceSettings) -> Option<Self> {
        let key = settings.api_key.as_ref()?;
        Some(Self::new(client, key, &settings.model, &settings.api_url))
    }
}

/// The inference API answers with either a list or a single object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GenerationResponse {
    Many(Vec<Generation>),
    One(Generation),
}

#[derive(Debug, Deserialize)]
struct Generation {
    generated_text: String,
}

#[async_trait]
impl CodeProvider for HuggingFaceProvider {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = json!({
            "inputs": prompt,
            "parameters": {
                "max_new_tokens": MAX_NEW_TOKENS,
                "return_full_text": false,
                "temperature": 0.7
            }
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let parsed: GenerationResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let text = match parsed {
            GenerationResponse::Many(list) => list
                .into_iter()
                .next()
                .map(|g| g.generated_text)
                .ok_or_else(|| ProviderError::Parse("empty generation list".to_string()))?,
            GenerationResponse::One(g) => g.generated_text,
        };

        debug!(endpoint = %self.endpoint, chars = text.len(), "HuggingFace completion received");
        Ok(text)
    }
}
