//! Render deployment requests.
//!
//! [`RenderDeployer::deploy`] always yields a URL. Without an API key, or
//! when Render rejects the request, it returns a placeholder URL flagged
//! as mock.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use appfactory_models::slugify;

use crate::config::RenderSettings;
use crate::http::http_client;

const MOCK_NOTE: &str = "Mock deployment URL - Configure RENDER_API_KEY for real deployment";

/// A deployment result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    /// Live (or placeholder) URL of the app.
    pub url: String,
    /// True when `url` is a placeholder.
    pub mock: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Deployment {
    /// The placeholder deployment for an app name.
    pub fn mock(app_name: &str) -> Self {
        Self {
            url: format!("https://{}-demo.onrender.com", slugify(app_name)),
            mock: true,
            service_id: None,
            service_name: None,
            note: Some(MOCK_NOTE.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreateServiceResponse {
    service: Service,
}

#[derive(Debug, Deserialize)]
struct Service {
    id: String,
    slug: String,
    #[serde(default)]
    name: Option<String>,
}

/// Client for the Render services API.
#[derive(Clone)]
pub struct RenderDeployer {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    owner_id: Option<String>,
}

impl RenderDeployer {
    pub fn new(
        client: reqwest::Client,
        api_url: impl Into<String>,
        api_key: Option<String>,
        owner_id: Option<String>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            api_key,
            owner_id,
        }
    }

    pub fn from_settings(settings: &RenderSettings) -> Self {
        Self::new(
            http_client(None),
            settings.api_url.clone(),
            settings.api_key.clone(),
            settings.owner_id.clone(),
        )
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Requests a web service for `repo_url`.
    pub async fn deploy(&self, repo_url: &str, app_name: &str) -> Deployment {
        let Some(api_key) = self.api_key.as_deref() else {
            info!(app = %app_name, "Render not configured, using mock deployment");
            return Deployment::mock(app_name);
        };

        match self.create_service(api_key, repo_url, app_name).await {
            Ok(deployment) => {
                info!(app = %app_name, url = %deployment.url, "Render service created");
                deployment
            }
            Err(e) => {
                warn!(app = %app_name, error = %e, "Render deployment failed, using mock deployment");
                Deployment::mock(app_name)
            }
        }
    }

    async fn create_service(
        &self,
        api_key: &str,
        repo_url: &str,
        app_name: &str,
    ) -> Result<Deployment, String> {
        let mut body = json!({
            "type": "web_service",
            "name": format!("{}-{}", slugify(app_name), Utc::now().timestamp_millis()),
            "repo": repo_url,
            "branch": "main",
            "buildCommand": "npm install && npm run build",
            "startCommand": "npx serve -s build -l 3000",
            "plan": "starter",
            "region": "oregon",
            "envVars": [{"key": "NODE_ENV", "value": "production"}]
        });
        if let (Some(owner), Value::Object(map)) = (&self.owner_id, &mut body) {
            map.insert("ownerId".to_string(), Value::String(owner.clone()));
        }

        let response = self
            .client
            .post(format!("{}/v1/services", self.api_url.trim_end_matches('/')))
            .bearer_auth(api_key)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(format!("Render API error {}: {}", status.as_u16(), text));
        }

        let created: CreateServiceResponse = response.json().await.map_err(|e| e.to_string())?;
        Ok(Deployment {
            url: format!("https://{}.onrender.com", created.service.slug),
            mock: false,
            service_id: Some(created.service.id),
            service_name: created.service.name,
            note: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn deployer(server: &mockito::Server, key: Option<&str>) -> RenderDeployer {
        RenderDeployer::new(
            reqwest::Client::new(),
            server.url(),
            key.map(String::from),
            Some("own-1".to_string()),
        )
    }

    #[tokio::test]
    async fn test_no_key_is_mock() {
        let mut server = mockito::Server::new_async().await;
        let never = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let deployment = deployer(&server, None)
            .deploy("https://github.com/octo/todo", "Todo List")
            .await;

        assert!(deployment.mock);
        assert_eq!(deployment.url, "https://todo-list-demo.onrender.com");
        assert!(deployment.note.is_some());
        never.assert_async().await;
    }

    #[tokio::test]
    async fn test_real_deployment() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/services")
            .match_header("authorization", "Bearer rnd_test")
            .match_body(Matcher::PartialJson(json!({
                "type": "web_service",
                "repo": "https://github.com/octo/todo",
                "branch": "main",
                "plan": "starter",
                "ownerId": "own-1"
            })))
            .with_status(201)
            .with_body(r#"{"service":{"id":"srv-1","slug":"todo-abc","name":"todo-123"}}"#)
            .create_async()
            .await;

        let deployment = deployer(&server, Some("rnd_test"))
            .deploy("https://github.com/octo/todo", "todo")
            .await;

        mock.assert_async().await;
        assert!(!deployment.mock);
        assert_eq!(deployment.url, "https://todo-abc.onrender.com");
        assert_eq!(deployment.service_id.as_deref(), Some("srv-1"));
    }

    #[tokio::test]
    async fn test_api_error_falls_back_to_mock() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/services")
            .with_status(401)
            .with_body("unauthorized")
            .create_async()
            .await;

        let deployment = deployer(&server, Some("bad")).deploy("r", "blog").await;

        assert!(deployment.mock);
        assert_eq!(deployment.url, "https://blog-demo.onrender.com");
    }
}
