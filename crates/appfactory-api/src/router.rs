//! Router configuration and server setup.

use std::future::Future;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::ApiConfig;
use crate::handlers;
use crate::state::AppState;
use crate::ws::ws_handler;

/// Creates the API router with all routes configured.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status
        .route("/api/health", get(handlers::health))
        .route("/api/status", get(handlers::status))
        // Chat
        .route("/api/send-message", post(handlers::send_message))
        .route("/ws", get(ws_handler))
        // Apps
        .route("/api/create-app", post(handlers::create_app))
        .route("/api/cleanup", post(handlers::cleanup))
        .route("/apps", get(handlers::list_apps))
        .route("/app/:slug", get(handlers::app_page))
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state)
}

/// Starts the API server and runs until `shutdown` resolves.
pub async fn serve<F>(config: ApiConfig, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use appfactory_core::{Factory, FactoryConfig};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use mockito::Matcher;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn make_state(config: FactoryConfig) -> AppState {
        AppState::new(ApiConfig::default(), Arc::new(Factory::new(config)))
    }

    fn make_server(config: FactoryConfig) -> TestServer {
        TestServer::new(create_router(make_state(config))).unwrap()
    }

    fn github_config(url: String) -> FactoryConfig {
        let vars: HashMap<&str, String> = [
            ("GITHUB_TOKEN", "ghp".to_string()),
            ("GITHUB_USERNAME", "octo".to_string()),
            ("GITHUB_API_URL", url),
        ]
        .into_iter()
        .collect();
        let mut config = FactoryConfig::from_lookup(|k| vars.get(k).cloned());
        config.cleanup_delay = std::time::Duration::ZERO;
        config
    }

    async fn mock_github(server: &mut mockito::Server) {
        server
            .mock("POST", "/user/repos")
            .with_status(201)
            .with_body(
                r#"{"name":"blog-7-1","full_name":"octo/blog-7-1","html_url":"https://github.com/octo/blog-7-1"}"#,
            )
            .create_async()
            .await;
        server
            .mock("PUT", Matcher::Regex("^/repos/octo/blog-7-1/contents/".to_string()))
            .with_status(201)
            .create_async()
            .await;
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let server = make_server(FactoryConfig::default());

        let response = server.get("/api/health").await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert!(!body["version"].as_str().unwrap().is_empty());
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let server = make_server(FactoryConfig::default());

        let response = server.get("/api/status").await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], "running");
        assert_eq!(body["telegram_bot"], "not_configured");
        assert_eq!(body["cursor_api"], "mock_mode");
        assert_eq!(body["active_connections"], 0);
        assert_eq!(body["conversations"], 0);
    }

    #[tokio::test]
    async fn test_send_message_requires_message() {
        let server = make_server(FactoryConfig::default());

        let response = server.post("/api/send-message").json(&json!({})).await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Message is required");
    }

    #[tokio::test]
    async fn test_send_message_mock_reply() {
        let server = make_server(FactoryConfig::default());

        let response = server
            .post("/api/send-message")
            .json(&json!({"message": "hello", "conversationId": "web_9"}))
            .await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["response"]["mock"], true);
        assert!(body["response"]["content"]
            .as_str()
            .unwrap()
            .starts_with("I received your message: \"hello\""));

        let status: serde_json::Value = server.get("/api/status").await.json();
        assert_eq!(status["conversations"], 1);
    }

    #[tokio::test]
    async fn test_create_app_requires_name() {
        let server = make_server(FactoryConfig::default());

        let response = server
            .post("/api/create-app")
            .json(&json!({"appName": "  "}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_app_without_github_is_precondition_failed() {
        let server = make_server(FactoryConfig::default());

        let response = server
            .post("/api/create-app")
            .json(&json!({"appName": "todo list", "userId": 1}))
            .await;
        response.assert_status(StatusCode::PRECONDITION_FAILED);

        let body: serde_json::Value = response.json();
        assert!(body["error"].as_str().unwrap().contains("GITHUB_TOKEN"));
    }

    #[tokio::test]
    async fn test_create_app_upstream_failure_is_bad_gateway() {
        let mut github = mockito::Server::new_async().await;
        github
            .mock("POST", "/user/repos")
            .with_status(401)
            .with_body("Bad credentials")
            .create_async()
            .await;

        let server = make_server(github_config(github.url()));
        let response = server
            .post("/api/create-app")
            .json(&json!({"appName": "blog", "userId": 7}))
            .await;
        response.assert_status(StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_create_list_and_view_app() {
        let mut github = mockito::Server::new_async().await;
        mock_github(&mut github).await;

        let server = make_server(github_config(github.url()));
        let response = server
            .post("/api/create-app")
            .json(&json!({"appName": "blog", "userId": 7}))
            .await;
        response.assert_status(StatusCode::CREATED);

        let created: serde_json::Value = response.json();
        assert_eq!(created["record"]["slug"], "blog");
        assert_eq!(created["deployment"]["mock"], true);
        assert_eq!(created["source"]["kind"], "template");
        assert_eq!(created["record"]["deployedUrl"], "https://blog-demo.onrender.com");

        let list: serde_json::Value = server.get("/apps").await.json();
        assert_eq!(list["total"], 1);
        assert_eq!(list["apps"][0]["slug"], "blog");
        assert_eq!(list["apps"][0]["link"], "http://localhost:3001/app/blog");

        let page = server.get("/app/blog").await;
        page.assert_status_ok();
        assert!(page.text().contains("https://github.com/octo/blog-7-1"));
    }

    #[tokio::test]
    async fn test_unknown_app_page() {
        let server = make_server(FactoryConfig::default());

        let response = server.get("/app/nope").await;
        response.assert_status(StatusCode::NOT_FOUND);

        let body: serde_json::Value = response.json();
        assert!(body["error"].as_str().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn test_cleanup_endpoint() {
        let mut github = mockito::Server::new_async().await;
        github
            .mock("DELETE", "/repos/octo/old-1")
            .with_status(204)
            .create_async()
            .await;
        github
            .mock("DELETE", "/repos/octo/old-2")
            .with_status(404)
            .create_async()
            .await;

        let server = make_server(github_config(github.url()));
        let response = server
            .post("/api/cleanup")
            .json(&json!({"repos": ["old-1", "octo/old-2"]}))
            .await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        assert_eq!(body["deleted"], json!(["octo/old-1"]));
        assert_eq!(body["notFound"], json!(["octo/old-2"]));
    }

    #[tokio::test]
    async fn test_cleanup_without_credentials() {
        let server = make_server(FactoryConfig::default());
        let response = server.post("/api/cleanup").json(&json!({})).await;
        response.assert_status(StatusCode::PRECONDITION_FAILED);
    }

    #[tokio::test]
    async fn test_cors_headers() {
        let server = make_server(FactoryConfig::default());

        let response = server.get("/api/health").await;

        assert!(response.headers().contains_key("access-control-allow-origin"));
    }
}
