//! The factory service shared by every surface.
//!
//! [`Factory`] owns the clients and the in-memory state (conversations,
//! created apps, bot status) and is passed around in an `Arc`. The app
//! pipeline is linear: generate, publish, deploy, register.

use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::{broadcast, RwLock};
use tracing::{info, warn};

use appfactory_models::{slugify, AppRecord, BotStatus, ConversationEntry, ServerEvent};

use crate::cleanup::{cleanup, CleanupSummary};
use crate::config::FactoryConfig;
use crate::conversation::ConversationLog;
use crate::deployer::{Deployment, RenderDeployer};
use crate::error::{CoreError, PublishError, Result};
use crate::generator::{CodeGenerator, GenerationSource};
use crate::github::{FileFailure, GitHubClient};
use crate::registry::AppRegistry;
use crate::relay::{ChatRelay, ChatReply};

/// Capacity of the event channel to web clients.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Everything produced by one app request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedApp {
    pub record: AppRecord,
    /// Link to the app page on this server.
    pub link: String,
    pub source: GenerationSource,
    /// Files written to the repository.
    pub files: Vec<String>,
    pub failed_files: Vec<FileFailure>,
    pub deployment: Deployment,
}

/// The app factory service.
pub struct Factory {
    config: FactoryConfig,
    generator: CodeGenerator,
    github: GitHubClient,
    deployer: RenderDeployer,
    relay: ChatRelay,
    conversations: ConversationLog,
    registry: AppRegistry,
    events: broadcast::Sender<ServerEvent>,
    bot_status: RwLock<BotStatus>,
    started_at: Instant,
}

impl Factory {
    /// Builds the factory and its clients from configuration.
    pub fn new(config: FactoryConfig) -> Self {
        let generator = CodeGenerator::from_config(&config);
        Self::with_generator(config, generator)
    }

    /// Builds the factory with an explicit code generator.
    pub fn with_generator(config: FactoryConfig, generator: CodeGenerator) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            github: GitHubClient::from_settings(&config.github),
            deployer: RenderDeployer::from_settings(&config.render),
            relay: ChatRelay::from_settings(&config.chat),
            generator,
            conversations: ConversationLog::new(),
            registry: AppRegistry::new(),
            events,
            bot_status: RwLock::new(BotStatus::NotConfigured),
            started_at: Instant::now(),
            config,
        }
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    pub fn generator(&self) -> &CodeGenerator {
        &self.generator
    }

    pub fn deployer(&self) -> &RenderDeployer {
        &self.deployer
    }

    pub fn relay(&self) -> &ChatRelay {
        &self.relay
    }

    pub fn registry(&self) -> &AppRegistry {
        &self.registry
    }

    pub fn conversations(&self) -> &ConversationLog {
        &self.conversations
    }

    /// Time since the factory was built.
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Runs the full pipeline for one app request.
    ///
    /// Missing GitHub credentials are reported before anything is
    /// generated or sent.
    pub async fn create_app(&self, app_name: &str, caller_id: &str) -> Result<CreatedApp> {
        let app_name = app_name.trim();
        if app_name.is_empty() {
            return Err(CoreError::EmptyAppName);
        }
        if !self.github.is_configured() {
            return Err(PublishError::MissingCredentials.into());
        }

        info!(app = %app_name, caller = %caller_id, "Creating app");

        let outcome = self.generator.generate(app_name).await;
        let report = self.github.publish(app_name, caller_id, &outcome.app).await?;
        let deployment = self.deployer.deploy(&report.repo.html_url, app_name).await;

        let record = self
            .registry
            .register(AppRecord::new(
                app_name,
                slugify(app_name),
                report.repo.full_name.clone(),
                report.repo.html_url.clone(),
                deployment.url.clone(),
                deployment.mock,
            ))
            .await;

        info!(
            app = %app_name,
            slug = %record.slug,
            url = %record.deployed_url,
            mock = record.deploy_mock,
            "App created"
        );

        Ok(CreatedApp {
            link: self.app_link(&record.slug),
            record,
            source: outcome.source,
            files: report.written,
            failed_files: report.failed,
            deployment,
        })
    }

    /// Relays a chat message and records the turn when a conversation id
    /// is given.
    pub async fn chat(&self, message: &str, conversation_id: Option<&str>) -> ChatReply {
        let reply = self.relay.send(message, conversation_id).await;
        if let Some(id) = conversation_id {
            self.conversations
                .append_turn(id, message, reply.content.clone())
                .await;
        }
        reply
    }

    /// Entries of a conversation in append order.
    pub async fn conversation_history(&self, conversation_id: &str) -> Vec<ConversationEntry> {
        self.conversations.history(conversation_id).await
    }

    /// Deletes the given repositories, or every registered app's repository
    /// when `repos` is `None`. Registry records of deleted (or already
    /// missing) repositories are removed.
    pub async fn cleanup(&self, repos: Option<Vec<String>>) -> Result<CleanupSummary> {
        let repos = match repos {
            Some(repos) => repos,
            None => self
                .registry
                .list()
                .await
                .into_iter()
                .map(|r| r.repo_full_name)
                .collect(),
        };

        let summary = cleanup(&self.github, &repos, self.config.cleanup_delay).await?;
        for repo in summary.deleted.iter().chain(&summary.not_found) {
            self.registry.remove_by_repo(repo).await;
        }
        Ok(summary)
    }

    /// Subscribes to events for web clients.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.events.subscribe()
    }

    /// Sends an event to every subscribed web client.
    pub fn broadcast(&self, event: ServerEvent) {
        // No subscribers is not an error.
        if self.events.send(event).is_err() {
            tracing::trace!("No web clients subscribed");
        }
    }

    pub async fn set_bot_status(&self, status: BotStatus) {
        let mut current = self.bot_status.write().await;
        if *current != status {
            info!(from = current.label(), to = status.label(), "Bot status changed");
            *current = status;
        }
    }

    pub async fn bot_status(&self) -> BotStatus {
        *self.bot_status.read().await
    }

    /// Public link to an app page.
    pub fn app_link(&self, slug: &str) -> String {
        format!("{}/app/{}", self.config.public_base_url, slug)
    }

    /// Logs a summary of which integrations are live.
    pub fn log_integrations(&self) {
        let providers = self.generator.provider_names();
        if providers.is_empty() {
            warn!("No AI provider configured, apps will use static templates");
        } else {
            info!(providers = ?providers, "AI providers configured");
        }
        if !self.github.is_configured() {
            warn!("GitHub not configured, app creation is disabled");
        }
        if !self.deployer.is_configured() {
            info!("Render not configured, deployments will be mocked");
        }
        if !self.relay.is_configured() {
            info!("Chat API not configured, replies will be mocked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{FallbackReason, TemplateKind};
    use appfactory_models::TelegramRelayMessage;
    use chrono::Utc;
    use mockito::Matcher;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, String)]) -> FactoryConfig {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        let mut config = FactoryConfig::from_lookup(|k| map.get(k).cloned());
        config.cleanup_delay = Duration::ZERO;
        config
    }

    fn github_config(server: &mockito::Server) -> FactoryConfig {
        config(&[
            ("GITHUB_TOKEN", "ghp".to_string()),
            ("GITHUB_USERNAME", "octo".to_string()),
            ("GITHUB_API_URL", server.url()),
        ])
    }

    async fn mock_github(server: &mut mockito::Server) {
        server
            .mock("POST", "/user/repos")
            .with_status(201)
            .with_body(
                r#"{"name":"todo-list-42-1","full_name":"octo/todo-list-42-1","html_url":"https://github.com/octo/todo-list-42-1"}"#,
            )
            .create_async()
            .await;
        server
            .mock("PUT", Matcher::Regex("^/repos/octo/todo-list-42-1/contents/".to_string()))
            .with_status(201)
            .expect(5)
            .create_async()
            .await;
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let factory = Factory::new(FactoryConfig::default());
        let err = factory.create_app("   ", "1").await.unwrap_err();
        assert!(matches!(err, CoreError::EmptyAppName));
    }

    #[tokio::test]
    async fn test_missing_github_credentials_before_network() {
        let mut server = mockito::Server::new_async().await;
        let never = server.mock("POST", Matcher::Any).expect(0).create_async().await;

        let factory = Factory::new(config(&[("GITHUB_API_URL", server.url())]));
        let err = factory.create_app("todo list", "42").await.unwrap_err();

        assert!(err.is_missing_credentials());
        assert!(factory.registry().is_empty().await);
        never.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_app_without_ai_or_render() {
        let mut server = mockito::Server::new_async().await;
        mock_github(&mut server).await;

        let factory = Factory::new(github_config(&server));
        let created = factory.create_app("todo list", "42").await.unwrap();

        assert_eq!(
            created.source,
            GenerationSource::Template {
                template: TemplateKind::TodoList,
                reason: FallbackReason::NoProviders,
                notes: None,
            }
        );
        assert!(created.deployment.mock);
        assert!(created.record.deployed_url.ends_with("-demo.onrender.com"));
        assert_eq!(created.record.repo_url, "https://github.com/octo/todo-list-42-1");
        assert_eq!(created.files.len(), 5);
        assert_eq!(created.link, "http://localhost:3001/app/todo-list");
        assert_eq!(factory.registry().len().await, 1);
    }

    #[tokio::test]
    async fn test_chat_records_turns() {
        let factory = Factory::new(FactoryConfig::default());
        factory.chat("one", Some("web_1")).await;
        factory.chat("two", Some("web_1")).await;
        let reply = factory.chat("untracked", None).await;

        assert!(reply.mock);
        let history = factory.conversation_history("web_1").await;
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].text, "one");
        assert_eq!(history[2].text, "two");
        assert_eq!(factory.conversations().len().await, 1);
    }

    #[tokio::test]
    async fn test_slow_reply_keeps_history_chronological() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .match_body(Matcher::PartialJson(serde_json::json!({"message": "first"})))
            .with_status(200)
            .with_chunked_body(|w| {
                use std::io::Write;
                std::thread::sleep(std::time::Duration::from_millis(300));
                w.write_all(br#"{"id":"r0","choices":[{"message":{"content":"reply0"}}]}"#)
            })
            .create_async()
            .await;
        server
            .mock("POST", "/v1/chat/completions")
            .match_body(Matcher::PartialJson(serde_json::json!({"message": "second"})))
            .with_status(200)
            .with_body(r#"{"id":"r1","choices":[{"message":{"content":"reply1"}}]}"#)
            .create_async()
            .await;

        let factory = Factory::new(config(&[
            ("CHAT_API_KEY", "ck".to_string()),
            ("CHAT_API_URL", server.url()),
        ]));
        tokio::join!(factory.chat("first", Some("web_7")), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            factory.chat("second", Some("web_7")).await
        });

        let history = factory.conversation_history("web_7").await;
        let texts: Vec<&str> = history.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["second", "reply1", "first", "reply0"]);
        for window in history.windows(2) {
            assert!(window[0].timestamp <= window[1].timestamp);
        }
    }

    #[tokio::test]
    async fn test_cleanup_registered_apps() {
        let mut server = mockito::Server::new_async().await;
        mock_github(&mut server).await;
        let delete = server
            .mock("DELETE", "/repos/octo/todo-list-42-1")
            .with_status(204)
            .expect(1)
            .create_async()
            .await;

        let factory = Factory::new(github_config(&server));
        factory.create_app("todo list", "42").await.unwrap();
        let summary = factory.cleanup(None).await.unwrap();

        delete.assert_async().await;
        assert_eq!(summary.deleted, vec!["octo/todo-list-42-1"]);
        assert!(factory.registry().is_empty().await);
    }

    #[tokio::test]
    async fn test_cleanup_requires_credentials() {
        let factory = Factory::new(FactoryConfig::default());
        let err = factory.cleanup(Some(vec!["x".into()])).await.unwrap_err();
        assert!(err.is_missing_credentials());
    }

    #[tokio::test]
    async fn test_broadcast_reaches_subscribers() {
        let factory = Factory::new(FactoryConfig::default());
        factory.broadcast(ServerEvent::Error {
            message: "dropped".into(),
        });

        let mut rx = factory.subscribe();
        factory.broadcast(ServerEvent::TelegramMessage(TelegramRelayMessage {
            id: 1,
            chat_id: 2,
            user_id: 3,
            username: "u".into(),
            text: "t".into(),
            response: "r".into(),
            timestamp: Utc::now(),
        }));

        assert!(matches!(rx.recv().await.unwrap(), ServerEvent::TelegramMessage(_)));
    }

    #[tokio::test]
    async fn test_bot_status() {
        let factory = Factory::new(FactoryConfig::default());
        assert_eq!(factory.bot_status().await, BotStatus::NotConfigured);
        factory.set_bot_status(BotStatus::BackingOff { attempt: 1 }).await;
        assert_eq!(factory.bot_status().await.label(), "reconnecting");
    }
}
