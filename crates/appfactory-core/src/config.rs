//! Shared configuration for App Factory.
//!
//! Two concerns live here:
//!
//! - where App Factory keeps its local files (`~/.app-factory/`), so the
//!   binary can load secrets from `~/.app-factory/config/.env.local`;
//! - [`FactoryConfig`], the credentials and endpoints read from the
//!   environment once at startup.
//!
//! # Environment Variables
//!
//! - `APP_FACTORY_STATE_DIR`: Override the base state directory
//! - `TELEGRAM_BOT_TOKEN`, `TELEGRAM_ADMIN_IDS`
//! - `OPENAI_API_KEY`, `OPENAI_MODEL`, `OPENAI_API_URL`
//! - `HUGGINGFACE_API_KEY`, `HUGGINGFACE_MODEL`, `HUGGINGFACE_API_URL`
//! - `GITHUB_TOKEN`, `GITHUB_USERNAME`, `GITHUB_API_URL`
//! - `RENDER_API_KEY`, `RENDER_OWNER_ID`, `RENDER_API_URL`
//! - `CHAT_API_KEY` / `CURSOR_API_KEY`, `CHAT_API_URL` / `CURSOR_API_URL`
//! - `HOST`, `PORT`, `PUBLIC_BASE_URL`, `GENERATION_TIMEOUT_SECS`

use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

/// Environment variable for custom state directory.
pub const STATE_DIR_ENV: &str = "APP_FACTORY_STATE_DIR";

/// Default state directory name under home.
const DEFAULT_STATE_DIR: &str = ".app-factory";

const CONFIG_SUBDIR: &str = "config";

pub const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4";
pub const DEFAULT_HUGGINGFACE_API_URL: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_HUGGINGFACE_MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.2";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_RENDER_API_URL: &str = "https://api.render.com";
pub const DEFAULT_CHAT_API_URL: &str = "https://api.cursor.sh";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3001;

/// Cap on a single generation request.
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 30;

/// Pause between repository deletions to stay under GitHub rate limits.
pub const DEFAULT_CLEANUP_DELAY_MS: u64 = 1000;

static STATE_DIR_CACHE: OnceLock<PathBuf> = OnceLock::new();

/// Get the App Factory state directory.
///
/// The state directory is determined by:
/// 1. `APP_FACTORY_STATE_DIR` environment variable if set
/// 2. `~/.app-factory` if home directory is available
/// 3. `.app-factory` in current directory as fallback
pub fn state_dir() -> PathBuf {
    STATE_DIR_CACHE
        .get_or_init(|| {
            std::env::var(STATE_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    dirs::home_dir()
                        .map(|h| h.join(DEFAULT_STATE_DIR))
                        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
                })
        })
        .clone()
}

/// Get the user config directory.
pub fn config_dir() -> PathBuf {
    state_dir().join(CONFIG_SUBDIR)
}

/// Get the .env.local file path.
///
/// Environment file for secrets (API keys, tokens).
pub fn env_file() -> PathBuf {
    config_dir().join(".env.local")
}

/// OpenAI chat completions settings.
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub api_url: String,
}

/// HuggingFace inference settings.
#[derive(Debug, Clone)]
pub struct HuggingFaceSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub api_url: String,
}

/// GitHub REST API settings.
#[derive(Debug, Clone)]
pub struct GitHubSettings {
    pub token: Option<String>,
    pub username: Option<String>,
    pub api_url: String,
}

/// Render hosting API settings.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub api_key: Option<String>,
    pub owner_id: Option<String>,
    pub api_url: String,
}

/// Chat-completion relay settings.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub api_key: Option<String>,
    pub api_url: String,
}

/// Runtime configuration assembled from the environment.
#[derive(Debug, Clone)]
pub struct FactoryConfig {
    pub telegram_token: Option<String>,
    /// Chat ids allowed to run `/cleanup`.
    pub telegram_admin_ids: Vec<i64>,
    pub openai: OpenAiSettings,
    pub huggingface: HuggingFaceSettings,
    pub github: GitHubSettings,
    pub render: RenderSettings,
    pub chat: ChatSettings,
    pub host: String,
    pub port: u16,
    /// Base URL used to build links back to app pages.
    pub public_base_url: String,
    pub generation_timeout: Duration,
    pub cleanup_delay: Duration,
}

impl FactoryConfig {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary lookup function.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = get("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let telegram_admin_ids = get("TELEGRAM_ADMIN_IDS")
            .map(|ids| {
                ids.split(',')
                    .filter_map(|id| id.trim().parse().ok())
                    .collect()
            })
            .unwrap_or_default();

        let generation_timeout = get("GENERATION_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_GENERATION_TIMEOUT_SECS);

        Self {
            telegram_token: get("TELEGRAM_BOT_TOKEN"),
            telegram_admin_ids,
            openai: OpenAiSettings {
                api_key: get("OPENAI_API_KEY"),
                model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
                api_url: get("OPENAI_API_URL")
                    .unwrap_or_else(|| DEFAULT_OPENAI_API_URL.to_string()),
            },
            huggingface: HuggingFaceSettings {
                api_key: get("HUGGINGFACE_API_KEY"),
                model: get("HUGGINGFACE_MODEL")
                    .unwrap_or_else(|| DEFAULT_HUGGINGFACE_MODEL.to_string()),
                api_url: get("HUGGINGFACE_API_URL")
                    .unwrap_or_else(|| DEFAULT_HUGGINGFACE_API_URL.to_string()),
            },
            github: GitHubSettings {
                token: get("GITHUB_TOKEN"),
                username: get("GITHUB_USERNAME"),
                api_url: get("GITHUB_API_URL")
                    .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
            },
            render: RenderSettings {
                api_key: get("RENDER_API_KEY"),
                owner_id: get("RENDER_OWNER_ID"),
                api_url: get("RENDER_API_URL")
                    .unwrap_or_else(|| DEFAULT_RENDER_API_URL.to_string()),
            },
            chat: ChatSettings {
                api_key: get("CHAT_API_KEY").or_else(|| get("CURSOR_API_KEY")),
                api_url: get("CHAT_API_URL")
                    .or_else(|| get("CURSOR_API_URL"))
                    .unwrap_or_else(|| DEFAULT_CHAT_API_URL.to_string()),
            },
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            public_base_url: get("PUBLIC_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| local_base_url(port)),
            generation_timeout: Duration::from_secs(generation_timeout),
            cleanup_delay: Duration::from_millis(DEFAULT_CLEANUP_DELAY_MS),
        }
    }

    /// Overrides the listen address.
    ///
    /// A base URL derived from the old port follows the new one; an
    /// explicit `PUBLIC_BASE_URL` is kept.
    pub fn with_listen_address(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            if self.public_base_url == local_base_url(self.port) {
                self.public_base_url = local_base_url(port);
            }
            self.port = port;
        }
        self
    }

    /// Returns the bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether `chat_id` may run administrative commands.
    pub fn is_admin(&self, chat_id: i64) -> bool {
        self.telegram_admin_ids.contains(&chat_id)
    }
}

fn local_base_url(port: u16) -> String {
    format!("http://localhost:{}", port)
}

impl Default for FactoryConfig {
    /// Configuration with every credential unset.
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = FactoryConfig::default();
        assert!(config.telegram_token.is_none());
        assert!(config.openai.api_key.is_none());
        assert_eq!(config.openai.model, DEFAULT_OPENAI_MODEL);
        assert_eq!(config.github.api_url, DEFAULT_GITHUB_API_URL);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.bind_address(), "0.0.0.0:3001");
        assert_eq!(config.public_base_url, "http://localhost:3001");
        assert_eq!(config.generation_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = FactoryConfig::from_lookup(lookup(&[("GITHUB_TOKEN", "  "), ("PORT", "")]));
        assert!(config.github.token.is_none());
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_cursor_aliases() {
        let config = FactoryConfig::from_lookup(lookup(&[
            ("CURSOR_API_KEY", "abc"),
            ("CURSOR_API_URL", "http://cursor.local"),
        ]));
        assert_eq!(config.chat.api_key.as_deref(), Some("abc"));
        assert_eq!(config.chat.api_url, "http://cursor.local");
    }

    #[test]
    fn test_admin_ids_and_base_url() {
        let config = FactoryConfig::from_lookup(lookup(&[
            ("TELEGRAM_ADMIN_IDS", "12, 34,nope"),
            ("PUBLIC_BASE_URL", "https://factory.example.com/"),
            ("PORT", "8080"),
        ]));
        assert_eq!(config.telegram_admin_ids, vec![12, 34]);
        assert!(config.is_admin(34));
        assert!(!config.is_admin(56));
        assert_eq!(config.public_base_url, "https://factory.example.com");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_port_override_moves_derived_base_url() {
        let config = FactoryConfig::from_lookup(lookup(&[("PORT", "8080")]))
            .with_listen_address(Some("127.0.0.1".to_string()), Some(9090));
        assert_eq!(config.bind_address(), "127.0.0.1:9090");
        assert_eq!(config.public_base_url, "http://localhost:9090");

        let config = FactoryConfig::from_lookup(lookup(&[(
            "PUBLIC_BASE_URL",
            "https://factory.example.com",
        )]))
        .with_listen_address(None, Some(9090));
        assert_eq!(config.port, 9090);
        assert_eq!(config.public_base_url, "https://factory.example.com");
    }

    #[test]
    fn test_env_file_name() {
        let file = env_file();
        assert!(file.ends_with(".env.local"));
    }
}
