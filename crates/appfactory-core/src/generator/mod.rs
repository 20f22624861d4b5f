//! Code generation with provider fallback.
//!
//! [`CodeGenerator::generate`] walks an ordered chain of
//! [`CodeProvider`]s. The first response that parses into a file map is
//! used; when every provider fails or returns prose, a static template is
//! rendered instead. Generation never fails.

mod huggingface;
mod openai;
mod provider;
pub mod templates;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use appfactory_models::GeneratedApp;

use crate::config::FactoryConfig;
use crate::http::http_client;

pub use huggingface::HuggingFaceProvider;
pub use openai::OpenAiProvider;
pub use provider::{CodeProvider, ProviderError};
pub use templates::TemplateKind;

/// Why the static template was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// No provider has a credential configured.
    NoProviders,
    /// Every provider returned an error.
    ProviderFailed,
    /// At least one provider answered with text that is not a file map.
    UnparseableResponse,
}

/// Which path produced the generated files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationSource {
    /// A provider response was parsed into files.
    Provider { name: String },
    /// The static template was rendered.
    Template {
        template: TemplateKind,
        reason: FallbackReason,
        /// Unparseable provider text kept in the README.
        #[serde(skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
    },
}

impl GenerationSource {
    /// True when the static template was used.
    pub fn is_fallback(&self) -> bool {
        matches!(self, GenerationSource::Template { .. })
    }
}

/// Result of a generation request.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub app: GeneratedApp,
    pub source: GenerationSource,
}

/// Generates app source files through an ordered provider chain.
pub struct CodeGenerator {
    providers: Vec<Box<dyn CodeProvider>>,
}

impl CodeGenerator {
    /// Creates a generator with an explicit provider chain.
    pub fn with_providers(providers: Vec<Box<dyn CodeProvider>>) -> Self {
        Self { providers }
    }

    /// Builds the chain from configuration: OpenAI, then HuggingFace.
    ///
    /// Providers without credentials are left out.
    pub fn from_config(config: &FactoryConfig) -> Self {
        let client = http_client(Some(config.generation_timeout));
        let mut providers: Vec<Box<dyn CodeProvider>> = Vec::new();
        if let Some(p) = OpenAiProvider::from_settings(client.clone(), &config.openai) {
            providers.push(Box::new(p));
        }
        if let Some(p) = HuggingFaceProvider::from_settings(client, &config.huggingface) {
            providers.push(Box::new(p));
        }
        Self::with_providers(providers)
    }

    /// Names of the configured providers, in order.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Whether any provider is configured.
    pub fn has_providers(&self) -> bool {
        !self.providers.is_empty()
    }

    /// Generates the files for `app_name`.
    pub async fn generate(&self, app_name: &str) -> GenerationOutcome {
        let prompt = build_prompt(app_name);
        let mut unparsed: Option<String> = None;

        for provider in &self.providers {
            match provider.complete(&prompt).await {
                Ok(text) => match parse_file_map(&text) {
                    Some(app) => {
                        info!(
                            provider = provider.name(),
                            files = app.len(),
                            app = %app_name,
                            "Generated app from provider"
                        );
                        return GenerationOutcome {
                            app,
                            source: GenerationSource::Provider {
                                name: provider.name().to_string(),
                            },
                        };
                    }
                    None => {
                        warn!(
                            provider = provider.name(),
                            chars = text.len(),
                            "Provider response is not a file map"
                        );
                        if unparsed.is_none() {
                            unparsed = Some(text);
                        }
                    }
                },
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "Provider failed");
                }
            }
        }

        let reason = if unparsed.is_some() {
            FallbackReason::UnparseableResponse
        } else if self.providers.is_empty() {
            FallbackReason::NoProviders
        } else {
            FallbackReason::ProviderFailed
        };
        let template = templates::select_template(app_name);
        info!(app = %app_name, ?template, ?reason, "Using static template");

        GenerationOutcome {
            app: templates::render(app_name, template, unparsed.as_deref()),
            source: GenerationSource::Template {
                template,
                reason,
                notes: unparsed,
            },
        }
    }
}

/// Builds the generation prompt for an app name.
pub fn build_prompt(app_name: &str) -> String {
    format!(
        "Create a complete React application for: {app_name}

Requirements:
- Modern React with hooks
- Responsive design with Tailwind CSS
- Clean, professional UI
- Include package.json with all dependencies
- Include README.md with setup instructions
- Make it functional and ready to deploy

Return the complete file structure as JSON with file paths as keys and content as values."
    )
}

/// Parses provider text into a file map.
///
/// The whole text is tried first, then the span from the first `{` to the
/// last `}`. String values are kept as-is; nested objects and arrays are
/// pretty-printed (a `package.json` often comes back as an object). Other
/// value types and blank paths are skipped. Returns `None` when nothing
/// usable remains.
pub fn parse_file_map(text: &str) -> Option<GeneratedApp> {
    let value: Value = serde_json::from_str(text.trim()).ok().or_else(|| {
        let start = text.find('{')?;
        let end = text.rfind('}')?;
        if end <= start {
            return None;
        }
        serde_json::from_str(&text[start..=end]).ok()
    })?;

    let Value::Object(map) = value else {
        return None;
    };

    let app: GeneratedApp = map
        .into_iter()
        .filter(|(path, _)| !path.trim().is_empty())
        .filter_map(|(path, content)| match content {
            Value::String(s) => Some((path, s)),
            v @ (Value::Object(_) | Value::Array(_)) => {
                serde_json::to_string_pretty(&v).ok().map(|s| (path, s))
            }
            _ => None,
        })
        .collect();

    (!app.is_empty()).then_some(app)
}
