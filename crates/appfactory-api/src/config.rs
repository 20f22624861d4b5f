//! API configuration.

use appfactory_core::FactoryConfig;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
}

impl ApiConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Takes host and port from the factory configuration.
    pub fn from_factory(config: &FactoryConfig) -> Self {
        Self::new(config.host.clone(), config.port)
    }

    /// Returns the bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::from_factory(&FactoryConfig::default())
    }
}
