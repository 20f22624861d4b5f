//! Application state shared across handlers.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use appfactory_core::Factory;

use crate::config::ApiConfig;

/// An open WebSocket connection.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionInfo {
    pub id: String,
    pub connected_at: DateTime<Utc>,
}

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// The factory service.
    pub factory: Arc<Factory>,
    /// Open WebSocket connections by id.
    pub connections: Arc<RwLock<HashMap<String, ConnectionInfo>>>,
}

impl AppState {
    pub fn new(config: ApiConfig, factory: Arc<Factory>) -> Self {
        Self {
            config: Arc::new(config),
            factory,
            connections: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Registers a new connection and returns its id.
    pub async fn add_connection(&self) -> String {
        let info = ConnectionInfo {
            id: uuid::Uuid::new_v4().to_string(),
            connected_at: Utc::now(),
        };
        let id = info.id.clone();
        self.connections.write().await.insert(id.clone(), info);
        id
    }

    /// Removes a connection.
    pub async fn remove_connection(&self, id: &str) -> Option<ConnectionInfo> {
        self.connections.write().await.remove(id)
    }

    /// Number of open connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}
