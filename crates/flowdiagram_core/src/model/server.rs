//! Server domain model.

use super::EntityId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Workflow engine instance, looked up by `url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub id: EntityId,
    pub url: String,
    pub name: Option<String>,
    /// Free-form connection metadata.
    pub config: Option<Value>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Server {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            url: url.into(),
            name: None,
            config: None,
            created_at: 0,
            updated_at: 0,
        }
    }
}

/// Partial update for a server. `Some(None)` clears `name` or `config`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerPatch {
    pub url: Option<String>,
    pub name: Option<Option<String>>,
    pub config: Option<Option<Value>>,
}
