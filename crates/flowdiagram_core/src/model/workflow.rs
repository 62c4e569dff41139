//! Workflow domain model.
//!
//! A workflow connects a blueprint to the server deploying it.

use super::EntityId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: EntityId,
    pub name: String,
    pub version: i64,
    pub blueprint_id: EntityId,
    pub server_id: Option<EntityId>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Workflow {
    /// Builds a workflow with a caller-provided ID.
    ///
    /// Workflow IDs come from the deploying server, so there is no
    /// generating constructor.
    pub fn new(
        id: EntityId,
        name: impl Into<String>,
        version: i64,
        blueprint_id: EntityId,
        server_id: Option<EntityId>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            version,
            blueprint_id,
            server_id,
            created_at: 0,
            updated_at: 0,
        }
    }
}

/// Partial update for a workflow; `server_id: Some(None)` detaches it
/// from its server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowPatch {
    pub name: Option<String>,
    pub version: Option<i64>,
    pub blueprint_id: Option<EntityId>,
    pub server_id: Option<Option<EntityId>>,
}
