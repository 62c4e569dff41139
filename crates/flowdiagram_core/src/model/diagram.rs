//! Diagram domain model.
//!
//! # Invariants
//! - At most one diagram per (`user_id`, `blueprint_id`) scope has
//!   `user_default == true`; the repository layer maintains this.
//! - `workflow_id` is derived by the store and never written back.

use super::{EntityId, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Categorical tag applied to diagrams created without an explicit type.
pub const DEFAULT_DIAGRAM_TYPE: &str = "standard";

/// Editable diagram document owned by a user or published publicly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagram {
    pub id: EntityId,
    pub name: String,
    /// Owner. `None` for ownerless public diagrams.
    pub user_id: Option<UserId>,
    /// Opaque document payload.
    pub diagram_xml: String,
    pub blueprint_id: Option<EntityId>,
    /// Serialized as `type` to match the row shape.
    #[serde(rename = "type")]
    pub diagram_type: String,
    pub is_public: bool,
    pub user_default: bool,
    pub is_aligned: bool,
    pub created_at: i64,
    pub updated_at: i64,
    /// Workflow referencing this diagram's blueprint, resolved by join.
    #[serde(default)]
    pub workflow_id: Option<EntityId>,
}

impl Diagram {
    /// Creates a private, non-default `standard` diagram with a generated ID.
    pub fn new(
        name: impl Into<String>,
        user_id: Option<UserId>,
        diagram_xml: impl Into<String>,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), name, user_id, diagram_xml)
    }

    /// Creates a diagram with a caller-provided ID.
    ///
    /// Saving a record built this way over an existing ID updates that row.
    pub fn with_id(
        id: EntityId,
        name: impl Into<String>,
        user_id: Option<UserId>,
        diagram_xml: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            user_id,
            diagram_xml: diagram_xml.into(),
            blueprint_id: None,
            diagram_type: DEFAULT_DIAGRAM_TYPE.to_string(),
            is_public: false,
            user_default: false,
            is_aligned: false,
            created_at: 0,
            updated_at: 0,
            workflow_id: None,
        }
    }

    /// Returns the default-selection scope this diagram belongs to.
    pub fn default_scope(&self) -> DefaultScope {
        DefaultScope {
            user_id: self.user_id,
            blueprint_id: self.blueprint_id,
            except_id: None,
        }
    }
}

/// Partial update for a diagram. `None` leaves the column untouched.
///
/// Nullable columns take `Some(None)` to clear the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagramPatch {
    pub name: Option<String>,
    pub user_id: Option<Option<UserId>>,
    pub diagram_xml: Option<String>,
    pub blueprint_id: Option<Option<EntityId>>,
    pub diagram_type: Option<String>,
    pub is_public: Option<bool>,
    pub user_default: Option<bool>,
    pub is_aligned: Option<bool>,
}

/// The (`user_id`, `blueprint_id`) pair bounding "at most one default".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultScope {
    pub user_id: Option<UserId>,
    pub blueprint_id: Option<EntityId>,
    /// Diagram left untouched when clearing the scope.
    pub except_id: Option<EntityId>,
}

impl DefaultScope {
    pub fn except(mut self, id: EntityId) -> Self {
        self.except_id = Some(id);
        self
    }
}

/// Optional narrowing for default-diagram lookups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultDiagramFilter {
    pub workflow_id: Option<EntityId>,
}
