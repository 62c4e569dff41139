//! Blueprint domain model and content addressing helpers.
//!
//! A blueprint is identified for deduplication by its specification
//! content, not by its ID: two specs that are equal as JSON values
//! (object key order ignored) have the same canonical text and hash.

use super::EntityId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Workflow specification stored once per distinct content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    pub id: EntityId,
    pub blueprint_spec: Value,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Blueprint {
    pub fn new(blueprint_spec: Value) -> Self {
        Self::with_id(Uuid::new_v4(), blueprint_spec)
    }

    pub fn with_id(id: EntityId, blueprint_spec: Value) -> Self {
        Self {
            id,
            blueprint_spec,
            created_at: 0,
            updated_at: 0,
        }
    }

    /// Canonical text of the spec as persisted.
    pub fn canonical_spec(&self) -> String {
        canonical_json(&self.blueprint_spec)
    }

    /// Content hash of the spec, used as the dedup lookup key.
    pub fn spec_hash(&self) -> String {
        spec_hash(&self.blueprint_spec)
    }
}

/// Partial update for a blueprint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlueprintPatch {
    pub blueprint_spec: Option<Value>,
}

/// Renders a JSON value with object keys sorted at every depth.
pub fn canonical_json(value: &Value) -> String {
    match value {
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(canonical_json).collect();
            format!("[{}]", items.join(","))
        }
        Value::Object(map) => {
            let sorted: BTreeMap<&String, &Value> = map.iter().collect();
            let items: Vec<String> = sorted
                .into_iter()
                .map(|(key, item)| format!("{}:{}", Value::String(key.clone()), canonical_json(item)))
                .collect();
            format!("{{{}}}", items.join(","))
        }
        scalar => scalar.to_string(),
    }
}

/// SHA-256 hex digest of the canonical spec text.
pub fn spec_hash(value: &Value) -> String {
    let digest = Sha256::digest(canonical_json(value).as_bytes());
    digest.iter().map(|byte| format!("{byte:02x}")).collect()
}
