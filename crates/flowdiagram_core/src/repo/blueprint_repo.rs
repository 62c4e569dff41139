//! Content-addressed blueprint persistence.
//!
//! # Responsibility
//! - Store each distinct blueprint spec once (`save_blueprint`).
//! - Allow explicit rewrites of one blueprint without dedup (`update_blueprint_spec`).
//!
//! # Invariants
//! - Specs are persisted as canonical JSON text with a SHA-256 `spec_hash`.
//! - The dedup lookup and the insert run inside one `BEGIN IMMEDIATE`
//!   transaction, so concurrent writers on the same database file are
//!   serialized between "no match" and "insert".
//! - No uniqueness constraint exists on content; rows rewritten through
//!   `update_blueprint_spec` may share content with another row.

use crate::model::blueprint::{canonical_json, spec_hash, Blueprint, BlueprintPatch};
use crate::model::EntityId;
use crate::repo::gateway::{
    parse_uuid, text_value, uuid_value, Column, Entity, Gateway, RepoError, RepoResult,
    SqliteGateway,
};
use log::debug;
use rusqlite::{Row, Transaction, TransactionBehavior};
use serde_json::Value;

impl Entity for Blueprint {
    type Patch = BlueprintPatch;

    const TABLE: &'static str = "blueprint";

    fn select_sql() -> String {
        "SELECT id, blueprint_spec, created_at, updated_at FROM blueprint".to_string()
    }

    fn id(&self) -> EntityId {
        self.id
    }

    fn to_record(&self) -> Vec<Column> {
        vec![
            ("id", uuid_value(self.id)),
            ("blueprint_spec", text_value(self.canonical_spec())),
            ("spec_hash", text_value(self.spec_hash())),
        ]
    }

    fn patch_record(patch: &BlueprintPatch) -> Vec<Column> {
        match patch.blueprint_spec.as_ref() {
            Some(spec) => vec![
                ("blueprint_spec", text_value(canonical_json(spec))),
                ("spec_hash", text_value(spec_hash(spec))),
            ],
            None => Vec::new(),
        }
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let id_text: String = row.get("id")?;
        let spec_text: String = row.get("blueprint_spec")?;
        let blueprint_spec = serde_json::from_str(&spec_text).map_err(|err| {
            RepoError::InvalidData(format!(
                "invalid json in blueprint.blueprint_spec for `{id_text}`: {err}"
            ))
        })?;
        Ok(Self {
            id: parse_uuid(&id_text, "blueprint.id")?,
            blueprint_spec,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// Blueprint queries layered on the generic gateway contract.
pub trait BlueprintRepository: Gateway<Blueprint> {
    /// Returns the oldest blueprint whose spec equals `spec` as JSON content.
    fn find_by_spec(&self, spec: &Value) -> RepoResult<Option<Blueprint>>;
    /// Returns the existing blueprint for `spec`, or inserts a new one.
    fn save_blueprint(&self, spec: &Value) -> RepoResult<Blueprint>;
    /// Rewrites the spec of `id` unconditionally.
    fn update_blueprint_spec(&self, id: EntityId, spec: &Value) -> RepoResult<Blueprint>;
}

impl BlueprintRepository for SqliteGateway<'_, Blueprint> {
    fn find_by_spec(&self, spec: &Value) -> RepoResult<Option<Blueprint>> {
        self.query_first(
            "WHERE spec_hash = ?1
               AND blueprint_spec = ?2
             ORDER BY created_at ASC, id ASC
             LIMIT 1",
            vec![text_value(spec_hash(spec)), text_value(canonical_json(spec))],
        )
    }

    fn save_blueprint(&self, spec: &Value) -> RepoResult<Blueprint> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if let Some(existing) = self.find_by_spec(spec)? {
            tx.commit()?;
            debug!(
                "event=blueprint_save module=repo status=ok outcome=dedup blueprint_id={}",
                existing.id
            );
            return Ok(existing);
        }

        let created = self.create(&Blueprint::new(spec.clone()))?;
        tx.commit()?;
        debug!(
            "event=blueprint_save module=repo status=ok outcome=create blueprint_id={}",
            created.id
        );
        Ok(created)
    }

    fn update_blueprint_spec(&self, id: EntityId, spec: &Value) -> RepoResult<Blueprint> {
        self.update(
            id,
            &BlueprintPatch {
                blueprint_spec: Some(spec.clone()),
            },
        )
    }
}
