//! Workflow persistence.

use crate::model::workflow::{Workflow, WorkflowPatch};
use crate::model::EntityId;
use crate::repo::gateway::{
    opt_uuid_value, parse_opt_uuid, parse_uuid, text_value, uuid_value, Column, Entity, Gateway,
    RepoResult, SqliteGateway,
};
use rusqlite::types::Value;
use rusqlite::Row;

impl Entity for Workflow {
    type Patch = WorkflowPatch;

    const TABLE: &'static str = "workflow";

    fn id(&self) -> EntityId {
        self.id
    }

    fn to_record(&self) -> Vec<Column> {
        vec![
            ("id", uuid_value(self.id)),
            ("name", text_value(self.name.as_str())),
            ("version", Value::Integer(self.version)),
            ("blueprint_id", uuid_value(self.blueprint_id)),
            ("server_id", opt_uuid_value(self.server_id)),
        ]
    }

    fn patch_record(patch: &WorkflowPatch) -> Vec<Column> {
        let mut columns = Vec::new();
        if let Some(name) = patch.name.as_deref() {
            columns.push(("name", text_value(name)));
        }
        if let Some(version) = patch.version {
            columns.push(("version", Value::Integer(version)));
        }
        if let Some(blueprint_id) = patch.blueprint_id {
            columns.push(("blueprint_id", uuid_value(blueprint_id)));
        }
        if let Some(server_id) = patch.server_id {
            columns.push(("server_id", opt_uuid_value(server_id)));
        }
        columns
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let id_text: String = row.get("id")?;
        let blueprint_text: String = row.get("blueprint_id")?;
        Ok(Self {
            id: parse_uuid(&id_text, "workflow.id")?,
            name: row.get("name")?,
            version: row.get("version")?,
            blueprint_id: parse_uuid(&blueprint_text, "workflow.blueprint_id")?,
            server_id: parse_opt_uuid(row.get("server_id")?, "workflow.server_id")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// Workflow queries layered on the generic gateway contract.
pub trait WorkflowRepository: Gateway<Workflow> {
    /// Workflows deployed on `server_id`, most recently updated first.
    fn get_by_server(&self, server_id: EntityId) -> RepoResult<Vec<Workflow>>;
    /// Deletes every workflow deployed on `server_id`; returns the row count.
    fn delete_by_server(&self, server_id: EntityId) -> RepoResult<usize>;
}

impl WorkflowRepository for SqliteGateway<'_, Workflow> {
    fn get_by_server(&self, server_id: EntityId) -> RepoResult<Vec<Workflow>> {
        self.query_many(
            "WHERE server_id = ?1
             ORDER BY updated_at DESC, id ASC",
            vec![uuid_value(server_id)],
        )
    }

    fn delete_by_server(&self, server_id: EntityId) -> RepoResult<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM workflow WHERE server_id = ?1;",
            [server_id.to_string()],
        )?;
        Ok(deleted)
    }
}
