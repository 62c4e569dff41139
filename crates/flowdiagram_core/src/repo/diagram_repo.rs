//! Diagram read paths and default-selection maintenance.
//!
//! # Responsibility
//! - Denormalize `workflow_id` onto every diagram read via a left join
//!   `diagram.blueprint_id -> workflow.blueprint_id`.
//! - Keep "at most one `user_default` per (`user_id`, `blueprint_id`)".
//!
//! # Invariants
//! - `set_default` is one conditional UPDATE over the whole scope; it is
//!   never split into a read followed by writes.
//! - Save/update paths that leave a row with `user_default` set clear the
//!   rest of its scope inside the same immediate transaction as the write.
//! - A blueprint referenced by several workflows yields one row per
//!   workflow on unfiltered reads. Workflow-filtered reads see one row.

use crate::db::NOW_MS_SQL;
use crate::model::diagram::{DefaultDiagramFilter, DefaultScope, Diagram, DiagramPatch};
use crate::model::{EntityId, UserId};
use crate::repo::gateway::{
    bool_value, opt_uuid_value, parse_bool, parse_opt_uuid, parse_uuid, placeholders, text_value,
    uuid_value, Column, Entity, Gateway, RepoError, RepoResult, SqliteGateway,
};
use log::{debug, info};
use rusqlite::types::Value;
use rusqlite::{params, Row, Transaction, TransactionBehavior};

const DIAGRAM_SELECT_SQL: &str = "SELECT
    diagram.id,
    diagram.name,
    diagram.user_id,
    diagram.diagram_xml,
    diagram.blueprint_id,
    diagram.type,
    diagram.is_public,
    diagram.user_default,
    diagram.is_aligned,
    diagram.created_at,
    diagram.updated_at,
    workflow.id AS workflow_id
FROM diagram
LEFT JOIN workflow ON workflow.blueprint_id = diagram.blueprint_id";

impl Entity for Diagram {
    type Patch = DiagramPatch;

    const TABLE: &'static str = "diagram";

    fn select_sql() -> String {
        DIAGRAM_SELECT_SQL.to_string()
    }

    fn id(&self) -> EntityId {
        self.id
    }

    fn to_record(&self) -> Vec<Column> {
        vec![
            ("id", uuid_value(self.id)),
            ("name", text_value(self.name.as_str())),
            ("user_id", opt_uuid_value(self.user_id)),
            ("diagram_xml", text_value(self.diagram_xml.as_str())),
            ("blueprint_id", opt_uuid_value(self.blueprint_id)),
            ("type", text_value(self.diagram_type.as_str())),
            ("is_public", bool_value(self.is_public)),
            ("user_default", bool_value(self.user_default)),
            ("is_aligned", bool_value(self.is_aligned)),
        ]
    }

    fn patch_record(patch: &DiagramPatch) -> Vec<Column> {
        let mut columns = Vec::new();
        if let Some(name) = patch.name.as_deref() {
            columns.push(("name", text_value(name)));
        }
        if let Some(user_id) = patch.user_id {
            columns.push(("user_id", opt_uuid_value(user_id)));
        }
        if let Some(diagram_xml) = patch.diagram_xml.as_deref() {
            columns.push(("diagram_xml", text_value(diagram_xml)));
        }
        if let Some(blueprint_id) = patch.blueprint_id {
            columns.push(("blueprint_id", opt_uuid_value(blueprint_id)));
        }
        if let Some(diagram_type) = patch.diagram_type.as_deref() {
            columns.push(("type", text_value(diagram_type)));
        }
        if let Some(is_public) = patch.is_public {
            columns.push(("is_public", bool_value(is_public)));
        }
        if let Some(user_default) = patch.user_default {
            columns.push(("user_default", bool_value(user_default)));
        }
        if let Some(is_aligned) = patch.is_aligned {
            columns.push(("is_aligned", bool_value(is_aligned)));
        }
        columns
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let id_text: String = row.get("id")?;
        Ok(Self {
            id: parse_uuid(&id_text, "diagram.id")?,
            name: row.get("name")?,
            user_id: parse_opt_uuid(row.get("user_id")?, "diagram.user_id")?,
            diagram_xml: row.get("diagram_xml")?,
            blueprint_id: parse_opt_uuid(row.get("blueprint_id")?, "diagram.blueprint_id")?,
            diagram_type: row.get("type")?,
            is_public: parse_bool(row.get("is_public")?, "diagram.is_public")?,
            user_default: parse_bool(row.get("user_default")?, "diagram.user_default")?,
            is_aligned: parse_bool(row.get("is_aligned")?, "diagram.is_aligned")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
            workflow_id: parse_opt_uuid(row.get("workflow_id")?, "workflow.id")?,
        })
    }
}

/// Diagram queries layered on the generic gateway contract.
pub trait DiagramRepository: Gateway<Diagram> {
    /// Diagrams owned by `user_id`, most recently updated first.
    fn get_by_user_id(&self, user_id: UserId) -> RepoResult<Vec<Diagram>>;
    /// Diagrams whose blueprint backs `workflow_id`, most recently updated first.
    fn get_by_workflow_id(&self, workflow_id: EntityId) -> RepoResult<Vec<Diagram>>;
    fn get_latest_by_workflow_id(&self, workflow_id: EntityId) -> RepoResult<Option<Diagram>>;
    /// Diagrams of `workflow_id` owned by `user_id` or public.
    ///
    /// Ordered by `user_id` ascending (NULL owners first), then `is_public`
    /// descending, then `updated_at` descending. This is a tie-break only;
    /// owned rows are not guaranteed to precede public ones.
    fn get_by_user_and_workflow(
        &self,
        user_id: UserId,
        workflow_id: EntityId,
    ) -> RepoResult<Vec<Diagram>>;
    /// Most recently updated public diagram.
    fn get_latest_public(&self) -> RepoResult<Option<Diagram>>;
    /// The diagram flagged `user_default` for `user_id`, optionally within one workflow.
    fn get_default_diagram(
        &self,
        user_id: UserId,
        filter: &DefaultDiagramFilter,
    ) -> RepoResult<Option<Diagram>>;
    fn get_by_blueprint_ids(&self, blueprint_ids: &[EntityId]) -> RepoResult<Vec<Diagram>>;
    /// Clears `user_default` on every diagram in `scope` except `scope.except_id`.
    ///
    /// Returns the number of rows that were flagged before the call.
    fn unset_default(&self, scope: &DefaultScope) -> RepoResult<usize>;
    /// Makes `id` the only default of its scope in one statement.
    fn set_default(&self, id: EntityId) -> RepoResult<Diagram>;
    /// Saves by ID, then clears sibling defaults when the saved row is default.
    fn save_diagram(&self, diagram: &Diagram) -> RepoResult<Diagram>;
    /// Partially updates, then clears sibling defaults when the updated row
    /// is default. Covers both raising the flag and moving a default row
    /// into another scope.
    fn update_diagram(&self, id: EntityId, patch: &DiagramPatch) -> RepoResult<Diagram>;
}

impl DiagramRepository for SqliteGateway<'_, Diagram> {
    fn get_by_user_id(&self, user_id: UserId) -> RepoResult<Vec<Diagram>> {
        self.query_many(
            "WHERE diagram.user_id = ?1
             ORDER BY diagram.updated_at DESC, diagram.id ASC",
            vec![uuid_value(user_id)],
        )
    }

    fn get_by_workflow_id(&self, workflow_id: EntityId) -> RepoResult<Vec<Diagram>> {
        self.query_many(
            "WHERE workflow.id = ?1
             ORDER BY diagram.updated_at DESC, diagram.id ASC",
            vec![uuid_value(workflow_id)],
        )
    }

    fn get_latest_by_workflow_id(&self, workflow_id: EntityId) -> RepoResult<Option<Diagram>> {
        self.query_first(
            "WHERE workflow.id = ?1
             ORDER BY diagram.updated_at DESC, diagram.id ASC
             LIMIT 1",
            vec![uuid_value(workflow_id)],
        )
    }

    fn get_by_user_and_workflow(
        &self,
        user_id: UserId,
        workflow_id: EntityId,
    ) -> RepoResult<Vec<Diagram>> {
        self.query_many(
            "WHERE (diagram.user_id = ?1 AND workflow.id = ?2)
                OR (diagram.is_public = 1 AND workflow.id = ?2)
             ORDER BY diagram.user_id ASC, diagram.is_public DESC, diagram.updated_at DESC",
            vec![uuid_value(user_id), uuid_value(workflow_id)],
        )
    }

    fn get_latest_public(&self) -> RepoResult<Option<Diagram>> {
        self.query_first(
            "WHERE diagram.is_public = 1
             ORDER BY diagram.updated_at DESC, diagram.id ASC
             LIMIT 1",
            Vec::new(),
        )
    }

    fn get_default_diagram(
        &self,
        user_id: UserId,
        filter: &DefaultDiagramFilter,
    ) -> RepoResult<Option<Diagram>> {
        let mut tail = String::from(
            "WHERE diagram.user_id = ?
               AND diagram.user_default = 1",
        );
        let mut binds = vec![uuid_value(user_id)];
        if let Some(workflow_id) = filter.workflow_id {
            tail.push_str(" AND workflow.id = ?");
            binds.push(uuid_value(workflow_id));
        }
        tail.push_str(" ORDER BY diagram.updated_at DESC, diagram.id ASC LIMIT 1");
        self.query_first(&tail, binds)
    }

    fn get_by_blueprint_ids(&self, blueprint_ids: &[EntityId]) -> RepoResult<Vec<Diagram>> {
        if blueprint_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.query_many(
            &format!(
                "WHERE diagram.blueprint_id IN ({})
                 ORDER BY diagram.updated_at DESC, diagram.id ASC",
                placeholders(blueprint_ids.len())
            ),
            blueprint_ids.iter().copied().map(uuid_value).collect(),
        )
    }

    fn unset_default(&self, scope: &DefaultScope) -> RepoResult<usize> {
        let mut sql = format!(
            "UPDATE diagram
             SET user_default = 0,
                 updated_at = {NOW_MS_SQL}
             WHERE user_id IS ?
               AND blueprint_id IS ?
               AND user_default = 1"
        );
        let mut binds: Vec<Value> = vec![
            opt_uuid_value(scope.user_id),
            opt_uuid_value(scope.blueprint_id),
        ];
        if let Some(except_id) = scope.except_id {
            sql.push_str(" AND id != ?");
            binds.push(uuid_value(except_id));
        }

        let cleared = self
            .conn
            .execute(&sql, rusqlite::params_from_iter(binds))?;
        debug!(
            "event=diagram_unset_default module=repo status=ok cleared={} except_id={}",
            cleared,
            scope
                .except_id
                .map_or_else(|| "none".to_string(), |id| id.to_string())
        );
        Ok(cleared)
    }

    fn set_default(&self, id: EntityId) -> RepoResult<Diagram> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE diagram
                 SET user_default = CASE WHEN id = ?1 THEN 1 ELSE 0 END,
                     updated_at = {NOW_MS_SQL}
                 WHERE EXISTS (SELECT 1 FROM diagram WHERE id = ?1)
                   AND user_id IS (SELECT user_id FROM diagram WHERE id = ?1)
                   AND blueprint_id IS (SELECT blueprint_id FROM diagram WHERE id = ?1)
                   AND (id = ?1 OR user_default = 1);"
            ),
            params![id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        info!(
            "event=diagram_set_default module=repo status=ok diagram_id={} rows={}",
            id, changed
        );
        self.get(id)?.ok_or(RepoError::NotFound(id))
    }

    fn save_diagram(&self, diagram: &Diagram) -> RepoResult<Diagram> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let saved = self.save(diagram)?;
        if saved.user_default {
            self.unset_default(&saved.default_scope().except(saved.id))?;
        }
        tx.commit()?;
        Ok(saved)
    }

    fn update_diagram(&self, id: EntityId, patch: &DiagramPatch) -> RepoResult<Diagram> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let updated = self.update(id, patch)?;
        if updated.user_default {
            self.unset_default(&updated.default_scope().except(updated.id))?;
        }
        tx.commit()?;
        Ok(updated)
    }
}
