//! Server persistence.

use crate::model::server::{Server, ServerPatch};
use crate::model::EntityId;
use crate::repo::gateway::{
    opt_text_value, parse_uuid, text_value, uuid_value, Column, Entity, Gateway, RepoError,
    RepoResult, SqliteGateway,
};
use rusqlite::Row;
use serde_json::Value;

impl Entity for Server {
    type Patch = ServerPatch;

    const TABLE: &'static str = "server";

    fn id(&self) -> EntityId {
        self.id
    }

    fn to_record(&self) -> Vec<Column> {
        vec![
            ("id", uuid_value(self.id)),
            ("url", text_value(self.url.as_str())),
            ("name", opt_text_value(self.name.as_deref())),
            (
                "config",
                opt_text_value(self.config.as_ref().map(Value::to_string).as_deref()),
            ),
        ]
    }

    fn patch_record(patch: &ServerPatch) -> Vec<Column> {
        let mut columns = Vec::new();
        if let Some(url) = patch.url.as_deref() {
            columns.push(("url", text_value(url)));
        }
        if let Some(name) = patch.name.as_ref() {
            columns.push(("name", opt_text_value(name.as_deref())));
        }
        if let Some(config) = patch.config.as_ref() {
            columns.push((
                "config",
                opt_text_value(config.as_ref().map(Value::to_string).as_deref()),
            ));
        }
        columns
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let id_text: String = row.get("id")?;
        let config = match row.get::<_, Option<String>>("config")? {
            Some(text) => Some(serde_json::from_str(&text).map_err(|err| {
                RepoError::InvalidData(format!(
                    "invalid json in server.config for `{id_text}`: {err}"
                ))
            })?),
            None => None,
        };
        Ok(Self {
            id: parse_uuid(&id_text, "server.id")?,
            url: row.get("url")?,
            name: row.get("name")?,
            config,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// Server queries layered on the generic gateway contract.
pub trait ServerRepository: Gateway<Server> {
    /// Returns the most recently updated server registered under `url`.
    fn get_by_url(&self, url: &str) -> RepoResult<Option<Server>>;
}

impl ServerRepository for SqliteGateway<'_, Server> {
    fn get_by_url(&self, url: &str) -> RepoResult<Option<Server>> {
        self.query_first(
            "WHERE url = ?1
             ORDER BY updated_at DESC, id ASC
             LIMIT 1",
            vec![text_value(url)],
        )
    }
}
