//! Uniform CRUD contract and its generic SQLite implementation.
//!
//! # Responsibility
//! - Map typed entities to rows (`Entity`) and rows back to entities.
//! - Provide one `Gateway` implementation shared by every entity table.
//!
//! # Invariants
//! - Every update stamps `updated_at` with the store's current time.
//! - Deletes are hard deletes and succeed when no row matches.
//! - Store errors are returned unchanged inside `RepoError::Db`; nothing
//!   here retries.

use crate::db::{DbError, NOW_MS_SQL};
use crate::model::EntityId;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Column name paired with the value bound for it.
pub type Column = (&'static str, Value);

/// Generic repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Store failure (connectivity, constraint violation, bad SQL).
    Db(DbError),
    /// Mutation targeted an ID that has no row.
    NotFound(EntityId),
    /// A persisted row could not be decoded into its entity.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Row mapping for one persisted entity type.
pub trait Entity: Sized {
    /// Partial-update shape accepted by `Gateway::update`.
    type Patch;

    /// Backing table name. Also used to qualify columns in joined selects.
    const TABLE: &'static str;

    /// Projection every read path starts from.
    fn select_sql() -> String {
        format!("SELECT * FROM {}", Self::TABLE)
    }

    fn id(&self) -> EntityId;

    /// Persisted columns, including `id`. Store-stamped timestamps are
    /// never part of the record.
    fn to_record(&self) -> Vec<Column>;

    /// Columns assigned by a partial update.
    fn patch_record(patch: &Self::Patch) -> Vec<Column>;

    fn from_row(row: &Row<'_>) -> RepoResult<Self>;
}

/// CRUD contract shared by every entity gateway.
pub trait Gateway<E: Entity> {
    /// Returns the row for `id`, or `None` when absent.
    fn get(&self, id: EntityId) -> RepoResult<Option<E>>;
    /// Returns every row matching one of `ids`. Missing IDs are skipped.
    fn get_batch(&self, ids: &[EntityId]) -> RepoResult<Vec<E>>;
    /// Returns every row, most recently updated first.
    fn get_all(&self) -> RepoResult<Vec<E>>;
    /// Inserts a new row and returns it as stored.
    fn create(&self, entity: &E) -> RepoResult<E>;
    /// Applies a partial update and returns the full updated row.
    fn update(&self, id: EntityId, patch: &E::Patch) -> RepoResult<E>;
    fn delete(&self, id: EntityId) -> RepoResult<()>;
    fn delete_batch(&self, ids: &[EntityId]) -> RepoResult<()>;
    /// Updates the row when `entity.id()` exists, inserts it otherwise.
    fn save(&self, entity: &E) -> RepoResult<E>;
}

/// SQLite-backed gateway, generic over the entity it maps.
pub struct SqliteGateway<'conn, E> {
    pub(crate) conn: &'conn Connection,
    _entity: PhantomData<E>,
}

impl<'conn, E: Entity> SqliteGateway<'conn, E> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            _entity: PhantomData,
        }
    }

    /// Counts rows in the entity table.
    pub fn count(&self) -> RepoResult<i64> {
        let count = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {};", E::TABLE),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Runs `{select_sql} {tail}` and decodes every row.
    pub(crate) fn query_many(&self, tail: &str, binds: Vec<Value>) -> RepoResult<Vec<E>> {
        let sql = format!("{} {tail}", E::select_sql());
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut entities = Vec::new();
        while let Some(row) = rows.next()? {
            entities.push(E::from_row(row)?);
        }
        Ok(entities)
    }

    /// Runs `{select_sql} {tail}` and decodes the first row, if any.
    pub(crate) fn query_first(&self, tail: &str, binds: Vec<Value>) -> RepoResult<Option<E>> {
        let sql = format!("{} {tail}", E::select_sql());
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        match rows.next()? {
            Some(row) => Ok(Some(E::from_row(row)?)),
            None => Ok(None),
        }
    }

    fn require(&self, id: EntityId) -> RepoResult<E> {
        self.get(id)?.ok_or(RepoError::NotFound(id))
    }

    fn update_columns(&self, id: EntityId, columns: Vec<Column>) -> RepoResult<E> {
        let mut assignments: Vec<String> = Vec::with_capacity(columns.len() + 1);
        let mut binds: Vec<Value> = Vec::with_capacity(columns.len() + 1);
        for (column, value) in columns {
            if column == "id" {
                continue;
            }
            assignments.push(format!("{column} = ?"));
            binds.push(value);
        }
        assignments.push(format!("updated_at = {NOW_MS_SQL}"));
        binds.push(uuid_value(id));

        let changed = self.conn.execute(
            &format!(
                "UPDATE {} SET {} WHERE id = ?;",
                E::TABLE,
                assignments.join(", ")
            ),
            params_from_iter(binds),
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        self.require(id)
    }
}

impl<E: Entity> Gateway<E> for SqliteGateway<'_, E> {
    fn get(&self, id: EntityId) -> RepoResult<Option<E>> {
        self.query_first(
            &format!("WHERE {}.id = ?1 LIMIT 1", E::TABLE),
            vec![uuid_value(id)],
        )
    }

    fn get_batch(&self, ids: &[EntityId]) -> RepoResult<Vec<E>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.query_many(
            &format!("WHERE {}.id IN ({})", E::TABLE, placeholders(ids.len())),
            ids.iter().copied().map(uuid_value).collect(),
        )
    }

    fn get_all(&self) -> RepoResult<Vec<E>> {
        self.query_many(
            &format!(
                "ORDER BY {table}.updated_at DESC, {table}.id ASC",
                table = E::TABLE
            ),
            Vec::new(),
        )
    }

    fn create(&self, entity: &E) -> RepoResult<E> {
        let record = entity.to_record();
        let columns: Vec<&str> = record.iter().map(|(column, _)| *column).collect();
        let binds: Vec<Value> = record.into_iter().map(|(_, value)| value).collect();

        self.conn.execute(
            &format!(
                "INSERT INTO {} ({}) VALUES ({});",
                E::TABLE,
                columns.join(", "),
                placeholders(columns.len())
            ),
            params_from_iter(binds),
        )?;

        self.require(entity.id())
    }

    fn update(&self, id: EntityId, patch: &E::Patch) -> RepoResult<E> {
        self.update_columns(id, E::patch_record(patch))
    }

    fn delete(&self, id: EntityId) -> RepoResult<()> {
        self.conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1;", E::TABLE),
            [id.to_string()],
        )?;
        Ok(())
    }

    fn delete_batch(&self, ids: &[EntityId]) -> RepoResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.conn.execute(
            &format!(
                "DELETE FROM {} WHERE id IN ({});",
                E::TABLE,
                placeholders(ids.len())
            ),
            params_from_iter(ids.iter().copied().map(uuid_value)),
        )?;
        Ok(())
    }

    fn save(&self, entity: &E) -> RepoResult<E> {
        if self.get(entity.id())?.is_some() {
            return self.update_columns(entity.id(), entity.to_record());
        }
        self.create(entity)
    }
}

pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

pub(crate) fn uuid_value(id: Uuid) -> Value {
    Value::Text(id.to_string())
}

pub(crate) fn opt_uuid_value(id: Option<Uuid>) -> Value {
    id.map_or(Value::Null, uuid_value)
}

pub(crate) fn text_value(value: impl Into<String>) -> Value {
    Value::Text(value.into())
}

pub(crate) fn opt_text_value(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |text| Value::Text(text.to_string()))
}

pub(crate) fn bool_value(value: bool) -> Value {
    Value::Integer(if value { 1 } else { 0 })
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn parse_opt_uuid(value: Option<String>, column: &str) -> RepoResult<Option<Uuid>> {
    value.map(|text| parse_uuid(&text, column)).transpose()
}

pub(crate) fn parse_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}
