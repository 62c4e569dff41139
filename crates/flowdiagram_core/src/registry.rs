//! Process-level owner of the store connection and gateway factory.
//!
//! # Responsibility
//! - Open the single store connection once at process start.
//! - Hand out gateways and services borrowing that connection.
//!
//! # Invariants
//! - One registry owns one connection for its whole lifetime; there is no
//!   global instance. Callers needing an isolated store build another
//!   registry (for example `GatewayRegistry::in_memory()` per test).
//! - Gateway selection is by entity type at compile time.

use crate::config::StoreConfig;
use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::model::blueprint::Blueprint;
use crate::model::diagram::Diagram;
use crate::model::server::Server;
use crate::model::workflow::Workflow;
use crate::repo::gateway::{Entity, RepoResult, SqliteGateway};
use crate::service::blueprint_service::BlueprintService;
use crate::service::diagram_service::DiagramService;
use crate::service::server_service::ServerService;
use crate::service::workflow_service::WorkflowService;
use rusqlite::Connection;

pub type SqliteDiagramService<'conn> = DiagramService<
    SqliteGateway<'conn, Diagram>,
    SqliteGateway<'conn, Blueprint>,
    SqliteGateway<'conn, Workflow>,
>;

/// Row counts per entity table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub diagrams: i64,
    pub blueprints: i64,
    pub workflows: i64,
    pub servers: i64,
}

pub struct GatewayRegistry {
    conn: Connection,
}

impl GatewayRegistry {
    /// Opens the store selected by `config`, applying migrations.
    pub fn open(config: &StoreConfig) -> DbResult<Self> {
        let conn = match config.db_path.as_ref() {
            Some(path) => open_db(path)?,
            None => open_db_in_memory()?,
        };
        Ok(Self { conn })
    }

    /// Opens a fresh, empty in-memory store.
    pub fn in_memory() -> DbResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }

    /// Wraps an already migrated connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn gateway<E: Entity>(&self) -> SqliteGateway<'_, E> {
        SqliteGateway::new(&self.conn)
    }

    pub fn diagrams(&self) -> SqliteGateway<'_, Diagram> {
        self.gateway()
    }

    pub fn blueprints(&self) -> SqliteGateway<'_, Blueprint> {
        self.gateway()
    }

    pub fn workflows(&self) -> SqliteGateway<'_, Workflow> {
        self.gateway()
    }

    pub fn servers(&self) -> SqliteGateway<'_, Server> {
        self.gateway()
    }

    pub fn diagram_service(&self) -> SqliteDiagramService<'_> {
        DiagramService::new(self.diagrams(), self.blueprints(), self.workflows())
    }

    pub fn blueprint_service(&self) -> BlueprintService<SqliteGateway<'_, Blueprint>> {
        BlueprintService::new(self.blueprints())
    }

    pub fn workflow_service(&self) -> WorkflowService<SqliteGateway<'_, Workflow>> {
        WorkflowService::new(self.workflows())
    }

    pub fn server_service(&self) -> ServerService<SqliteGateway<'_, Server>> {
        ServerService::new(self.servers())
    }

    pub fn table_counts(&self) -> RepoResult<TableCounts> {
        Ok(TableCounts {
            diagrams: self.diagrams().count()?,
            blueprints: self.blueprints().count()?,
            workflows: self.workflows().count()?,
            servers: self.servers().count()?,
        })
    }
}
