//! Data-access layer for workflow diagrams.
//! Owns the persistence invariants for diagrams, blueprints, workflows and servers.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod registry;
pub mod repo;
pub mod service;

pub use config::{ConfigError, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::blueprint::{Blueprint, BlueprintPatch};
pub use model::diagram::{
    DefaultDiagramFilter, DefaultScope, Diagram, DiagramPatch, DEFAULT_DIAGRAM_TYPE,
};
pub use model::server::{Server, ServerPatch};
pub use model::workflow::{Workflow, WorkflowPatch};
pub use model::{EntityId, UserId};
pub use registry::{GatewayRegistry, SqliteDiagramService, TableCounts};
pub use repo::blueprint_repo::BlueprintRepository;
pub use repo::diagram_repo::DiagramRepository;
pub use repo::gateway::{Entity, Gateway, RepoError, RepoResult, SqliteGateway};
pub use repo::server_repo::ServerRepository;
pub use repo::workflow_repo::WorkflowRepository;
pub use service::blueprint_service::BlueprintService;
pub use service::diagram_service::{DiagramService, WorkflowDeployment};
pub use service::server_service::ServerService;
pub use service::workflow_service::WorkflowService;

/// Minimal health-check API for wiring probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
