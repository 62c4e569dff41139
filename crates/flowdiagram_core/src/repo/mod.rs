//! Storage gateways: typed CRUD over the backing SQLite store.
//!
//! # Responsibility
//! - Define the uniform gateway contract and the entity row mappings.
//! - Keep SQL details, joins, and statement-level invariants out of services.
//!
//! # Invariants
//! - Reads of a missing ID return `None`; updates of a missing ID return
//!   `RepoError::NotFound`; deletes of a missing ID succeed.
//! - Store errors surface unchanged as `RepoError::Db`.

pub mod blueprint_repo;
pub mod diagram_repo;
pub mod gateway;
pub mod server_repo;
pub mod workflow_repo;
