//! Typed record shapes persisted by the diagram store.
//!
//! # Responsibility
//! - Define the caller-facing shapes of diagrams, blueprints, workflows and servers.
//! - Generate stable identifiers at construction time, never in the store.
//!
//! # Invariants
//! - Every record is identified by a client-generated v4 `EntityId`.
//! - Timestamps are epoch milliseconds stamped by the store; freshly
//!   constructed records carry `0` until persisted.

pub mod blueprint;
pub mod diagram;
pub mod server;
pub mod workflow;

use uuid::Uuid;

/// Stable identifier shared by every persisted record.
pub type EntityId = Uuid;

/// Identifier of the user owning a diagram.
pub type UserId = Uuid;
