//! Use-case services.
//!
//! # Responsibility
//! - Give callers save/fetch/delete entry points per entity.
//! - Compose gateways where one use case touches several tables.

pub mod blueprint_service;
pub mod diagram_service;
pub mod server_service;
pub mod workflow_service;
