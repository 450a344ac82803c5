//! Infrastructure layer for external integrations.
//!
//! Implements the storage traits defined by the domain layer.
//!
//! - [`persistence`] - In-memory, file and PostgreSQL repositories

pub mod persistence;
