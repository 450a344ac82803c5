//! Domain layer containing business entities and the deletion pipeline.
//!
//! This module is independent of HTTP and of any concrete storage backend.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Storage trait definitions
//! - [`deletion`] - Asynchronous batched soft-deletion pipeline
//!
//! # Deletion Flow
//!
//! 1. `DELETE /api/user/urls` handler validates the request
//! 2. [`deletion::BatchDeleter::enqueue`] queues a [`deletion::DeletionTask`]
//! 3. The handler answers `202 Accepted`
//! 4. The pipeline batches tasks and calls
//!    [`repositories::UrlRepository::mark_urls_deleted`] once per user

pub mod deletion;
pub mod entities;
pub mod repositories;
