//! Utility functions for ID generation and URL processing.
//!
//! - [`id_generator`] - Hash-derived short IDs and random identifiers
//! - [`url_normalizer`] - URL normalization and sanitization

pub mod id_generator;
pub mod url_normalizer;
