//! Core domain entities.
//!
//! - [`UrlRecord`] - A stored short ID to original URL mapping

pub mod url_record;

pub use url_record::UrlRecord;
