//! HTTP middleware: gzip, user identity and request tracing.

pub mod compression;
pub mod identity;
pub mod tracing;

pub use identity::CurrentUser;
