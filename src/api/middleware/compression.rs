//! Gzip for request and response bodies.

use axum::http::{Extensions, HeaderMap, StatusCode, Version, header};
use tower_http::compression::{CompressionLayer, Predicate};
use tower_http::decompression::RequestDecompressionLayer;

/// Response types worth compressing. Everything else is sent as is.
const COMPRESSIBLE_TYPES: [&str; 2] = ["application/json", "text/html"];

/// Compresses successful JSON and HTML responses for clients sending
/// `Accept-Encoding: gzip`.
pub fn response_layer() -> CompressionLayer<impl Predicate> {
    CompressionLayer::new().compress_when(is_compressible)
}

/// Inflates request bodies sent with `Content-Encoding: gzip`.
pub fn request_layer() -> RequestDecompressionLayer {
    RequestDecompressionLayer::new()
}

fn is_compressible(
    status: StatusCode,
    _version: Version,
    headers: &HeaderMap,
    _extensions: &Extensions,
) -> bool {
    if status.as_u16() >= 300 {
        return false;
    }

    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|ct| COMPRESSIBLE_TYPES.iter().any(|t| ct.starts_with(t)))
}
