//! Short ID and opaque identifier generation.

use base64::Engine as _;
use sha2::{Digest, Sha256};

/// Length of a short ID in characters.
pub const SHORT_ID_LENGTH: usize = 8;

/// Random bytes behind [`random_id`].
const RANDOM_ID_BYTES: usize = 16;

/// Derives the short ID of a normalized URL.
///
/// The ID is the first [`SHORT_ID_LENGTH`] characters of the URL-safe base64
/// encoding of the URL's SHA-256 digest. The same URL always yields the same
/// ID; collisions between different URLs are possible and accepted.
pub fn short_id(normalized_url: &str) -> String {
    let digest = Sha256::digest(normalized_url.as_bytes());
    let mut encoded = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(digest);
    encoded.truncate(SHORT_ID_LENGTH);
    encoded
}

/// Generates a random 32-character hex identifier.
///
/// Used for record IDs and for anonymous user IDs.
///
/// # Panics
///
/// Panics if the system random number generator fails (extremely rare).
pub fn random_id() -> String {
    let mut buffer = [0u8; RANDOM_ID_BYTES];
    getrandom::fill(&mut buffer).expect("Failed to generate random bytes");
    hex::encode(buffer)
}
