//! Canonical form of submitted URLs.
//!
//! Short IDs are derived from the normalized URL, so two spellings of the
//! same address must normalize to the same string.

use url::Url;

/// Reasons a submitted URL is rejected.
#[derive(Debug, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("URL is empty")]
    Empty,

    #[error("invalid URL {input:?}: {reason}")]
    Invalid { input: String, reason: String },

    #[error("unsupported scheme {0:?}, only http and https are allowed")]
    UnsupportedScheme(String),

    #[error("failed to normalize URL: {0}")]
    NormalizationFailed(&'static str),
}

/// Normalizes a URL submitted for shortening.
///
/// Surrounding whitespace is trimmed, the host is lowercased, default ports
/// and fragments are dropped. Path and query are kept as given.
///
/// # Errors
///
/// Returns [`UrlNormalizationError`] for empty input, unparsable input, or a
/// scheme other than `http`/`https`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     normalize_url("  HTTPS://Example.COM:443/Path#top \n").unwrap(),
///     "https://example.com/Path"
/// );
/// ```
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlNormalizationError::Empty);
    }

    let mut url = Url::parse(trimmed).map_err(|e| UrlNormalizationError::Invalid {
        input: trimmed.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(UrlNormalizationError::UnsupportedScheme(other.to_string())),
    }

    if let Some(host) = url.host_str() {
        let lowered = host.to_ascii_lowercase();
        url.set_host(Some(&lowered))
            .map_err(|_| UrlNormalizationError::NormalizationFailed("cannot set host"))?;
    }

    url.set_fragment(None);

    if matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    ) {
        url.set_port(None)
            .map_err(|_| UrlNormalizationError::NormalizationFailed("cannot drop port"))?;
    }

    Ok(url.to_string())
}
