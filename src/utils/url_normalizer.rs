//! URL normalization.
//!
//! Ensures the same destination always maps to the same stored string so
//! re-shortening finds the existing code.

use url::Url;

/// Errors that can occur during URL normalization.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("URL must not be empty")]
    Empty,

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,
}

/// Normalizes a URL to a canonical form.
///
/// # Normalization Rules
///
/// 1. Surrounding whitespace is trimmed
/// 2. The fragment (`#section`) is removed
/// 3. A single trailing slash is removed from the path, except for the root path
/// 4. Scheme and host are lower-cased and default ports dropped (the `url`
///    crate does this while parsing; a bare origin is rendered with its root
///    path, `https://example.com` becomes `https://example.com/`)
/// 5. Query parameters and path case are preserved
///
/// Input that does not parse as an absolute URL is returned trimmed but
/// otherwise untouched.
///
/// # Errors
///
/// Returns [`UrlNormalizationError::Empty`] for blank input and
/// [`UrlNormalizationError::UnsupportedProtocol`] for parseable non-HTTP(S)
/// URLs such as `javascript:` or `file:`.
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlNormalizationError::Empty);
    }

    let Ok(mut url) = Url::parse(trimmed) else {
        return Ok(trimmed.to_string());
    };

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlNormalizationError::UnsupportedProtocol),
    }

    url.set_fragment(None);

    let path = url.path();
    if path.len() > 1
        && let Some(stripped) = path.strip_suffix('/')
    {
        let stripped = stripped.to_string();
        url.set_path(&stripped);
    }

    Ok(url.to_string())
}
