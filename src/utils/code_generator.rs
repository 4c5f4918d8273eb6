//! Short code derivation and validation.
//!
//! Codes are a deterministic function of the normalized URL, so shortening
//! the same URL from two servers at once produces the same code and the
//! second insert is ignored.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::LazyLock;

/// Length of every derived code.
pub const CODE_LENGTH: usize = 8;

/// How many salted derivations are tried before giving up on a URL.
pub const MAX_CODE_ATTEMPTS: u32 = 10;

static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{4,12}$").expect("valid code regex"));

/// Derives the short code for `normalized_url`.
///
/// Attempt 0 hashes the URL alone; later attempts append `#<attempt>` so a
/// collision with a different URL yields a fresh candidate. The SHA-256
/// digest is encoded as URL-safe base64 and cut to [`CODE_LENGTH`] characters.
pub fn derive_code(normalized_url: &str, attempt: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalized_url.as_bytes());
    if attempt > 0 {
        hasher.update(format!("#{attempt}").as_bytes());
    }

    let mut code = URL_SAFE_NO_PAD.encode(hasher.finalize());
    code.truncate(CODE_LENGTH);
    code
}

/// Returns true if `code` could have been issued by this service.
///
/// Redirect lookups reject anything else before touching a store.
pub fn is_valid_code(code: &str) -> bool {
    CODE_RE.is_match(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_derive_code_is_deterministic() {
        let a = derive_code("https://example.com/", 0);
        let b = derive_code("https://example.com/", 0);
        assert_eq!(a, b);
        assert_eq!(a.len(), CODE_LENGTH);
        assert!(is_valid_code(&a));
    }

    #[test]
    fn test_attempts_produce_distinct_codes() {
        let codes: HashSet<String> = (0..MAX_CODE_ATTEMPTS)
            .map(|attempt| derive_code("https://example.com/", attempt))
            .collect();
        assert_eq!(codes.len(), MAX_CODE_ATTEMPTS as usize);
    }

    #[test]
    fn test_different_urls_differ() {
        assert_ne!(
            derive_code("https://a.com/", 0),
            derive_code("https://b.com/", 0)
        );
    }

    #[test]
    fn test_is_valid_code() {
        assert!(is_valid_code("abcd"));
        assert!(is_valid_code("aB3_-xYz"));
        assert!(!is_valid_code("abc"));
        assert!(!is_valid_code("abcdefghijklm"));
        assert!(!is_valid_code("has space"));
        assert!(!is_valid_code("favicon.ico"));
    }
}
