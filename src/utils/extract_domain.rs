//! Domain extraction for per-owner metrics.

use url::Url;

/// Extracts the metrics domain from a long URL.
///
/// The domain is the lower-cased host with a single leading `www.` removed.
/// IP literals are kept as-is (IPv6 with brackets). Returns `None` for input
/// that does not parse or has no host, e.g. `mailto:` links.
pub fn extract_domain(long_url: &str) -> Option<String> {
    let url = Url::parse(long_url.trim()).ok()?;
    let host = url.host_str()?.to_ascii_lowercase();
    let domain = host.strip_prefix("www.").unwrap_or(&host);

    if domain.is_empty() {
        return None;
    }
    Some(domain.to_string())
}
