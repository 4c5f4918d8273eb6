//! DTOs for link shortening endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use validator::Validate;

/// Request to shorten a single URL.
///
/// Scheme checks happen during normalization, so `url` is only bounded here.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    #[validate(length(min = 1, max = 2048, message = "URL must be 1 to 2048 characters"))]
    pub url: String,

    /// Days until the link expires. Absent or `0` means never.
    #[validate(range(max = 3650, message = "expiry_days must be at most 3650"))]
    pub expiry_days: Option<u32>,
}

#[skip_serializing_none]
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub code: String,
    pub short_url: String,
    pub expires_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_validation() {
        let ok: ShortenRequest =
            serde_json::from_str(r#"{"url":"https://example.com","expiry_days":30}"#).unwrap();
        assert!(ok.validate().is_ok());

        let empty: ShortenRequest = serde_json::from_str(r#"{"url":""}"#).unwrap();
        assert!(empty.validate().is_err());

        let too_long = ShortenRequest {
            url: format!("https://example.com/{}", "a".repeat(2048)),
            expiry_days: None,
        };
        assert!(too_long.validate().is_err());

        let far_future: ShortenRequest =
            serde_json::from_str(r#"{"url":"https://example.com","expiry_days":3651}"#).unwrap();
        assert!(far_future.validate().is_err());
    }

    #[test]
    fn test_response_omits_missing_expiry() {
        let response = ShortenResponse {
            code: "abc12345".to_string(),
            short_url: "http://localhost:8080/abc12345".to_string(),
            expires_at: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("expires_at").is_none());
        assert_eq!(json["code"], "abc12345");
    }
}
