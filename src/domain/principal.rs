//! Rate-limit subject identity.

use std::fmt;

/// The subject a request is counted against.
///
/// Authenticated requests are keyed by user id, anonymous ones by client IP.
/// The rendered form (`user:<id>` / `ip:<address>`) is used verbatim as
/// counter key material.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PrincipalKey {
    User(i64),
    Ip(String),
}

impl PrincipalKey {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, PrincipalKey::User(_))
    }
}

impl fmt::Display for PrincipalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrincipalKey::User(id) => write!(f, "user:{}", id),
            PrincipalKey::Ip(addr) => write!(f, "ip:{}", addr),
        }
    }
}
