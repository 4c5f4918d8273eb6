//! Helper functions used across the application.
//!
//! - [`code_generator`] - Deterministic short code derivation and validation
//! - [`url_normalizer`] - URL normalization
//! - [`extract_domain`] - Metrics domain extraction from long URLs
//! - [`client_ip`] - Anonymous principal address resolution
//! - [`deadline`] - Timeouts for storage calls

pub mod client_ip;
pub mod code_generator;
pub mod deadline;
pub mod extract_domain;
pub mod url_normalizer;
