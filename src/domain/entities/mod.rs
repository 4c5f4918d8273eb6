//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures; persistence and caching live in
//! [`crate::infrastructure`].
//!
//! # Entity Types
//!
//! - [`ShortLink`] - A shortened URL mapping owned by a user
//! - [`DomainCount`] - How often an owner shortened URLs on a domain
//! - [`ApiToken`] - A hashed bearer token bound to a user
//!
//! `NewLink` is the creation-side counterpart of [`ShortLink`].

pub mod api_token;
pub mod domain_count;
pub mod link;

pub use api_token::ApiToken;
pub use domain_count::{DomainCount, sort_top_domains};
pub use link::{NewLink, ShortLink};
