//! Domain layer containing business entities and ports.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Durable storage trait definitions
//! - [`principal`] - Rate-limit subject identity
//! - [`clock`] - Time source port
//! - [`expiry_sweeper`] - Background purge of expired links
//!
//! # Design Principles
//!
//! - Domain layer has no dependencies on infrastructure or presentation layers
//! - Repository traits define contracts implemented by infrastructure layer
//! - Business logic is encapsulated in services (see [`crate::application::services`])

pub mod clock;
pub mod entities;
pub mod expiry_sweeper;
pub mod principal;
pub mod repositories;
