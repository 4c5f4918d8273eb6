//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence, caching and counters.
//!
//! # Modules
//!
//! - [`cache`] - Key/value cache (Redis, in-memory and no-op implementations)
//! - [`clock`] - System and manually driven clocks
//! - [`counter`] - Atomic counters backing the rate limiter
//! - [`persistence`] - PostgreSQL and in-memory repository implementations
//! - [`redis`] - Shared Redis connection setup

pub mod cache;
pub mod clock;
pub mod counter;
pub mod persistence;
pub mod redis;
