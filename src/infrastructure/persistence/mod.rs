//! Durable storage implementations of the domain repository traits.
//!
//! PostgreSQL variants use SQLx with bound parameters; in-memory variants
//! keep state in maps behind `tokio::sync::RwLock` for tests and local runs.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] / [`MemoryLinkRepository`] - Links and domain counts
//! - [`PgTokenRepository`] / [`MemoryTokenRepository`] - API token storage and validation

pub mod memory_link_repository;
pub mod memory_token_repository;
pub mod pg_link_repository;
pub mod pg_token_repository;

pub use memory_link_repository::MemoryLinkRepository;
pub use memory_token_repository::MemoryTokenRepository;
pub use pg_link_repository::PgLinkRepository;
pub use pg_token_repository::PgTokenRepository;
