//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - Link lookup by identifier
//! - [`PgHitRepository`] - Hit record append

pub mod pg_hit_repository;
pub mod pg_link_repository;

pub use pg_hit_repository::PgHitRepository;
pub use pg_link_repository::PgLinkRepository;
