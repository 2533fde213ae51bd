//! Repository trait definitions for the domain layer.
//!
//! These traits are the seams between the redirect flow and its storage.
//! Implementations live in `crate::infrastructure`; mock implementations are
//! generated via `mockall` for unit tests.
//!
//! - [`LinkRepository`] - Link lookup by identifier
//! - [`HitRepository`] - Hit record append

pub mod hit_repository;
pub mod link_repository;

pub use hit_repository::HitRepository;
pub use link_repository::LinkRepository;

#[cfg(test)]
pub use hit_repository::MockHitRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
