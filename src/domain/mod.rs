//! Domain layer containing business entities and logic.
//!
//! This module is independent of HTTP and database concerns. It defines the
//! entities, the repository interfaces the redirect flow depends on, the
//! short key codec, and the buffered hit worker.
//!
//! # Architecture
//!
//! - [`entities`] - Core data structures
//! - [`repositories`] - Data access trait definitions
//! - [`key_codec`] - Base-62 short key encoding
//! - [`hit_worker`] - Asynchronous hit recording
//!
//! # Hit Processing Flow
//!
//! 1. [`crate::application::services::RedirectService`] resolves a key
//! 2. A [`entities::HitRecord`] is appended through [`repositories::HitRepository`]
//! 3. With buffering enabled, [`hit_worker::run_hit_worker`] persists it with retry logic

pub mod entities;
pub mod hit_worker;
pub mod key_codec;
pub mod repositories;
