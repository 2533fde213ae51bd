//! Core domain entities.
//!
//! - [`Link`] - A stored short link (identifier and destination)
//! - [`HitRecord`] - One resolution event destined for the hit store
//! - [`RequestMeta`] - Client metadata a hit is built from

pub mod hit;
pub mod link;

pub use hit::{HitRecord, RequestMeta};
pub use link::Link;
