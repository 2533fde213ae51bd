//! Application layer services implementing business logic.
//!
//! Services consume repository traits and give HTTP handlers a small API
//! that hides key decoding and storage details.
//!
//! # Available Services
//!
//! - [`services::redirect_service::RedirectService`] - Short key resolution and hit recording

pub mod services;
