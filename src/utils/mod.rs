//! Utility functions for request handling.
//!
//! - [`client_ip`] - Client address extraction from the peer socket and proxy headers

pub mod client_ip;
