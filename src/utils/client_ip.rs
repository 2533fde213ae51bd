//! Client address extraction for hit records.

use axum::http::HeaderMap;
use std::net::SocketAddr;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Determines the client IP address of a request.
///
/// The socket peer address is used unless `behind_proxy` is set, in which
/// case the first `X-Forwarded-For` entry, then `X-Real-IP`, take precedence.
/// Forwarding headers are ignored otherwise, since any client can send them.
///
/// # Examples
///
/// ```ignore
/// let mut headers = HeaderMap::new();
/// headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
///
/// let peer: SocketAddr = "10.0.0.1:5000".parse().unwrap();
/// assert_eq!(client_ip(&headers, peer, true), "203.0.113.7");
/// assert_eq!(client_ip(&headers, peer, false), "10.0.0.1");
/// ```
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr, behind_proxy: bool) -> String {
    if behind_proxy
        && let Some(ip) = forwarded_ip(headers)
    {
        return ip;
    }

    peer.ip().to_string()
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded_for = headers
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = || {
        headers
            .get(X_REAL_IP)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    forwarded_for.or_else(real_ip).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> SocketAddr {
        "10.0.0.1:5000".parse().unwrap()
    }

    #[test]
    fn test_peer_address_without_proxy() {
        let headers = HeaderMap::new();
        assert_eq!(client_ip(&headers, peer(), false), "10.0.0.1");
        assert_eq!(client_ip(&headers, peer(), true), "10.0.0.1");
    }

    #[test]
    fn test_forwarded_for_ignored_without_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("203.0.113.7"));

        assert_eq!(client_ip(&headers, peer(), false), "10.0.0.1");
    }

    #[test]
    fn test_first_forwarded_for_entry_behind_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert(
            X_FORWARDED_FOR,
            HeaderValue::from_static("203.0.113.7, 198.51.100.2"),
        );

        assert_eq!(client_ip(&headers, peer(), true), "203.0.113.7");
    }

    #[test]
    fn test_real_ip_fallback_behind_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert(X_REAL_IP, HeaderValue::from_static(" 198.51.100.9 "));

        assert_eq!(client_ip(&headers, peer(), true), "198.51.100.9");
    }

    #[test]
    fn test_empty_forwarded_for_falls_back() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static(""));

        assert_eq!(client_ip(&headers, peer(), true), "10.0.0.1");
    }

    #[test]
    fn test_ipv6_peer() {
        let peer: SocketAddr = "[::1]:8080".parse().unwrap();
        assert_eq!(client_ip(&HeaderMap::new(), peer, false), "::1");
    }
}
