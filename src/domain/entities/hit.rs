//! Hit records captured for every resolved short key.

use chrono::{DateTime, Utc};

/// Client metadata extracted from an incoming redirect request.
///
/// Every field is optional: a header that was not sent, or an address the
/// transport could not determine, stays `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMeta {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

impl RequestMeta {
    /// Creates request metadata from borrowed header values.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let meta = RequestMeta::new(
    ///     Some("192.168.1.1".to_string()),
    ///     Some("Mozilla/5.0"),
    ///     None,
    /// );
    /// ```
    pub fn new(ip: Option<String>, user_agent: Option<&str>, referer: Option<&str>) -> Self {
        Self {
            ip,
            user_agent: user_agent.map(str::to_string),
            referer: referer.map(str::to_string),
        }
    }

    /// Sets the client address.
    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }
}

/// One resolution event, appended to the hit store.
///
/// Built once per successful resolution and handed off immediately; the
/// timestamp is taken at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitRecord {
    pub link_id: i64,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl HitRecord {
    /// Records a hit on `link_id` with the given request metadata.
    pub fn new(link_id: i64, meta: RequestMeta) -> Self {
        Self {
            link_id,
            client_ip: meta.ip,
            user_agent: meta.user_agent,
            referer: meta.referer,
            created_at: Utc::now(),
        }
    }
}
