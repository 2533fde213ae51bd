//! Link entity representing a stored short link.

/// A previously created short link.
///
/// Read-only from the redirect service's perspective: records are created and
/// removed by the link management side, which owns the `url_records` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub id: i64,
    pub destination: String,
}

impl Link {
    /// Creates a new Link instance.
    pub fn new(id: i64, destination: impl Into<String>) -> Self {
        Self {
            id,
            destination: destination.into(),
        }
    }
}
