//! Error taxonomy for snapshot operations.
//!
//! Every library operation returns [`Result`]; the orchestration layer in
//! [`crate::pipeline`] decides whether a failure stops the current step or
//! is reported and skipped.

use std::io;

use thiserror::Error;

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, SnapshotError>;

/// Failure kinds raised while fetching, storing, grouping, or searching
/// collections.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// No collection is stored under the given name.
    #[error("{0} not found")]
    NotFound(String),

    #[error("I/O error on collection '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },

    /// Stored content (or a fetched body) is not valid JSON.
    #[error("malformed JSON in '{name}': {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("request for '{resource}' failed: {reason}")]
    Request { resource: String, reason: String },

    /// A `userId` has no matching username in the identity map.
    #[error("no username resolves for user id {0}")]
    Lookup(i64),

    /// A record lacks a field the operation depends on, or holds the wrong type.
    #[error("invalid record in '{collection}': {reason}")]
    InvalidRecord { collection: String, reason: String },

    /// A derived collection name would overwrite a reserved collection.
    #[error("derived collection name '{0}' collides with a reserved collection")]
    NameCollision(String),

    /// The name is not a single plain file name (separators, `.`, `..`, empty).
    #[error("'{0}' is not a valid collection name")]
    InvalidName(String),

    #[error("console output failed: {0}")]
    Output(#[from] io::Error),
}

impl SnapshotError {
    pub(crate) fn invalid(collection: &str, reason: impl Into<String>) -> Self {
        SnapshotError::InvalidRecord {
            collection: collection.to_string(),
            reason: reason.into(),
        }
    }

    /// True when the error means "nothing stored under that name".
    pub fn is_not_found(&self) -> bool {
        matches!(self, SnapshotError::NotFound(_))
    }
}

impl From<reqwest::Error> for SnapshotError {
    fn from(err: reqwest::Error) -> Self {
        let resource = err
            .url()
            .and_then(|u| u.path_segments())
            .and_then(|mut segs| segs.next_back().map(str::to_string))
            .unwrap_or_default();
        SnapshotError::Request {
            resource,
            reason: err.to_string(),
        }
    }
}
