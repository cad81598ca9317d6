//! Error types for the sync engine and its collaborators.
//!
//! None of these are fatal to a session:
//! - [`NetworkError`]: a page fetch failed; the last good page is kept.
//! - [`StorageError`]: persisting or loading the selection failed; the
//!   in-memory selection stays authoritative.
//! - [`LookupError`]: a toggle referenced a record that is not on the
//!   currently loaded page.

/// Failure to fetch a page from a record source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    /// The request never produced a response (connect, timeout, TLS).
    #[error("request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body could not be decoded into records.
    #[error("invalid response body: {0}")]
    Decode(String),
}

/// Failure to read or write the persisted selection.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored selection is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The storage slot exists but does not hold a selection.
    #[error("storage slot '{slot}' is corrupt: {reason}")]
    Corrupt { slot: String, reason: String },
}

/// A toggle referenced an id that cannot be resolved to a loaded record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("record {id} is not on the currently loaded page")]
    NotOnPage { id: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_error_display() {
        let err = NetworkError::Status {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "unexpected status 503: unavailable");
    }

    #[test]
    fn lookup_error_display() {
        let err = LookupError::NotOnPage { id: 42 };
        assert!(err.to_string().contains("record 42"));
    }

    #[test]
    fn storage_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err: StorageError = io.into();
        assert!(matches!(err, StorageError::Io(_)));
    }
}
