//! Error types for homebrew-dl
//!
//! Transport failures and destination-write failures are distinct variants:
//! a caller retrying a flaky network and a caller prompting the user to free
//! up SD-card space need to tell them apart.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for homebrew-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for homebrew-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "fetch.max_redirects")
        key: Option<String>,
    },

    /// Network/transport error (DNS, connect, TLS, timeout, body read)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Server answered with a non-success HTTP status
    #[error("HTTP error {status} fetching {url}")]
    HttpStatus {
        /// The status code the server returned
        status: u16,
        /// The URL that was requested
        url: String,
    },

    /// The destination file could not be created or written
    #[error("failed to write destination {path}: {source}")]
    Destination {
        /// The destination path that could not be written
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Catalog store file is missing, unparsable, or has no usable info block
    #[error("invalid store: {0}")]
    InvalidStore(String),

    /// Downloaded payload did not match the expected SHA-256 digest
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// The digest the caller expected (lowercase hex)
        expected: String,
        /// The digest actually computed over the payload (lowercase hex)
        actual: String,
    },

    /// Insufficient disk space at the destination
    #[error("insufficient disk space: need {required} bytes, have {available} bytes")]
    InsufficientSpace {
        /// Number of bytes required for the download
        required: u64,
        /// Number of bytes currently available on disk
        available: u64,
    },

    /// Failed to check disk space
    #[error("failed to check disk space: {0}")]
    DiskSpaceCheckFailed(String),
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_display_includes_status_and_url() {
        let err = Error::HttpStatus {
            status: 404,
            url: "https://example.com/db.unistore".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("404"), "message should name the status: {msg}");
        assert!(
            msg.contains("https://example.com/db.unistore"),
            "message should name the URL: {msg}"
        );
    }

    #[test]
    fn destination_display_includes_path_and_cause() {
        let err = Error::Destination {
            path: PathBuf::from("/mnt/sd/apps/game.bin"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only card"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/mnt/sd/apps/game.bin"));
        assert!(msg.contains("read-only card"));
    }

    #[test]
    fn destination_is_distinct_from_plain_io() {
        // A failed destination write must not collapse into Error::Io;
        // callers match on the variant to decide policy.
        let dest = Error::Destination {
            path: PathBuf::from("/out"),
            source: std::io::Error::other("denied"),
        };
        assert!(matches!(dest, Error::Destination { .. }));

        let io: Error = std::io::Error::other("denied").into();
        assert!(matches!(io, Error::Io(_)));
    }

    #[test]
    fn checksum_mismatch_display_includes_both_digests() {
        let err = Error::ChecksumMismatch {
            expected: "aaaa".into(),
            actual: "bbbb".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("aaaa") && msg.contains("bbbb"));
    }

    #[test]
    fn insufficient_space_display_includes_byte_counts() {
        let err = Error::InsufficientSpace {
            required: 1_048_576,
            available: 512,
        };
        let msg = err.to_string();
        assert!(msg.contains("1048576"), "required bytes missing: {msg}");
        assert!(msg.contains("512"), "available bytes missing: {msg}");
    }

    #[test]
    fn serde_error_converts_via_from() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: Error = parse_err.into();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
