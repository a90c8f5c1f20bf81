//! Error types for Wayback Machine API calls.

use thiserror::Error;

/// Errors from the CDX index and availability endpoints.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Network-level error (DNS, connection refused, TLS, mid-stream drop).
    #[error("network error querying {url}: {source}")]
    Network {
        /// The endpoint URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout querying {url}")]
    Timeout {
        /// The endpoint URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx, 5xx).
    #[error("HTTP {status} querying {url}")]
    HttpStatus {
        /// The endpoint URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },
}

impl ArchiveError {
    /// Creates a network or timeout error from a reqwest error.
    pub fn request(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Network { url, source }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }
}
