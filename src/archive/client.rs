//! Shared HTTP client and endpoint configuration for archive.org APIs.

use std::time::Duration;

use reqwest::Client;

/// User-Agent sent with every API call.
pub const USER_AGENT: &str = concat!(
    "waybackscan/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/waybackscan/waybackscan)"
);

/// Connect timeout shared by all requests.
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Total request timeout for CDX index fetches. Index responses for large
/// domains can take minutes to stream.
pub const CDX_TIMEOUT: Duration = Duration::from_secs(120);

/// Total request timeout for availability checks.
pub const AVAILABILITY_TIMEOUT: Duration = Duration::from_secs(30);

/// Total request timeout for file downloads.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Base URLs for the two archive.org API hosts.
///
/// Injectable so tests can point the fetcher and verifier at a mock server.
#[derive(Debug, Clone)]
pub struct ArchiveEndpoints {
    /// Host serving `/cdx/search/cdx` (and `/web/<ts>/<url>` replays).
    pub cdx_base: String,

    /// Host serving `/wayback/available`.
    pub availability_base: String,
}

impl Default for ArchiveEndpoints {
    fn default() -> Self {
        Self {
            cdx_base: "https://web.archive.org".to_string(),
            availability_base: "https://archive.org".to_string(),
        }
    }
}

/// HTTP client for archive.org API calls.
///
/// Created once and shared across the fetcher, verifier and downloader so all
/// requests reuse the same connection pool and User-Agent.
#[derive(Debug, Clone)]
pub struct ArchiveClient {
    client: Client,
    endpoints: ArchiveEndpoints,
}

impl Default for ArchiveClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveClient {
    /// Creates a client against the production archive.org endpoints.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new() -> Self {
        Self::with_endpoints(ArchiveEndpoints::default())
    }

    /// Creates a client against custom endpoint bases (used by tests).
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_endpoints(endpoints: ArchiveEndpoints) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client, endpoints }
    }

    /// The underlying reqwest client.
    #[must_use]
    pub fn http(&self) -> &Client {
        &self.client
    }

    /// CDX index query URL for all captures under a domain, one row per
    /// unique URL key, with original URL and timestamp fields.
    #[must_use]
    pub fn cdx_search_url(&self, domain: &str) -> String {
        format!(
            "{}/cdx/search/cdx?url=*.{domain}/*&output=json&fl=original,timestamp&collapse=urlkey&page=/",
            self.endpoints.cdx_base
        )
    }

    /// Availability endpoint URL, before the `url` query parameter is added.
    #[must_use]
    pub fn availability_url(&self) -> String {
        format!("{}/wayback/available", self.endpoints.availability_base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cdx_search_url_shape() {
        let client = ArchiveClient::new();
        let url = client.cdx_search_url("example.com");
        assert!(url.starts_with("https://web.archive.org/cdx/search/cdx?"));
        assert!(url.contains("url=*.example.com/*"));
        assert!(url.contains("output=json"));
        assert!(url.contains("fl=original,timestamp"));
        assert!(url.contains("collapse=urlkey"));
    }

    #[test]
    fn test_custom_endpoints_are_used() {
        let client = ArchiveClient::with_endpoints(ArchiveEndpoints {
            cdx_base: "http://127.0.0.1:1234".to_string(),
            availability_base: "http://127.0.0.1:5678".to_string(),
        });
        assert!(client.cdx_search_url("x.org").starts_with("http://127.0.0.1:1234/"));
        assert_eq!(
            client.availability_url(),
            "http://127.0.0.1:5678/wayback/available"
        );
    }
}
