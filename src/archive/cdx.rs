//! Streaming fetcher for the CDX index API.
//!
//! Issues one streaming GET per domain and parses the response line by line
//! as JSON `[url, timestamp]` rows, bucketing each usable row by file
//! extension. The first successfully parsed row is the column header and is
//! skipped; malformed lines are silently discarded.

use futures_util::StreamExt;
use tracing::{debug, error, info, instrument, warn};

use crate::records::{ExtensionBuckets, UrlRecord};

use super::client::{ArchiveClient, CDX_TIMEOUT};
use super::error::ArchiveError;
use super::retry::{RetryPolicy, RetryPrompt, OPERATOR_WAIT};

/// Fetches and buckets historical URLs for a domain.
#[derive(Debug)]
pub struct CdxFetcher<'a> {
    client: &'a ArchiveClient,
    policy: RetryPolicy,
}

impl<'a> CdxFetcher<'a> {
    /// Creates a fetcher with the given retry schedule.
    #[must_use]
    pub fn new(client: &'a ArchiveClient, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Fetches all indexed captures under `domain`, grouped by extension.
    ///
    /// Transient failures are retried per the policy; once the automatic
    /// budget is spent the operator decides via `prompt` whether to wait out
    /// [`OPERATOR_WAIT`] and start over. Giving up yields an empty bucket map
    /// so batch callers can move on to the next domain.
    #[instrument(skip(self, prompt))]
    pub async fn fetch_domain(&self, domain: &str, prompt: &dyn RetryPrompt) -> ExtensionBuckets {
        let url = self.client.cdx_search_url(domain);
        let mut attempt: u32 = 1;

        loop {
            match self.fetch_once(&url).await {
                Ok(buckets) => {
                    info!(domain, urls = buckets.total(), "CDX fetch complete");
                    return buckets;
                }
                Err(err) => match self.policy.delay_after(attempt) {
                    Some(delay) => {
                        warn!(
                            attempt,
                            error = %err,
                            delay_secs = delay.as_secs(),
                            "CDX fetch attempt failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    None => {
                        error!(
                            attempts = self.policy.max_attempts(),
                            error = %err,
                            "CDX fetch failed after all attempts; the server may be rate-limiting"
                        );
                        if prompt.wait_and_retry(domain) {
                            info!(
                                wait_secs = OPERATOR_WAIT.as_secs(),
                                "waiting before restarting the retry schedule"
                            );
                            tokio::time::sleep(OPERATOR_WAIT).await;
                            attempt = 1;
                        } else {
                            warn!(domain, "giving up on CDX fetch");
                            return ExtensionBuckets::new();
                        }
                    }
                },
            }
        }
    }

    /// Single fetch attempt: request, stream, parse.
    async fn fetch_once(&self, url: &str) -> Result<ExtensionBuckets, ArchiveError> {
        let response = self
            .client
            .http()
            .get(url)
            .timeout(CDX_TIMEOUT)
            .send()
            .await
            .map_err(|e| ArchiveError::request(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArchiveError::http_status(url, status.as_u16()));
        }

        let mut parser = LineParser::default();
        let mut stream = response.bytes_stream();
        let mut pending: Vec<u8> = Vec::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ArchiveError::request(url, e))?;
            pending.extend_from_slice(&chunk);
            while let Some(pos) = pending.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = pending.drain(..=pos).collect();
                parser.consume(&line[..pos]);
            }
        }
        parser.consume(&pending);

        debug!(
            rows = parser.rows,
            discarded = parser.discarded,
            "parsed CDX response"
        );
        Ok(parser.buckets)
    }
}

/// Incremental NDJSON row parser for the CDX response body.
#[derive(Debug, Default)]
struct LineParser {
    buckets: ExtensionBuckets,
    header_skipped: bool,
    rows: usize,
    discarded: usize,
}

impl LineParser {
    fn consume(&mut self, line: &[u8]) {
        let Ok(text) = std::str::from_utf8(line) else {
            self.discarded += 1;
            return;
        };
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let Ok(row) = serde_json::from_str::<Vec<String>>(text) else {
            self.discarded += 1;
            return;
        };
        // The first row that parses is the ["original","timestamp"] header.
        if !self.header_skipped {
            self.header_skipped = true;
            return;
        }
        if row.len() < 2 {
            self.discarded += 1;
            return;
        }
        let mut fields = row.into_iter();
        let url = fields.next().unwrap_or_default();
        let timestamp = fields.next().filter(|ts| !ts.is_empty());
        self.buckets.insert(UrlRecord::from_capture(url, timestamp));
        self.rows += 1;
    }
}
