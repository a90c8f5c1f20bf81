//! Concurrent snapshot verification against the availability endpoint.
//!
//! Records are processed in fixed-size batches to cap concurrent load on the
//! API. Within a batch each record is checked by its own worker, bounded by
//! the configured worker cap. A record is enriched only when the endpoint
//! reports a closest snapshot with HTTP status "200"; on any error the record
//! passes through unmodified. Results arrive in completion order - callers
//! re-sort by timestamp, not list position.

use std::time::Duration;

use futures_util::StreamExt;
use indicatif::ProgressBar;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::records::UrlRecord;

use super::client::{ArchiveClient, AVAILABILITY_TIMEOUT};
use super::error::ArchiveError;

/// Records checked per verification batch.
pub const VERIFY_BATCH_SIZE: usize = 20;

/// Fixed pacing delay between completed checks. Not adaptive backoff, just
/// a courtesy gap so batches do not hammer the API.
const CHECK_PACING: Duration = Duration::from_millis(200);

#[derive(Debug, Default, Deserialize)]
struct AvailabilityResponse {
    #[serde(default)]
    archived_snapshots: ArchivedSnapshots,
}

#[derive(Debug, Default, Deserialize)]
struct ArchivedSnapshots {
    closest: Option<ClosestSnapshot>,
}

#[derive(Debug, Deserialize)]
struct ClosestSnapshot {
    url: Option<String>,
    status: Option<String>,
    timestamp: Option<String>,
}

impl ClosestSnapshot {
    /// Extracts the snapshot link when it is live (status "200").
    fn into_verified(self) -> Option<(String, Option<String>)> {
        match (self.url, self.status.as_deref()) {
            (Some(url), Some("200")) => Some((url, self.timestamp)),
            _ => None,
        }
    }
}

/// Checks snapshot availability for lists of URL records.
#[derive(Debug)]
pub struct SnapshotVerifier<'a> {
    client: &'a ArchiveClient,
    max_workers: usize,
}

impl<'a> SnapshotVerifier<'a> {
    /// Creates a verifier with the given worker cap.
    #[must_use]
    pub fn new(client: &'a ArchiveClient, max_workers: usize) -> Self {
        Self {
            client,
            max_workers: max_workers.max(1),
        }
    }

    /// Verifies every record, enriching those with a live snapshot.
    ///
    /// Never drops or duplicates records: the output length always equals the
    /// input length. Output order is completion order, not input order.
    #[instrument(skip_all, fields(records = records.len(), max_workers = self.max_workers))]
    pub async fn verify(
        &self,
        records: Vec<UrlRecord>,
        progress: Option<&ProgressBar>,
    ) -> Vec<UrlRecord> {
        let mut results = Vec::with_capacity(records.len());
        let mut remaining = records.into_iter().peekable();

        while remaining.peek().is_some() {
            let batch: Vec<UrlRecord> = remaining.by_ref().take(VERIFY_BATCH_SIZE).collect();
            let workers = self.max_workers.min(batch.len());

            let mut checks = futures_util::stream::iter(
                batch.into_iter().map(|record| self.check_record(record)),
            )
            .buffer_unordered(workers);

            while let Some(record) = checks.next().await {
                results.push(record);
                if let Some(bar) = progress {
                    bar.inc(1);
                }
                tokio::time::sleep(CHECK_PACING).await;
            }
        }

        results
    }

    /// Checks one record, returning it unmodified on any error.
    async fn check_record(&self, mut record: UrlRecord) -> UrlRecord {
        match self.query_availability(&record.url).await {
            Ok(Some((snapshot_url, snapshot_timestamp))) => {
                record.snapshot_url = Some(snapshot_url);
                record.snapshot_timestamp = snapshot_timestamp;
            }
            Ok(None) => {}
            Err(error) => {
                debug!(url = %record.url, %error, "snapshot check failed");
            }
        }
        record
    }

    async fn query_availability(
        &self,
        url: &str,
    ) -> Result<Option<(String, Option<String>)>, ArchiveError> {
        let endpoint = self.client.availability_url();
        let response = self
            .client
            .http()
            .get(&endpoint)
            .query(&[("url", url)])
            .timeout(AVAILABILITY_TIMEOUT)
            .send()
            .await
            .map_err(|e| ArchiveError::request(&endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArchiveError::http_status(&endpoint, status.as_u16()));
        }

        let body: AvailabilityResponse = response
            .json()
            .await
            .map_err(|e| ArchiveError::request(&endpoint, e))?;

        Ok(body
            .archived_snapshots
            .closest
            .and_then(ClosestSnapshot::into_verified))
    }
}
