//! Data model for discovered archive captures.
//!
//! A [`UrlRecord`] is created by the CDX fetcher for every capture with a
//! recognizable file extension, optionally enriched by the snapshot verifier,
//! and serialized as-is into the per-extension JSON reports. Records are
//! grouped into [`ExtensionBuckets`] keyed by lowercase extension.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single URL discovered in the Wayback Machine index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    /// The original URL as captured.
    pub url: String,

    /// CDX capture timestamp (`YYYYMMDDHHMMSS`), when present.
    pub timestamp: Option<String>,

    /// Archive replay URL derived from the capture timestamp.
    pub archived_url: Option<String>,

    /// Verified live snapshot URL, set by the snapshot verifier.
    pub snapshot_url: Option<String>,

    /// Timestamp of the verified snapshot.
    pub snapshot_timestamp: Option<String>,
}

impl UrlRecord {
    /// Builds a record from a CDX capture row.
    ///
    /// The replay URL is derived as
    /// `https://web.archive.org/web/<timestamp>/<url>` when a timestamp is
    /// present. Snapshot fields start empty and are filled in by verification.
    #[must_use]
    pub fn from_capture(url: impl Into<String>, timestamp: Option<String>) -> Self {
        let url = url.into();
        let archived_url = timestamp
            .as_deref()
            .map(|ts| format!("https://web.archive.org/web/{ts}/{url}"));
        Self {
            url,
            timestamp,
            archived_url,
            snapshot_url: None,
            snapshot_timestamp: None,
        }
    }

    /// Returns the best URL to download from: verified snapshot first, then
    /// the derived replay URL, then the raw original.
    #[must_use]
    pub fn download_url(&self) -> &str {
        self.snapshot_url
            .as_deref()
            .or(self.archived_url.as_deref())
            .unwrap_or(&self.url)
    }

    /// Whether the record points at an archived copy (replay or snapshot).
    #[must_use]
    pub fn has_archived_copy(&self) -> bool {
        self.snapshot_url.is_some() || self.archived_url.is_some()
    }
}

/// Extracts the file extension from a URL's path component.
///
/// Query string and fragment are stripped first, the extension is taken from
/// the final path segment, lowercased, without the leading dot. Returns `None`
/// for paths without an extension (including dotfiles and trailing dots).
#[must_use]
pub fn extension_of(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let basename = path.rsplit('/').next().unwrap_or(path);
    let dot = basename.rfind('.')?;
    if dot == 0 || dot + 1 == basename.len() {
        return None;
    }
    Some(basename[dot + 1..].to_ascii_lowercase())
}

/// URL records grouped by file extension.
///
/// Keys are lowercase extensions without the leading dot. Iteration order is
/// alphabetical; per-extension lists are sorted newest-first when saved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionBuckets(BTreeMap<String, Vec<UrlRecord>>);

impl ExtensionBuckets {
    /// Creates an empty bucket map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record into the bucket derived from its URL.
    ///
    /// Records whose URL carries no path extension are dropped.
    pub fn insert(&mut self, record: UrlRecord) {
        if let Some(ext) = extension_of(&record.url) {
            self.0.entry(ext).or_default().push(record);
        }
    }

    /// Keeps only the requested extensions. An empty filter keeps everything.
    ///
    /// Returns the extensions that were discovered but not requested.
    pub fn retain_extensions(&mut self, extensions: &[String]) -> Vec<String> {
        if extensions.is_empty() {
            return Vec::new();
        }
        let extra: Vec<String> = self
            .0
            .keys()
            .filter(|ext| !extensions.contains(ext))
            .cloned()
            .collect();
        self.0.retain(|ext, _| extensions.contains(ext));
        extra
    }

    /// Sorts every bucket descending by capture timestamp.
    ///
    /// Records without a timestamp sort last.
    pub fn sort_newest_first(&mut self) {
        for records in self.0.values_mut() {
            records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        }
    }

    /// Replaces bucket contents with the given records, regrouped by the
    /// extension of each record's URL. Used to fold verification results back
    /// into existing buckets; records for unknown extensions are ignored.
    pub fn refill(&mut self, records: Vec<UrlRecord>) {
        for bucket in self.0.values_mut() {
            bucket.clear();
        }
        for record in records {
            let Some(ext) = extension_of(&record.url) else {
                continue;
            };
            if let Some(bucket) = self.0.get_mut(&ext) {
                bucket.push(record);
            }
        }
        self.sort_newest_first();
    }

    /// All records across buckets, in bucket iteration order.
    #[must_use]
    pub fn flatten(&self) -> Vec<UrlRecord> {
        self.0.values().flatten().cloned().collect()
    }

    /// Record count per extension.
    #[must_use]
    pub fn counts(&self) -> BTreeMap<String, usize> {
        self.0
            .iter()
            .map(|(ext, records)| (ext.clone(), records.len()))
            .collect()
    }

    /// Total number of records across all buckets.
    #[must_use]
    pub fn total(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// True when no bucket holds any record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Iterates over `(extension, records)` pairs alphabetically.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<UrlRecord>)> {
        self.0.iter()
    }
}

/// Per-domain scan summary, written next to the extension reports and read
/// back by batch reporting and the results browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainSummary {
    /// The scanned domain.
    pub domain: String,

    /// Scan date in RFC 3339 format.
    pub scan_date: String,

    /// Total number of records across all saved extensions.
    pub total_urls: usize,

    /// Record count per extension.
    pub extensions: BTreeMap<String, usize>,
}
