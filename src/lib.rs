//! Waybackscan Core Library
//!
//! This library provides the core functionality for the waybackscan tool,
//! which discovers historical URLs for a domain through the Wayback Machine's
//! CDX index, groups them by file extension, verifies archived snapshots, and
//! optionally downloads the archived files.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`archive`] - Wayback Machine HTTP access: CDX search, availability checks, retry policy
//! - [`config`] - Persisted settings and recent-domain history
//! - [`download`] - Streaming file downloads for archived copies
//! - [`extensions`] - Extension list file, presets, and domain list loading
//! - [`records`] - URL records, extension bucketing, and scan summaries
//! - [`report`] - JSON/TXT result files and static HTML reports
//! - [`scan`] - The end-to-end scan pipeline for one domain or a batch
//! - [`shell`] - Interactive menu shell

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod archive;
pub mod config;
pub mod download;
pub mod extensions;
pub mod records;
pub mod report;
pub mod scan;
pub mod shell;

// Re-export commonly used types
pub use archive::{
    AbortOnExhaustion, ArchiveClient, ArchiveEndpoints, ArchiveError, CdxFetcher, RetryPolicy,
    RetryPrompt, SnapshotVerifier,
};
pub use config::{Config, ConfigStore, CONFIG_FILE, DEFAULT_OUTPUT_DIR};
pub use download::{DownloadError, FileDownloader};
pub use extensions::{Preset, DEFAULT_EXTENSIONS_FILE};
pub use records::{DomainSummary, ExtensionBuckets, UrlRecord};
pub use report::ReportError;
pub use scan::{scan_batch, scan_domain, normalize_domain, BatchOutcome};
pub use shell::Shell;
