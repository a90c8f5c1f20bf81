//! Wayback Machine API plumbing: the shared HTTP client, the streaming CDX
//! index fetcher, the concurrent snapshot verifier, and the retry schedule
//! that governs fetch attempts.

pub mod availability;
pub mod cdx;
pub mod client;
pub mod error;
pub mod retry;

pub use availability::{SnapshotVerifier, VERIFY_BATCH_SIZE};
pub use cdx::CdxFetcher;
pub use client::{ArchiveClient, ArchiveEndpoints, USER_AGENT};
pub use error::ArchiveError;
pub use retry::{AbortOnExhaustion, RetryPolicy, RetryPrompt, MAX_FETCH_ATTEMPTS, OPERATOR_WAIT};
