//! Streaming downloader for archived files.
//!
//! Downloads one record at a time, preferring the verified snapshot URL, then
//! the derived replay URL, then the raw original. Each file streams into
//! `<output>/<domain>/downloads/` with a byte-progress bar when the server
//! reports a content length. A failed file never aborts the batch; the caller
//! paces downloads with [`DOWNLOAD_PACING`] between files.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};
use url::Url;

use crate::archive::client::{ArchiveClient, DOWNLOAD_TIMEOUT};
use crate::records::UrlRecord;

/// Fixed delay between files, applied by the pipeline.
pub const DOWNLOAD_PACING: Duration = Duration::from_millis(500);

/// Errors that can occur while downloading a single archived file.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The record's URL has no usable filename in its path.
    #[error("cannot derive a filename from {url}")]
    NoFilename {
        /// The URL without a path basename.
        url: String,
    },

    /// Network-level failure or timeout.
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// HTTP error response.
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Filesystem error while creating the directory or writing the file.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The path that could not be written.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Derives the destination filename from a URL: path basename with query and
/// fragment stripped. Returns `None` for unparseable or directory-style URLs.
#[must_use]
pub fn filename_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let basename = parsed.path().rsplit('/').next().unwrap_or("");
    if basename.is_empty() {
        return None;
    }
    Some(basename.to_string())
}

/// Downloads archived files for URL records.
#[derive(Debug)]
pub struct FileDownloader<'a> {
    client: &'a ArchiveClient,
}

impl<'a> FileDownloader<'a> {
    /// Creates a downloader sharing the archive HTTP client.
    #[must_use]
    pub fn new(client: &'a ArchiveClient) -> Self {
        Self { client }
    }

    /// Downloads one record into `<output_dir>/<domain>/downloads/`.
    ///
    /// # Errors
    ///
    /// Returns a [`DownloadError`] when no filename can be derived, the
    /// request fails, the server responds with an error status, or the file
    /// cannot be written. Callers treat any error as a per-file failure.
    #[instrument(skip(self, record), fields(url = %record.download_url()))]
    pub async fn download_record(
        &self,
        record: &UrlRecord,
        output_dir: &Path,
        domain: &str,
    ) -> Result<PathBuf, DownloadError> {
        let url = record.download_url();
        let filename = filename_from_url(url).ok_or_else(|| DownloadError::NoFilename {
            url: url.to_string(),
        })?;

        let download_dir = output_dir.join(domain).join("downloads");
        fs::create_dir_all(&download_dir)
            .await
            .map_err(|source| DownloadError::Io {
                path: download_dir.clone(),
                source,
            })?;
        let dest = download_dir.join(&filename);

        let response = self
            .client
            .http()
            .get(url)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .await
            .map_err(|source| DownloadError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let progress = response.content_length().map(|total| {
            let bar = ProgressBar::new(total);
            bar.set_style(
                ProgressStyle::with_template("{msg} {bar:30.cyan/blue} {bytes}/{total_bytes}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar.set_message(filename.clone());
            bar
        });

        let mut file = fs::File::create(&dest)
            .await
            .map_err(|source| DownloadError::Io {
                path: dest.clone(),
                source,
            })?;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|source| DownloadError::Network {
                url: url.to_string(),
                source,
            })?;
            file.write_all(&chunk)
                .await
                .map_err(|source| DownloadError::Io {
                    path: dest.clone(),
                    source,
                })?;
            if let Some(bar) = &progress {
                bar.inc(chunk.len() as u64);
            }
        }
        file.flush().await.map_err(|source| DownloadError::Io {
            path: dest.clone(),
            source,
        })?;

        if let Some(bar) = progress {
            bar.finish_and_clear();
        }
        debug!(path = %dest.display(), "downloaded file");
        Ok(dest)
    }
}
