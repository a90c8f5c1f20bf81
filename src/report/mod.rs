//! Report persistence: per-extension URL lists (JSON + TXT), per-domain
//! summaries, and the static HTML reports in [`html`].
//!
//! Layout under the output directory:
//!
//! ```text
//! <output>/<domain>/<domain>_<ext>_urls.json
//! <output>/<domain>/<domain>_<ext>_urls.txt
//! <output>/<domain>/<domain>_summary.json
//! <output>/<domain>/<domain>_report.html
//! <output>/batch_summary_report.html
//! ```

pub mod html;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use thiserror::Error;
use tracing::info;

use crate::records::{DomainSummary, ExtensionBuckets, UrlRecord};

/// Errors from report reading and writing.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Filesystem error.
    #[error("IO error on {path}: {source}")]
    Io {
        /// The path involved.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// JSON (de)serialization error.
    #[error("JSON error on {path}: {source}")]
    Json {
        /// The path involved.
        path: PathBuf,
        /// The underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}

impl ReportError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

/// Per-domain output directory.
#[must_use]
pub fn domain_dir(output_dir: &Path, domain: &str) -> PathBuf {
    output_dir.join(domain)
}

/// Path of the summary JSON for a domain.
#[must_use]
pub fn summary_path(output_dir: &Path, domain: &str) -> PathBuf {
    domain_dir(output_dir, domain).join(format!("{domain}_summary.json"))
}

fn bucket_json_path(dir: &Path, domain: &str, ext: &str) -> PathBuf {
    dir.join(format!("{domain}_{ext}_urls.json"))
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), ReportError> {
    let body = serde_json::to_string_pretty(value).map_err(|e| ReportError::json(path, e))?;
    fs::write(path, body).map_err(|e| ReportError::io(path, e))
}

/// Writes the JSON and TXT file for every non-empty bucket plus the summary
/// JSON, sorting buckets newest-first beforehand. Returns the summary.
///
/// # Errors
///
/// Returns a [`ReportError`] when the output tree cannot be created or a file
/// cannot be written.
pub fn save_buckets(
    output_dir: &Path,
    domain: &str,
    buckets: &mut ExtensionBuckets,
) -> Result<DomainSummary, ReportError> {
    let dir = domain_dir(output_dir, domain);
    fs::create_dir_all(&dir).map_err(|e| ReportError::io(&dir, e))?;

    buckets.sort_newest_first();

    let mut extensions = std::collections::BTreeMap::new();
    let mut total_urls = 0;
    for (ext, records) in buckets.iter() {
        if records.is_empty() {
            continue;
        }
        write_json(&bucket_json_path(&dir, domain, ext), records)?;

        let txt_path = dir.join(format!("{domain}_{ext}_urls.txt"));
        let mut body = records
            .iter()
            .map(|r| r.url.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        body.push('\n');
        fs::write(&txt_path, body).map_err(|e| ReportError::io(&txt_path, e))?;

        info!(domain, ext, count = records.len(), "saved extension bucket");
        extensions.insert(ext.clone(), records.len());
        total_urls += records.len();
    }

    let summary = DomainSummary {
        domain: domain.to_string(),
        scan_date: Local::now().to_rfc3339(),
        total_urls,
        extensions,
    };
    write_json(&summary_path(output_dir, domain), &summary)?;
    Ok(summary)
}

/// Rewrites the per-extension JSON files after verification enriched the
/// records. TXT files and the summary are unchanged: URLs and counts did not
/// move, only snapshot fields were filled in.
///
/// # Errors
///
/// Returns a [`ReportError`] when a file cannot be written.
pub fn update_bucket_json(
    output_dir: &Path,
    domain: &str,
    buckets: &ExtensionBuckets,
) -> Result<(), ReportError> {
    let dir = domain_dir(output_dir, domain);
    for (ext, records) in buckets.iter() {
        if records.is_empty() {
            continue;
        }
        write_json(&bucket_json_path(&dir, domain, ext), records)?;
    }
    Ok(())
}

/// Reads a bucket JSON back into records (order-preserving).
///
/// # Errors
///
/// Returns a [`ReportError`] when the file is missing or malformed.
pub fn read_bucket_json(
    output_dir: &Path,
    domain: &str,
    ext: &str,
) -> Result<Vec<UrlRecord>, ReportError> {
    let path = bucket_json_path(&domain_dir(output_dir, domain), domain, ext);
    let raw = fs::read_to_string(&path).map_err(|e| ReportError::io(&path, e))?;
    serde_json::from_str(&raw).map_err(|e| ReportError::json(&path, e))
}

/// Reads a domain's summary JSON.
///
/// # Errors
///
/// Returns a [`ReportError`] when the file is missing or malformed. Batch
/// reporting and the results browser treat this as "failed or incomplete"
/// rather than aborting.
pub fn read_summary(output_dir: &Path, domain: &str) -> Result<DomainSummary, ReportError> {
    let path = summary_path(output_dir, domain);
    let raw = fs::read_to_string(&path).map_err(|e| ReportError::io(&path, e))?;
    serde_json::from_str(&raw).map_err(|e| ReportError::json(&path, e))
}

/// Lists domains that have a result directory under `output_dir`, sorted.
#[must_use]
pub fn scanned_domains(output_dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(output_dir) else {
        return Vec::new();
    };
    let mut domains: Vec<String> = entries
        .flatten()
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    domains.sort_unstable();
    domains
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::records::UrlRecord;
    use tempfile::TempDir;

    fn sample_buckets() -> ExtensionBuckets {
        let mut buckets = ExtensionBuckets::new();
        buckets.insert(UrlRecord::from_capture(
            "http://example.com/old.pdf",
            Some("20180101000000".to_string()),
        ));
        buckets.insert(UrlRecord::from_capture(
            "http://example.com/new.pdf",
            Some("20240101000000".to_string()),
        ));
        buckets.insert(UrlRecord::from_capture(
            "http://example.com/page.html",
            Some("20200101000000".to_string()),
        ));
        buckets
    }

    #[test]
    fn test_save_buckets_writes_expected_files() {
        let temp = TempDir::new().unwrap();
        let mut buckets = sample_buckets();
        let summary = save_buckets(temp.path(), "example.com", &mut buckets).unwrap();

        let dir = temp.path().join("example.com");
        assert!(dir.join("example.com_pdf_urls.json").exists());
        assert!(dir.join("example.com_pdf_urls.txt").exists());
        assert!(dir.join("example.com_html_urls.json").exists());
        assert!(dir.join("example.com_summary.json").exists());

        assert_eq!(summary.total_urls, 3);
        assert_eq!(summary.extensions.get("pdf"), Some(&2));
        assert_eq!(summary.extensions.get("html"), Some(&1));
    }

    #[test]
    fn test_save_buckets_txt_is_one_url_per_line_newest_first() {
        let temp = TempDir::new().unwrap();
        let mut buckets = sample_buckets();
        save_buckets(temp.path(), "example.com", &mut buckets).unwrap();

        let txt = fs::read_to_string(
            temp.path()
                .join("example.com")
                .join("example.com_pdf_urls.txt"),
        )
        .unwrap();
        assert_eq!(
            txt,
            "http://example.com/new.pdf\nhttp://example.com/old.pdf\n"
        );
    }

    #[test]
    fn test_bucket_json_round_trips_order_preserving() {
        let temp = TempDir::new().unwrap();
        let mut buckets = sample_buckets();
        save_buckets(temp.path(), "example.com", &mut buckets).unwrap();

        let records = read_bucket_json(temp.path(), "example.com", "pdf").unwrap();
        let expected: Vec<UrlRecord> = buckets
            .iter()
            .find(|(ext, _)| *ext == "pdf")
            .map(|(_, records)| records.clone())
            .unwrap();
        assert_eq!(records, expected);
    }

    #[test]
    fn test_summary_round_trips() {
        let temp = TempDir::new().unwrap();
        let mut buckets = sample_buckets();
        let written = save_buckets(temp.path(), "example.com", &mut buckets).unwrap();
        let read = read_summary(temp.path(), "example.com").unwrap();
        assert_eq!(read, written);
    }

    #[test]
    fn test_read_summary_missing_is_error() {
        let temp = TempDir::new().unwrap();
        assert!(read_summary(temp.path(), "nosuch.com").is_err());
    }

    #[test]
    fn test_update_bucket_json_preserves_txt() {
        let temp = TempDir::new().unwrap();
        let mut buckets = sample_buckets();
        save_buckets(temp.path(), "example.com", &mut buckets).unwrap();

        let mut enriched = buckets.flatten();
        for record in &mut enriched {
            record.snapshot_url = Some("https://snap".to_string());
        }
        buckets.refill(enriched);
        update_bucket_json(temp.path(), "example.com", &buckets).unwrap();

        let records = read_bucket_json(temp.path(), "example.com", "pdf").unwrap();
        assert!(records.iter().all(|r| r.snapshot_url.is_some()));
    }

    #[test]
    fn test_scanned_domains_lists_directories_only() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("b.com")).unwrap();
        fs::create_dir(temp.path().join("a.com")).unwrap();
        fs::write(temp.path().join("stray.html"), "x").unwrap();
        assert_eq!(scanned_domains(temp.path()), vec!["a.com", "b.com"]);
    }
}
