//! Scan pipeline: fetch, filter, save, verify, download, report.
//!
//! One domain flows through the stages sequentially; only snapshot
//! verification fans out internally. Batch scans run domains one after
//! another and never short-circuit on a failed domain.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, info, instrument, warn};

use crate::archive::{ArchiveClient, CdxFetcher, RetryPolicy, RetryPrompt, SnapshotVerifier};
use crate::config::Config;
use crate::download::{FileDownloader, DOWNLOAD_PACING};
use crate::records::{DomainSummary, UrlRecord};
use crate::report::{self, ReportError};

/// Outcome of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Domains attempted.
    pub total: usize,
    /// Domains that produced a summary.
    pub succeeded: usize,
}

/// Strips scheme, leading `www.` and any path from user-entered domain input.
#[must_use]
pub fn normalize_domain(input: &str) -> String {
    let mut domain = input.trim().to_ascii_lowercase();
    if let Some((_, rest)) = domain.split_once("://") {
        domain = rest.to_string();
    }
    if let Some(rest) = domain.strip_prefix("www.") {
        domain = rest.to_string();
    }
    if let Some((host, _)) = domain.split_once('/') {
        domain = host.to_string();
    }
    domain
}

/// Scans one domain end to end.
///
/// Returns `Ok(None)` when the CDX fetch yielded nothing (including operator
/// abort), `Ok(Some(summary))` otherwise. Snapshot verification and file
/// downloads run per the config toggles; per-record failures inside those
/// stages are logged and never abort the scan.
///
/// # Errors
///
/// Returns a [`ReportError`] when result files cannot be written.
#[instrument(skip(extensions, config, client, prompt))]
pub async fn scan_domain(
    domain: &str,
    extensions: &[String],
    config: &Config,
    client: &ArchiveClient,
    prompt: &dyn RetryPrompt,
) -> Result<Option<DomainSummary>, ReportError> {
    let policy = RetryPolicy::new(Duration::from_secs(config.api_rate_limit.max(1)));
    let fetcher = CdxFetcher::new(client, policy);

    let mut buckets = fetcher.fetch_domain(domain, prompt).await;
    if buckets.is_empty() {
        warn!(domain, "no URLs fetched, skipping");
        return Ok(None);
    }

    let extra = buckets.retain_extensions(extensions);
    if !extra.is_empty() {
        info!(
            domain,
            extensions = extra.join(", "),
            "also found files with other extensions"
        );
    }

    let summary = report::save_buckets(&config.output_directory, domain, &mut buckets)?;

    if config.check_wayback_snapshots && !buckets.is_empty() {
        let records = buckets.flatten();
        info!(domain, urls = records.len(), "checking Wayback Machine snapshots");
        let bar = ProgressBar::new(records.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("checking snapshots {bar:30.yellow/blue} {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        let verifier = SnapshotVerifier::new(client, config.max_workers);
        let verified = verifier.verify(records, Some(&bar)).await;
        bar.finish_and_clear();

        buckets.refill(verified);
        report::update_bucket_json(&config.output_directory, domain, &buckets)?;
    }

    if config.download_files {
        let downloadable: Vec<UrlRecord> = buckets
            .flatten()
            .into_iter()
            .filter(UrlRecord::has_archived_copy)
            .collect();
        if !downloadable.is_empty() {
            info!(domain, files = downloadable.len(), "downloading archived files");
            let downloader = FileDownloader::new(client);
            let mut downloaded = 0usize;
            for record in &downloadable {
                match downloader
                    .download_record(record, &config.output_directory, domain)
                    .await
                {
                    Ok(path) => {
                        downloaded += 1;
                        debug!(path = %path.display(), "download ok");
                    }
                    Err(err) => {
                        debug!(url = %record.download_url(), error = %err, "download failed");
                    }
                }
                tokio::time::sleep(DOWNLOAD_PACING).await;
            }
            info!(domain, downloaded, total = downloadable.len(), "downloads finished");
        }
    }

    report::html::write_domain_report(
        domain,
        &buckets,
        &report::domain_dir(&config.output_directory, domain),
    )?;
    Ok(Some(summary))
}

/// Scans a list of domains sequentially, continuing past failures.
///
/// The batch HTML report is written separately via
/// [`report::html::write_batch_report`] so callers can decide whether to
/// generate it.
pub async fn scan_batch(
    domains: &[String],
    extensions: &[String],
    config: &Config,
    client: &ArchiveClient,
    prompt: &dyn RetryPrompt,
) -> BatchOutcome {
    let mut succeeded = 0usize;
    for (index, domain) in domains.iter().enumerate() {
        info!(
            domain,
            progress = format!("{}/{}", index + 1, domains.len()),
            "processing domain"
        );
        match scan_domain(domain, extensions, config, client, prompt).await {
            Ok(Some(_)) => succeeded += 1,
            Ok(None) => {}
            Err(err) => {
                error!(domain, error = %err, "failed to process domain");
            }
        }
    }
    BatchOutcome {
        total: domains.len(),
        succeeded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_domain_strips_scheme_and_www() {
        assert_eq!(normalize_domain("https://www.Example.com"), "example.com");
        assert_eq!(normalize_domain("http://example.com"), "example.com");
    }

    #[test]
    fn test_normalize_domain_strips_path() {
        assert_eq!(
            normalize_domain("example.com/some/page.html"),
            "example.com"
        );
    }

    #[test]
    fn test_normalize_domain_plain_input_unchanged() {
        assert_eq!(normalize_domain("  example.com  "), "example.com");
    }

    #[test]
    fn test_normalize_domain_keeps_subdomains() {
        assert_eq!(
            normalize_domain("https://files.example.com/x"),
            "files.example.com"
        );
    }
}
