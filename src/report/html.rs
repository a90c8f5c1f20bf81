//! Static HTML report rendering.
//!
//! One page per scanned domain plus one consolidated page for batch runs.
//! Reports are self-contained: inline CSS, no scripts, links out to the
//! archive and to the JSON/TXT files sitting next to the page.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use html_escape::{encode_double_quoted_attribute, encode_text};
use tracing::info;

use crate::records::{ExtensionBuckets, UrlRecord};

use super::{domain_dir, read_summary, ReportError};

/// Sample rows rendered per extension section before the "N more" notice.
const MAX_SAMPLE_ROWS: usize = 100;

const REPORT_STYLE: &str = "\
body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; margin: 0; padding: 20px; background-color: #f5f5f5; color: #333; }
.container { max-width: 1200px; margin: 0 auto; background-color: white; padding: 20px; border-radius: 8px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
h1 { color: #2c3e50; border-bottom: 2px solid #3498db; padding-bottom: 10px; }
h2 { color: #2980b9; margin-top: 30px; }
table { width: 100%; border-collapse: collapse; margin: 20px 0; }
th, td { padding: 12px 15px; text-align: left; border-bottom: 1px solid #ddd; }
th { background-color: #3498db; color: white; font-weight: 600; }
tr:nth-child(even) { background-color: #f9f9f9; }
tr:hover { background-color: #f1f1f1; }
.extensions-table { width: 50%; margin-bottom: 30px; }
.footer { margin-top: 50px; text-align: center; color: #7f8c8d; font-size: 0.9em; }
.btn { display: inline-block; padding: 8px 15px; background-color: #3498db; color: white; text-decoration: none; border-radius: 4px; }
.btn:hover { background-color: #2980b9; }";

fn page_open(title: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>{}</title>\n<style>\n{REPORT_STYLE}\n</style>\n</head>\n<body>\n<div class=\"container\">\n",
        encode_text(title)
    )
}

const PAGE_CLOSE: &str = "<div class=\"footer\">\n<p>Generated by waybackscan</p>\n</div>\n</div>\n</body>\n</html>\n";

/// Formats a CDX `YYYYMMDDHHMMSS` timestamp as `YYYY-MM-DD`, falling back to
/// the raw value when it is too short.
fn format_capture_date(timestamp: &str) -> String {
    if timestamp.len() >= 8 && timestamp.as_bytes()[..8].iter().all(u8::is_ascii_digit) {
        format!(
            "{}-{}-{}",
            &timestamp[0..4],
            &timestamp[4..6],
            &timestamp[6..8]
        )
    } else {
        timestamp.to_string()
    }
}

fn extension_table(rows: &[(String, usize)], total: usize) -> String {
    let mut out = String::from(
        "<table class=\"extensions-table\">\n<thead>\n<tr><th>Extension</th><th>Count</th><th>Percentage</th></tr>\n</thead>\n<tbody>\n",
    );
    for (ext, count) in rows {
        let percentage = if total > 0 {
            (*count as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        let _ = writeln!(
            out,
            "<tr><td>.{}</td><td>{count}</td><td>{percentage:.1}%</td></tr>",
            encode_text(ext)
        );
    }
    let _ = writeln!(
        out,
        "<tr><td><strong>Total</strong></td><td><strong>{total}</strong></td><td><strong>100.0%</strong></td></tr>"
    );
    out.push_str("</tbody>\n</table>\n");
    out
}

fn record_row(record: &UrlRecord) -> String {
    let date = record
        .timestamp
        .as_deref()
        .map(format_capture_date)
        .unwrap_or_default();
    let mut actions = String::new();
    if let Some(archived) = &record.archived_url {
        let _ = write!(
            actions,
            "<a href=\"{}\" target=\"_blank\" class=\"btn\">View Archive</a> ",
            encode_double_quoted_attribute(archived)
        );
    }
    if let Some(snapshot) = &record.snapshot_url {
        let _ = write!(
            actions,
            "<a href=\"{}\" target=\"_blank\" class=\"btn\">View Snapshot</a>",
            encode_double_quoted_attribute(snapshot)
        );
    }
    format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
        encode_text(&record.url),
        encode_text(&date),
        actions
    )
}

/// Renders and writes `<domain>_report.html` from the final buckets.
///
/// # Errors
///
/// Returns a [`ReportError`] when the page cannot be written.
pub fn write_domain_report(
    domain: &str,
    buckets: &ExtensionBuckets,
    domain_dir: &Path,
) -> Result<PathBuf, ReportError> {
    let mut counts: Vec<(String, usize)> = buckets
        .counts()
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    let total: usize = counts.iter().map(|(_, c)| c).sum();

    let mut page = page_open(&format!("Wayback Scan Report - {domain}"));
    let _ = write!(
        page,
        "<h1>Wayback Machine Archive Report</h1>\n\
         <p><strong>Domain:</strong> {}</p>\n\
         <p><strong>Report Date:</strong> {}</p>\n\
         <p><strong>Total Files Found:</strong> {total}</p>\n\
         <h2>Files by Extension</h2>\n",
        encode_text(domain),
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    page.push_str(&extension_table(&counts, total));
    page.push_str("<h2>Available Files</h2>\n");

    let mut sections: Vec<(&String, &Vec<UrlRecord>)> = buckets
        .iter()
        .filter(|(_, records)| !records.is_empty())
        .collect();
    sections.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(b.0)));

    for (ext, records) in sections {
        let ext_attr = encode_double_quoted_attribute(ext.as_str());
        let domain_attr = encode_double_quoted_attribute(domain);
        let _ = write!(
            page,
            "<h3>.{} Files ({})</h3>\n\
             <p><a href=\"{domain_attr}_{ext_attr}_urls.txt\" class=\"btn\">Download URL List</a> \
             <a href=\"{domain_attr}_{ext_attr}_urls.json\" class=\"btn\">Download JSON Data</a></p>\n\
             <table>\n<thead>\n<tr><th>URL</th><th>Archive Date</th><th>Actions</th></tr>\n</thead>\n<tbody>\n",
            encode_text(ext),
            records.len()
        );
        for record in records.iter().take(MAX_SAMPLE_ROWS) {
            page.push_str(&record_row(record));
        }
        if records.len() > MAX_SAMPLE_ROWS {
            let _ = writeln!(
                page,
                "<tr><td colspan=\"3\">... and {} more files. See the full list in the downloaded files.</td></tr>",
                records.len() - MAX_SAMPLE_ROWS
            );
        }
        page.push_str("</tbody>\n</table>\n");
    }
    page.push_str(PAGE_CLOSE);

    let path = domain_dir.join(format!("{domain}_report.html"));
    fs::write(&path, page).map_err(|e| ReportError::Io {
        path: path.clone(),
        source: e,
    })?;
    info!(path = %path.display(), "domain report generated");
    Ok(path)
}

/// Renders and writes the consolidated `batch_summary_report.html`.
///
/// Per-domain summary JSONs that cannot be read render as
/// "Processing failed or incomplete" rows instead of failing the report.
///
/// # Errors
///
/// Returns a [`ReportError`] when the page cannot be written.
pub fn write_batch_report(
    domains: &[String],
    output_dir: &Path,
    success_count: usize,
) -> Result<PathBuf, ReportError> {
    let summaries: Vec<_> = domains
        .iter()
        .map(|domain| (domain, read_summary(output_dir, domain).ok()))
        .collect();

    let total_urls: usize = summaries
        .iter()
        .filter_map(|(_, s)| s.as_ref())
        .map(|s| s.total_urls)
        .sum();

    let mut all_extensions = std::collections::BTreeMap::<String, usize>::new();
    for summary in summaries.iter().filter_map(|(_, s)| s.as_ref()) {
        for (ext, count) in &summary.extensions {
            *all_extensions.entry(ext.clone()).or_insert(0) += count;
        }
    }
    let mut totals: Vec<(String, usize)> = all_extensions.into_iter().collect();
    totals.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut page = page_open("Wayback Scan - Batch Report");
    let _ = write!(
        page,
        "<h1>Wayback Machine Batch Scan Report</h1>\n\
         <p><strong>Report Date:</strong> {}</p>\n\
         <p><strong>Total Domains Scanned:</strong> {}</p>\n\
         <p><strong>Successfully Processed:</strong> {success_count}</p>\n\
         <p><strong>Failed:</strong> {}</p>\n\
         <p><strong>Total URLs Found:</strong> {total_urls}</p>\n\
         <h2>Files by Extension (All Domains)</h2>\n",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        domains.len(),
        domains.len().saturating_sub(success_count)
    );
    page.push_str(&extension_table(&totals, total_urls));

    page.push_str(
        "<h2>Domain Summaries</h2>\n<table>\n<thead>\n\
         <tr><th>Domain</th><th>Total URLs</th><th>File Types</th><th>Actions</th></tr>\n\
         </thead>\n<tbody>\n",
    );
    for (domain, summary) in &summaries {
        match summary {
            Some(summary) => {
                let mut types: Vec<String> = summary
                    .extensions
                    .iter()
                    .take(5)
                    .map(|(ext, count)| format!(".{ext} ({count})"))
                    .collect();
                if summary.extensions.len() > 5 {
                    types.push(format!("and {} more", summary.extensions.len() - 5));
                }
                let report = domain_dir(output_dir, domain).join(format!("{domain}_report.html"));
                let action = if report.exists() {
                    format!(
                        "<a href=\"{}/{}_report.html\" class=\"btn\">View Report</a>",
                        encode_double_quoted_attribute(domain.as_str()),
                        encode_double_quoted_attribute(domain.as_str())
                    )
                } else {
                    String::new()
                };
                let _ = writeln!(
                    page,
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{action}</td></tr>",
                    encode_text(domain),
                    summary.total_urls,
                    encode_text(&types.join(", "))
                );
            }
            None => {
                let _ = writeln!(
                    page,
                    "<tr><td>{}</td><td colspan=\"3\">Processing failed or incomplete</td></tr>",
                    encode_text(domain)
                );
            }
        }
    }
    page.push_str("</tbody>\n</table>\n");
    page.push_str(PAGE_CLOSE);

    let path = output_dir.join("batch_summary_report.html");
    fs::write(&path, page).map_err(|e| ReportError::Io {
        path: path.clone(),
        source: e,
    })?;
    info!(path = %path.display(), "batch report generated");
    Ok(path)
}
