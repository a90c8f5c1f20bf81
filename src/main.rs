//! CLI entry point for the waybackscan tool.

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info, warn};
use waybackscan_core::{
    extensions, report, AbortOnExhaustion, ArchiveClient, Config, ConfigStore, Shell,
    DEFAULT_EXTENSIONS_FILE,
};

mod cli;

use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let store = ConfigStore::default_location();
    let config = store.load();
    std::fs::create_dir_all(&config.output_directory)?;
    let client = ArchiveClient::new();

    match args.command {
        None => Shell::new(store, config, client).run().await,
        Some(Command::Scan {
            domain,
            extensions,
            no_snapshots,
            download,
        }) => {
            run_scan(
                &domain,
                extensions,
                no_snapshots,
                download,
                &store,
                config,
                &client,
            )
            .await
        }
        Some(Command::Batch {
            file,
            extensions,
            no_snapshots,
            download,
        }) => run_batch(&file, extensions, no_snapshots, download, config, &client).await,
    }
}

/// Per-run config overrides from CLI flags. Not persisted.
fn apply_overrides(config: &mut Config, no_snapshots: bool, download: bool) {
    if no_snapshots {
        config.check_wayback_snapshots = false;
    }
    if download {
        config.download_files = true;
    }
}

/// Resolves the extension filter: explicit CLI values, otherwise the
/// extensions file. An empty result means "all file types".
fn resolve_extensions(cli_extensions: Vec<String>) -> Result<Vec<String>> {
    if cli_extensions.is_empty() {
        return Ok(extensions::load_extensions(Path::new(
            DEFAULT_EXTENSIONS_FILE,
        ))?);
    }
    Ok(cli_extensions
        .iter()
        .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect())
}

async fn run_scan(
    domain: &str,
    cli_extensions: Vec<String>,
    no_snapshots: bool,
    download: bool,
    store: &ConfigStore,
    mut config: Config,
    client: &ArchiveClient,
) -> Result<()> {
    let domain = waybackscan_core::normalize_domain(domain);
    if domain.is_empty() {
        anyhow::bail!("no domain given");
    }
    let extension_filter = resolve_extensions(cli_extensions)?;
    apply_overrides(&mut config, no_snapshots, download);

    config.push_recent_domain(&domain);
    store.save(&config)?;

    match waybackscan_core::scan_domain(
        &domain,
        &extension_filter,
        &config,
        client,
        &AbortOnExhaustion,
    )
    .await?
    {
        Some(summary) => {
            info!(
                domain,
                urls = summary.total_urls,
                extensions = summary.extensions.len(),
                "scan complete"
            );
            info!(
                results = %report::domain_dir(&config.output_directory, &domain).display(),
                "results saved"
            );
        }
        None => warn!(domain, "no URLs found"),
    }
    Ok(())
}

async fn run_batch(
    file: &Path,
    cli_extensions: Vec<String>,
    no_snapshots: bool,
    download: bool,
    mut config: Config,
    client: &ArchiveClient,
) -> Result<()> {
    let domains: Vec<String> = extensions::load_domains(file)?
        .iter()
        .map(|d| waybackscan_core::normalize_domain(d))
        .collect();
    if domains.is_empty() {
        anyhow::bail!("no domains found in {}", file.display());
    }
    let extension_filter = resolve_extensions(cli_extensions)?;
    apply_overrides(&mut config, no_snapshots, download);

    info!(domains = domains.len(), "starting batch scan");
    let outcome = waybackscan_core::scan_batch(
        &domains,
        &extension_filter,
        &config,
        client,
        &AbortOnExhaustion,
    )
    .await;

    let path = report::html::write_batch_report(
        &domains,
        &config.output_directory,
        outcome.succeeded,
    )?;
    info!(
        total = outcome.total,
        succeeded = outcome.succeeded,
        failed = outcome.total - outcome.succeeded,
        report = %path.display(),
        "batch scan complete"
    );
    Ok(())
}
