//! Interactive menu shell.
//!
//! A single explicit loop over an enumerated menu state drives the whole
//! session; leaf flows prompt for their inputs, persist config changes
//! immediately, and hand off to the [`scan`](crate::scan) pipeline. Nothing
//! here is resumable or concurrent - every prompt is a plain blocking read
//! from stdin.

use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use console::style;
use tracing::{error, info, warn};

use crate::archive::{ArchiveClient, RetryPrompt};
use crate::config::{Config, ConfigStore};
use crate::extensions::{self, Preset, DEFAULT_EXTENSIONS_FILE};
use crate::report;
use crate::scan::{self, normalize_domain};

const BANNER: &str = r"
 __        __          _                _      ____
 \ \      / /_ _ _   _| |__   __ _  ___| | __ / ___|  ___ __ _ _ __
  \ \ /\ / / _` | | | | '_ \ / _` |/ __| |/ / \___ \ / __/ _` | '_ \
   \ V  V / (_| | |_| | |_) | (_| | (__|   <   ___) | (_| (_| | | | |
    \_/\_/ \__,_|\__, |_.__/ \__,_|\___|_|\_\ |____/ \___\__,_|_| |_|
                 |___/
";

/// Reads one trimmed line from stdin after printing a styled prompt.
fn prompt(message: &str) -> io::Result<String> {
    print!("{} ", style(message).cyan().bold());
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        // EOF: stdin closed, there is no operator to talk to.
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"));
    }
    Ok(line.trim().to_string())
}

/// Prompt with a default shown in brackets; empty input takes the default.
fn prompt_default(message: &str, default: &str) -> io::Result<String> {
    let answer = prompt(&format!("{message} [{default}]"))?;
    Ok(if answer.is_empty() {
        default.to_string()
    } else {
        answer
    })
}

/// Yes/no confirmation. Empty input takes the default.
fn confirm(message: &str, default: bool) -> io::Result<bool> {
    let hint = if default { "Y/n" } else { "y/N" };
    let answer = prompt(&format!("{message} [{hint}]"))?;
    Ok(match answer.to_ascii_lowercase().as_str() {
        "" => default,
        "y" | "yes" => true,
        _ => false,
    })
}

fn pause() {
    let _ = prompt("\nPress Enter to continue...");
}

fn print_heading(text: &str) {
    println!("\n{}", style(text).blue().bold());
    println!("{}", style("─".repeat(text.len().max(24))).blue());
}

/// Asks the operator whether to wait out the cool-down after the CDX retry
/// budget is spent.
#[derive(Debug, Clone, Copy, Default)]
struct ConsoleRetryPrompt;

impl RetryPrompt for ConsoleRetryPrompt {
    fn wait_and_retry(&self, domain: &str) -> bool {
        println!(
            "{}",
            style(format!("All fetch attempts for {domain} failed.")).red()
        );
        confirm("Would you like to wait 2 minutes and try again?", false).unwrap_or(false)
    }
}

/// Top-level menu state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    SingleScan,
    BatchScan,
    ManageExtensions,
    Settings,
    ViewResults,
    Exit,
}

impl MenuChoice {
    fn parse(input: &str) -> Option<Self> {
        match input {
            "1" => Some(Self::SingleScan),
            "2" => Some(Self::BatchScan),
            "3" => Some(Self::ManageExtensions),
            "4" => Some(Self::Settings),
            "5" => Some(Self::ViewResults),
            "6" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Menu-driven orchestration over the scan pipeline.
pub struct Shell {
    store: ConfigStore,
    config: Config,
    client: ArchiveClient,
}

impl Shell {
    /// Creates a shell around loaded config and its persistence store.
    #[must_use]
    pub fn new(store: ConfigStore, config: Config, client: ArchiveClient) -> Self {
        Self {
            store,
            config,
            client,
        }
    }

    /// Runs the main menu loop until the operator exits.
    ///
    /// # Errors
    ///
    /// Returns an error when stdin/stdout fail or config cannot be persisted.
    pub async fn run(&mut self) -> Result<()> {
        println!("{}", style(BANNER).blue().bold());
        loop {
            print_heading("Main Menu");
            println!("1. Scan Single Domain");
            println!("2. Scan Multiple Domains");
            println!("3. Manage File Extensions");
            println!("4. Settings");
            println!("5. View Results");
            println!("6. Exit");

            match MenuChoice::parse(&prompt_default("Select an option", "1")?) {
                Some(MenuChoice::SingleScan) => self.single_scan().await?,
                Some(MenuChoice::BatchScan) => self.batch_scan().await?,
                Some(MenuChoice::ManageExtensions) => self.manage_extensions()?,
                Some(MenuChoice::Settings) => self.settings()?,
                Some(MenuChoice::ViewResults) => self.view_results()?,
                Some(MenuChoice::Exit) => {
                    println!("{}", style("Exiting. Goodbye!").yellow());
                    return Ok(());
                }
                None => println!("{}", style("Please select 1-6.").yellow()),
            }
        }
    }

    fn save_config(&self) -> Result<()> {
        self.store.save(&self.config)?;
        Ok(())
    }

    async fn single_scan(&mut self) -> Result<()> {
        print_heading("Scan Single Domain");

        if !self.config.recent_domains.is_empty() {
            println!("Recent domains:");
            for domain in self.config.recent_domains.iter().rev().take(5) {
                println!("  {}", style(domain).cyan());
            }
        }

        let input = prompt("Enter target domain (e.g., example.com):")?;
        let domain = normalize_domain(&input);
        if domain.is_empty() {
            println!("{}", style("No domain entered.").yellow());
            return Ok(());
        }

        self.config.push_recent_domain(&domain);
        let extensions = self.select_extensions()?;
        self.confirm_scan_options()?;

        let started = Instant::now();
        let outcome = scan::scan_domain(
            &domain,
            &extensions,
            &self.config,
            &self.client,
            &ConsoleRetryPrompt,
        )
        .await?;

        match outcome {
            Some(summary) => {
                let result_dir = report::domain_dir(&self.config.output_directory, &domain);
                println!(
                    "{}",
                    style(format!(
                        "Scan completed in {:.2}s: {} URLs across {} extensions.",
                        started.elapsed().as_secs_f64(),
                        summary.total_urls,
                        summary.extensions.len()
                    ))
                    .green()
                );
                println!("Results saved to: {}", result_dir.display());
                if confirm("Open the results folder?", true)? {
                    if let Err(err) = open::that(&result_dir) {
                        error!(error = %err, "could not open results folder");
                    }
                }
            }
            None => println!("{}", style("No URLs found for that domain.").yellow()),
        }
        pause();
        Ok(())
    }

    async fn batch_scan(&mut self) -> Result<()> {
        print_heading("Batch Scanning");
        println!("Scan multiple domains from a file (one domain per line).");

        let path_input = prompt("Enter the path to the domain list file:")?;
        let domains = match extensions::load_domains(Path::new(&path_input)) {
            Ok(domains) if !domains.is_empty() => domains,
            Ok(_) => {
                println!("{}", style("No domains found in the file.").red());
                pause();
                return Ok(());
            }
            Err(err) => {
                println!("{}", style(format!("Could not read {path_input}: {err}")).red());
                pause();
                return Ok(());
            }
        };
        let domains: Vec<String> = domains.iter().map(|d| normalize_domain(d)).collect();

        println!("Loaded {} domains:", domains.len());
        for domain in domains.iter().take(10) {
            println!("  {}", style(domain).cyan());
        }
        if domains.len() > 10 {
            println!("  ...");
        }
        if !confirm("Proceed with scanning these domains?", true)? {
            println!("{}", style("Operation cancelled.").yellow());
            pause();
            return Ok(());
        }

        let extensions = self.select_extensions()?;
        self.confirm_scan_options()?;

        let started = Instant::now();
        let outcome = scan::scan_batch(
            &domains,
            &extensions,
            &self.config,
            &self.client,
            &ConsoleRetryPrompt,
        )
        .await;

        print_heading("Batch Processing Complete");
        println!("Total domains:          {}", outcome.total);
        println!("Successfully processed: {}", outcome.succeeded);
        println!("Failed:                 {}", outcome.total - outcome.succeeded);
        println!("Total time:             {:.2}s", started.elapsed().as_secs_f64());

        if confirm("Generate a batch summary report?", true)? {
            match report::html::write_batch_report(
                &domains,
                &self.config.output_directory,
                outcome.succeeded,
            ) {
                Ok(path) => {
                    println!("Batch report: {}", path.display());
                    if let Err(err) = open::that(&path) {
                        error!(error = %err, "could not open batch report");
                    }
                }
                Err(err) => error!(error = %err, "batch report generation failed"),
            }
        }
        pause();
        Ok(())
    }

    /// Offers the file-backed extension list, falling back to custom input.
    /// An empty selection means "all file types".
    fn select_extensions(&self) -> Result<Vec<String>> {
        let saved = extensions::load_extensions(Path::new(DEFAULT_EXTENSIONS_FILE))?;
        if !saved.is_empty() {
            println!("Available extensions: {}", style(saved.join(", ")).cyan());
            if confirm("Use these extensions?", true)? {
                return Ok(saved);
            }
        }
        let custom = prompt("Enter file extensions to filter (comma-separated, without dots):")?;
        let parsed = extensions::parse_extension_input(&custom);
        if parsed.is_empty() {
            warn!("no extensions specified, using all file types");
        }
        Ok(parsed)
    }

    /// Confirms the per-scan toggles and persists them.
    fn confirm_scan_options(&mut self) -> Result<()> {
        self.config.check_wayback_snapshots = confirm(
            "Check for Wayback Machine snapshots?",
            self.config.check_wayback_snapshots,
        )?;
        self.config.download_files =
            confirm("Download archived files?", self.config.download_files)?;
        self.save_config()
    }

    fn manage_extensions(&mut self) -> Result<()> {
        let path = Path::new(DEFAULT_EXTENSIONS_FILE);
        loop {
            print_heading("Extension Management");
            let mut current = extensions::load_extensions(path)?;
            if current.is_empty() {
                println!("{}", style("No extensions defined.").yellow());
            } else {
                current.sort_unstable();
                println!("Current extensions: {}", style(current.join(", ")).cyan());
            }

            println!("1. Add extensions");
            println!("2. Remove extensions");
            println!("3. Set common document extensions");
            println!("4. Set common media extensions");
            println!("5. Set common web extensions");
            println!("6. Set common archive extensions");
            println!("7. Return to main menu");

            let choice = prompt_default("Select an option", "7")?;
            let preset = match choice.as_str() {
                "1" => {
                    let input = prompt("Enter extensions to add (comma-separated, without dots):")?;
                    let added = extensions::parse_extension_input(&input);
                    current.extend(added.iter().cloned());
                    extensions::save_extensions(path, &current)?;
                    info!(count = added.len(), "added extensions");
                    continue;
                }
                "2" => {
                    if current.is_empty() {
                        println!("{}", style("No extensions to remove.").yellow());
                        continue;
                    }
                    let input =
                        prompt("Enter extensions to remove (comma-separated, without dots):")?;
                    let removing = extensions::parse_extension_input(&input);
                    current.retain(|ext| !removing.contains(ext));
                    extensions::save_extensions(path, &current)?;
                    info!(count = removing.len(), "removed extensions");
                    continue;
                }
                "3" => Preset::Document,
                "4" => Preset::Media,
                "5" => Preset::Web,
                "6" => Preset::Archive,
                _ => return Ok(()),
            };

            let list = preset.extensions();
            if confirm(
                &format!(
                    "Replace current extensions with this set? ({})",
                    list.join(", ")
                ),
                false,
            )? {
                let owned: Vec<String> = list.iter().map(ToString::to_string).collect();
                extensions::save_extensions(path, &owned)?;
                info!(count = owned.len(), "applied extension preset");
            }
        }
    }

    fn settings(&mut self) -> Result<()> {
        loop {
            print_heading("Settings");
            println!(
                "Output directory:         {}",
                self.config.output_directory.display()
            );
            println!("Max worker threads:       {}", self.config.max_workers);
            println!("API rate limit (seconds): {}", self.config.api_rate_limit);
            println!(
                "Check wayback snapshots:  {}",
                if self.config.check_wayback_snapshots { "Yes" } else { "No" }
            );
            println!(
                "Download files:           {}",
                if self.config.download_files { "Yes" } else { "No" }
            );

            println!("1. Change output directory");
            println!("2. Set max worker threads");
            println!("3. Set API rate limit");
            println!("4. Toggle wayback snapshot checking");
            println!("5. Toggle file downloading");
            println!("6. Reset to defaults");
            println!("7. Return to main menu");

            match prompt_default("Select an option", "7")?.as_str() {
                "1" => {
                    let current = self.config.output_directory.display().to_string();
                    let new_dir = prompt_default("Enter new output directory path", &current)?;
                    if new_dir != current {
                        match std::fs::create_dir_all(&new_dir) {
                            Ok(()) => {
                                self.config.output_directory = new_dir.into();
                                self.save_config()?;
                                info!("output directory changed");
                            }
                            Err(err) => error!(error = %err, "could not create directory"),
                        }
                    }
                }
                "2" => {
                    let input = prompt_default(
                        "Enter maximum number of worker threads (1-50)",
                        &self.config.max_workers.to_string(),
                    )?;
                    match input.parse::<usize>() {
                        Ok(workers) if (1..=50).contains(&workers) => {
                            self.config.max_workers = workers;
                            self.save_config()?;
                        }
                        _ => warn!("value must be a number between 1 and 50"),
                    }
                }
                "3" => {
                    let input = prompt_default(
                        "Enter API rate limit in seconds (1-30)",
                        &self.config.api_rate_limit.to_string(),
                    )?;
                    match input.parse::<u64>() {
                        Ok(secs) if (1..=30).contains(&secs) => {
                            self.config.api_rate_limit = secs;
                            self.save_config()?;
                        }
                        _ => warn!("value must be a number between 1 and 30"),
                    }
                }
                "4" => {
                    self.config.check_wayback_snapshots = !self.config.check_wayback_snapshots;
                    self.save_config()?;
                }
                "5" => {
                    self.config.download_files = !self.config.download_files;
                    self.save_config()?;
                }
                "6" => {
                    if confirm("Reset all settings to defaults?", false)? {
                        self.config.reset_to_defaults();
                        self.save_config()?;
                        info!("settings reset to defaults");
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn view_results(&self) -> Result<()> {
        loop {
            print_heading("Scan Results");
            let domains = report::scanned_domains(&self.config.output_directory);
            if domains.is_empty() {
                println!("{}", style("No scan results found.").yellow());
                pause();
                return Ok(());
            }

            for domain in &domains {
                match report::read_summary(&self.config.output_directory, domain) {
                    Ok(summary) => {
                        let date = chrono::DateTime::parse_from_rfc3339(&summary.scan_date)
                            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                            .unwrap_or(summary.scan_date);
                        println!(
                            "  {}  scanned {date}, {} files",
                            style(domain).cyan(),
                            summary.total_urls
                        );
                    }
                    Err(_) => println!("  {}  (no summary)", style(domain).cyan()),
                }
            }

            let selection =
                prompt_default("Enter domain to view results (or 'back')", "back")?;
            if selection.eq_ignore_ascii_case("back") {
                return Ok(());
            }
            if !domains.contains(&selection) {
                println!("{}", style(format!("Domain {selection} not found.")).red());
                continue;
            }

            let dir = report::domain_dir(&self.config.output_directory, &selection);
            let report_path = dir.join(format!("{selection}_report.html"));
            let target = if report_path.exists() {
                report_path
            } else {
                println!("{}", style("Report not found, opening directory.").yellow());
                dir
            };
            if let Err(err) = open::that(&target) {
                error!(error = %err, path = %target.display(), "could not open results");
            }
        }
    }
}
