//! File-backed application configuration.
//!
//! Settings are loaded once at startup and persisted immediately after every
//! change. A missing or corrupt config file falls back to defaults rather than
//! failing the run.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default config file name, resolved relative to the working directory.
pub const CONFIG_FILE: &str = "waybackscan_config.json";

/// Default directory for scan output.
pub const DEFAULT_OUTPUT_DIR: &str = "wayback_archives";

/// Default number of concurrent snapshot verification workers.
pub const DEFAULT_MAX_WORKERS: usize = 10;

/// Default delay between API calls, in seconds. Doubles as the base delay of
/// the CDX retry schedule.
pub const DEFAULT_API_RATE_LIMIT_SECS: u64 = 5;

/// Maximum number of remembered recent domains.
const RECENT_DOMAINS_CAP: usize = 10;

/// Process-wide settings record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory for per-domain output trees.
    pub output_directory: PathBuf,

    /// Worker cap for the snapshot verifier (1-50).
    pub max_workers: usize,

    /// Seconds between API calls; base delay for CDX fetch retries (1-30).
    pub api_rate_limit: u64,

    /// Whether scans verify live snapshot availability.
    pub check_wayback_snapshots: bool,

    /// Whether scans download archived files.
    pub download_files: bool,

    /// Recently scanned domains, oldest first, bounded to the last 10.
    pub recent_domains: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::from(DEFAULT_OUTPUT_DIR),
            max_workers: DEFAULT_MAX_WORKERS,
            api_rate_limit: DEFAULT_API_RATE_LIMIT_SECS,
            check_wayback_snapshots: true,
            download_files: false,
            recent_domains: Vec::new(),
        }
    }
}

impl Config {
    /// Records a scanned domain, dropping the oldest entry past the cap.
    /// Already-known domains are not duplicated.
    pub fn push_recent_domain(&mut self, domain: &str) {
        if self.recent_domains.iter().any(|d| d == domain) {
            return;
        }
        self.recent_domains.push(domain.to_string());
        if self.recent_domains.len() > RECENT_DOMAINS_CAP {
            let excess = self.recent_domains.len() - RECENT_DOMAINS_CAP;
            self.recent_domains.drain(..excess);
        }
    }

    /// Resets tunables to defaults, preserving the recent-domain history.
    pub fn reset_to_defaults(&mut self) {
        let recent = std::mem::take(&mut self.recent_domains);
        *self = Self {
            recent_domains: recent,
            ..Self::default()
        };
    }
}

/// Persistence port for [`Config`].
///
/// Owns the config file path so the rest of the application never touches
/// ambient global state.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Creates a store for the given config file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store for [`CONFIG_FILE`] in the working directory.
    #[must_use]
    pub fn default_location() -> Self {
        Self::new(CONFIG_FILE)
    }

    /// The config file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the config, falling back to defaults when the file is missing
    /// or cannot be parsed. A corrupt file is logged and replaced on the next
    /// [`save`](Self::save).
    #[must_use]
    pub fn load(&self) -> Config {
        match fs::read_to_string(&self.path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(config) => {
                    debug!(path = %self.path.display(), "loaded config");
                    config
                }
                Err(error) => {
                    warn!(path = %self.path.display(), %error, "config file is corrupted, using default settings");
                    Config::default()
                }
            },
            Err(_) => Config::default(),
        }
    }

    /// Persists the config as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an IO error when the file cannot be written.
    pub fn save(&self, config: &Config) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(config)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, json)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let temp = TempDir::new().unwrap();
        let store = ConfigStore::new(temp.path().join("missing.json"));
        let config = store.load();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_corrupt_file_returns_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, "{not valid json").unwrap();
        let config = ConfigStore::new(path).load();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let temp = TempDir::new().unwrap();
        let store = ConfigStore::new(temp.path().join("config.json"));

        let mut config = Config::default();
        config.max_workers = 25;
        config.download_files = true;
        config.push_recent_domain("example.com");
        store.save(&config).unwrap();

        assert_eq!(store.load(), config);
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, r#"{"max_workers": 3}"#).unwrap();
        let config = ConfigStore::new(path).load();
        assert_eq!(config.max_workers, 3);
        assert_eq!(config.api_rate_limit, DEFAULT_API_RATE_LIMIT_SECS);
        assert!(config.check_wayback_snapshots);
    }

    #[test]
    fn test_recent_domains_bounded_to_ten() {
        let mut config = Config::default();
        for i in 0..15 {
            config.push_recent_domain(&format!("domain{i}.com"));
        }
        assert_eq!(config.recent_domains.len(), 10);
        assert_eq!(config.recent_domains[0], "domain5.com");
        assert_eq!(config.recent_domains[9], "domain14.com");
    }

    #[test]
    fn test_recent_domains_deduplicated() {
        let mut config = Config::default();
        config.push_recent_domain("example.com");
        config.push_recent_domain("example.com");
        assert_eq!(config.recent_domains.len(), 1);
    }

    #[test]
    fn test_reset_to_defaults_preserves_recent_domains() {
        let mut config = Config::default();
        config.max_workers = 42;
        config.push_recent_domain("example.com");
        config.reset_to_defaults();
        assert_eq!(config.max_workers, DEFAULT_MAX_WORKERS);
        assert_eq!(config.recent_domains, vec!["example.com".to_string()]);
    }
}
