//! Line-oriented list files: the user-editable extension filter and domain
//! lists for batch scans.
//!
//! Both formats are one entry per line with `#`-prefixed comment lines and
//! blank lines ignored.

use std::fs;
use std::io;
use std::path::Path;

use tracing::warn;

/// Default extension list file, resolved relative to the working directory.
pub const DEFAULT_EXTENSIONS_FILE: &str = "extensions.txt";

/// Template written when the extension file does not exist yet.
const EXTENSIONS_TEMPLATE: &str = "\
# Add one file extension per line (without the dot)
# Example:
# pdf
# zip
# doc
# xls
";

/// Curated extension presets selectable from the management menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Office and text documents.
    Document,
    /// Images, audio and video.
    Media,
    /// Server-rendered and static web assets.
    Web,
    /// Compressed archives and disk images.
    Archive,
}

impl Preset {
    /// The extensions in this preset.
    #[must_use]
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Document => &[
                "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "rtf", "odt", "ods",
                "odp",
            ],
            Self::Media => &[
                "jpg", "jpeg", "png", "gif", "bmp", "svg", "mp3", "mp4", "wav", "avi", "mov",
                "flv", "wmv",
            ],
            Self::Web => &[
                "html", "htm", "php", "asp", "aspx", "jsp", "cgi", "js", "css", "xml",
            ],
            Self::Archive => &["zip", "rar", "7z", "tar", "gz", "bz2", "iso", "dmg", "tgz"],
        }
    }
}

fn parse_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Loads the extension list, creating a commented template file when absent.
///
/// # Errors
///
/// Returns an IO error when the file exists but cannot be read, or when the
/// template cannot be written.
pub fn load_extensions(path: &Path) -> io::Result<Vec<String>> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(parse_lines(&raw)),
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "extension file not found, creating template");
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(path, EXTENSIONS_TEMPLATE)?;
            Ok(Vec::new())
        }
        Err(error) => Err(error),
    }
}

/// Writes the extension list, one entry per line, sorted.
///
/// # Errors
///
/// Returns an IO error when the file cannot be written.
pub fn save_extensions(path: &Path, extensions: &[String]) -> io::Result<()> {
    let mut sorted: Vec<&str> = extensions.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.dedup();
    let mut body = sorted.join("\n");
    body.push('\n');
    fs::write(path, body)
}

/// Loads a domain list for batch scanning. Unlike the extension list, a
/// missing file is an error: there is no sensible default domain set.
///
/// # Errors
///
/// Returns an IO error when the file cannot be read.
pub fn load_domains(path: &Path) -> io::Result<Vec<String>> {
    Ok(parse_lines(&fs::read_to_string(path)?))
}

/// Normalizes comma-separated user input into clean extension names:
/// trimmed, lowercased, leading dots stripped, empties dropped.
#[must_use]
pub fn parse_extension_input(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}
