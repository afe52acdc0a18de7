use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{CrypticError, Result};

/// Environment variable that overrides the sheet root directory.
pub const HOME_ENV: &str = "CRYPTIC_RESOLVER_HOME";

/// Name of the hidden directory in the user's home that holds the sheets.
pub const RESOLVER_DIR: &str = ".cryptic-resolver";

/// Name of the optional configuration file inside the sheet root.
pub const CONFIG_FILENAME: &str = "config.toml";

/// A sheet that users can install, shown when a term is not found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetSource {
    pub name: String,
    pub url: String,
}

impl SheetSource {
    fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

/// Resolver settings.
///
/// Read from `<root>/config.toml` when present; every field is optional in
/// the file and falls back to the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Sheet searched first; its matches are presented first.
    pub primary_sheet: String,
    /// Directory-name prefix stripped from sheet directories.
    pub sheet_prefix: String,
    /// Search sheets concurrently.
    pub parallel: bool,
    /// Known sheet repositories, listed in the not-found fallback.
    pub sources: Vec<SheetSource>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            primary_sheet: "computer".to_string(),
            sheet_prefix: "cryptic_".to_string(),
            parallel: true,
            sources: vec![
                SheetSource::new(
                    "computer",
                    "https://github.com/cryptic-resolver/cryptic_computer.git",
                ),
                SheetSource::new(
                    "common",
                    "https://github.com/cryptic-resolver/cryptic_common.git",
                ),
                SheetSource::new(
                    "science",
                    "https://github.com/cryptic-resolver/cryptic_science.git",
                ),
                SheetSource::new(
                    "economy",
                    "https://github.com/cryptic-resolver/cryptic_economy.git",
                ),
                SheetSource::new(
                    "medicine",
                    "https://github.com/cryptic-resolver/cryptic_medicine.git",
                ),
            ],
        }
    }
}

/// Picks the sheet root directory.
///
/// An explicit path wins, then the `CRYPTIC_RESOLVER_HOME` environment
/// variable, then `~/.cryptic-resolver`.
pub fn resolve_root(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    if let Some(path) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    dirs::home_dir()
        .map(|home| home.join(RESOLVER_DIR))
        .ok_or_else(|| CrypticError::Config {
            message: format!("cannot determine home directory; set {HOME_ENV}"),
        })
}

/// Returns the path to the configuration file within the sheet root.
pub fn get_config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILENAME)
}

/// Loads the configuration from the sheet root.
///
/// A missing file yields the default configuration. The file is never
/// written by the resolver.
pub fn load_config(root: &Path) -> Result<ResolverConfig> {
    let config_path = get_config_path(root);

    if !config_path.is_file() {
        return Ok(ResolverConfig::default());
    }

    let contents = fs::read_to_string(&config_path).map_err(|e| CrypticError::Config {
        message: format!(
            "failed to read config file '{}': {}",
            config_path.display(),
            e
        ),
    })?;

    toml::from_str(&contents).map_err(|e| CrypticError::Config {
        message: format!(
            "failed to parse config file '{}': {}",
            config_path.display(),
            e
        ),
    })
}
