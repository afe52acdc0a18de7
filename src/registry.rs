use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::errors::{CrypticError, Result};

/// One installed sheet: a directory of bucket files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sheet {
    /// Sheet name shown to the user (directory name minus the sheet prefix).
    pub name: String,
    pub path: PathBuf,
}

impl Sheet {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Ordered set of sheets with one primary sheet searched first.
///
/// The registry is a plain value: it is built once before resolution and
/// never mutated while a query is in flight.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SheetRegistry {
    sheets: Vec<Sheet>,
    primary: Option<usize>,
}

impl SheetRegistry {
    /// Builds a registry from explicit sheets. If a sheet named `primary`
    /// is present it is marked primary.
    pub fn new(sheets: Vec<Sheet>, primary: &str) -> Self {
        let primary = sheets.iter().position(|s| s.name == primary);
        Self { sheets, primary }
    }

    /// Discovers the sheets installed under `root`.
    ///
    /// Every immediate sub-directory (hidden ones excluded, symlinks
    /// followed) is a sheet; the `prefix` is stripped from its directory
    /// name to form the sheet name.
    /// Sheets are ordered by name so discovery is stable across runs. A
    /// missing root yields an empty registry.
    pub fn discover(root: &Path, primary: &str, prefix: &str) -> Result<Self> {
        if !root.exists() {
            debug!(root = %root.display(), "sheet root absent");
            return Ok(Self::default());
        }

        let mut sheets = Vec::new();
        for entry in WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
        {
            let entry = match entry {
                Ok(entry) => entry,
                // A dangling symlink only hides that one sheet.
                Err(e) if e.depth() > 0 => {
                    warn!(root = %root.display(), "skipping unreadable sheet entry: {e}");
                    continue;
                }
                Err(e) => {
                    return Err(CrypticError::File {
                        message: format!("failed to scan sheet root: {e}"),
                        path: root.display().to_string(),
                    })
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }
            let dir_name = entry.file_name().to_string_lossy().to_string();
            if dir_name.starts_with('.') {
                continue;
            }
            let name = dir_name
                .strip_prefix(prefix)
                .filter(|rest| !rest.is_empty())
                .unwrap_or(&dir_name)
                .to_string();
            sheets.push(Sheet::new(name, entry.into_path()));
        }
        sheets.sort_by(|a, b| a.name.cmp(&b.name));

        debug!(root = %root.display(), count = sheets.len(), "sheets discovered");
        Ok(Self::new(sheets, primary))
    }

    /// Sheets in search order: the primary first, then the rest in registry
    /// order.
    pub fn search_order(&self) -> Vec<&Sheet> {
        let primary = self.primary.map(|i| &self.sheets[i]);
        primary
            .into_iter()
            .chain(
                self.sheets
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| Some(*i) != self.primary)
                    .map(|(_, s)| s),
            )
            .collect()
    }

    pub fn primary(&self) -> Option<&Sheet> {
        self.primary.map(|i| &self.sheets[i])
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}
