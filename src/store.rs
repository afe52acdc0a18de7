use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::errors::{CrypticError, Result};
use crate::registry::Sheet;
use crate::types::{Entry, FileKey};

/// Extension of every bucket file inside a sheet.
pub const SHEET_FILE_EXTENSION: &str = "toml";

/// The decoded contents of one bucket file, keyed by lowercase term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryStore {
    entries: HashMap<String, Entry>,
}

impl EntryStore {
    /// Parses a bucket file's TOML source.
    ///
    /// Every top-level key becomes a lowercase term; its value is decoded into
    /// an [`Entry`] once, here.
    pub fn parse(source: &str) -> std::result::Result<Self, toml::de::Error> {
        let table: toml::Table = toml::from_str(source)?;
        Ok(table
            .iter()
            .map(|(term, value)| (term.to_lowercase(), Entry::from_toml(value)))
            .collect())
    }

    /// Looks up a term, ignoring case.
    pub fn get(&self, term: &str) -> Option<&Entry> {
        self.entries.get(&term.to_lowercase())
    }

    pub fn insert(&mut self, term: &str, entry: Entry) {
        self.entries.insert(term.to_lowercase(), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Entry)> for EntryStore {
    fn from_iter<I: IntoIterator<Item = (String, Entry)>>(iter: I) -> Self {
        let mut store = EntryStore::default();
        for (term, entry) in iter {
            store.insert(&term, entry);
        }
        store
    }
}

/// Source of bucket files for the sheet search.
///
/// Implementations return `Ok(None)` when the bucket does not exist in the
/// sheet, which is the normal case for letters a sheet does not cover, and
/// an error only when an existing file cannot be read or parsed.
pub trait Loader: Send + Sync {
    fn load(&self, sheet: &Sheet, key: &FileKey) -> Result<Option<EntryStore>>;
}

/// Loads buckets from `<sheet dir>/<key>.toml` on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl FsLoader {
    /// Returns the path of the bucket file for `key` within `sheet`.
    ///
    /// Returns `None` when the file name would not be a single plain path
    /// component (e.g. the key `/` of a term like `/etc`), so a bucket can
    /// never resolve outside its sheet directory.
    pub fn bucket_path(sheet: &Sheet, key: &FileKey) -> Option<PathBuf> {
        let file_name = format!("{}.{}", key.as_str(), SHEET_FILE_EXTENSION);
        let mut components = Path::new(&file_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Some(sheet.path.join(&file_name)),
            _ => None,
        }
    }
}

impl Loader for FsLoader {
    fn load(&self, sheet: &Sheet, key: &FileKey) -> Result<Option<EntryStore>> {
        let Some(path) = Self::bucket_path(sheet, key) else {
            debug!(sheet = %sheet.name, file = %key, "bucket key is not a file name");
            return Ok(None);
        };
        if !path.is_file() {
            debug!(sheet = %sheet.name, file = %key, "bucket absent");
            return Ok(None);
        }

        let source = fs::read_to_string(&path).map_err(|e| CrypticError::File {
            message: format!("failed to read bucket: {e}"),
            path: path.display().to_string(),
        })?;

        let store = EntryStore::parse(&source).map_err(|e| CrypticError::Parse {
            message: e.to_string(),
            path: path.display().to_string(),
        })?;

        debug!(sheet = %sheet.name, file = %key, entries = store.len(), "bucket loaded");
        Ok(Some(store))
    }
}
