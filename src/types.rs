use serde::Serialize;

use crate::errors::Defect;

/// Bucket key shared by every term that starts with a digit.
pub const DIGIT_BUCKET: &str = "0123456789";

// Field names that hold the parts of a meaning, in their short on-disk form
// and their long equivalents. None of them can ever name a category.
const DISPLAY_KEYS: &[&str] = &["disp", "display"];
const DESCRIPTION_KEYS: &[&str] = &["desc", "description"];
const FULL_KEYS: &[&str] = &["full"];
const SEE_KEYS: &[&str] = &["see", "seeAlso"];
const SAME_KEYS: &[&str] = &["same", "sameAs"];

/// Returns `true` if `key` is one of the fixed entry fields.
pub fn is_fixed_field(key: &str) -> bool {
    [DISPLAY_KEYS, DESCRIPTION_KEYS, FULL_KEYS, SEE_KEYS, SAME_KEYS]
        .iter()
        .any(|keys| keys.contains(&key))
}

/// One human-readable meaning of a term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Meaning {
    /// Canonical capitalization shown to the user.
    pub display: Option<String>,
    pub description: String,
    /// Expanded explanation.
    pub full: Option<String>,
    /// Cross-referenced term names, in authored order.
    pub see_also: Vec<String>,
}

/// One of several unrelated meanings of the same term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Category name as authored (e.g. `Download`).
    pub name: String,
    pub entry: Entry,
}

/// The decoded definition of one term.
///
/// Decoding applies a fixed precedence when several shapes are present in
/// the source table: a redirect wins over categories, which win over a
/// plain description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Simple(Meaning),
    /// Raw `same` target, `TERM` or `TERM.CATEGORY`.
    Redirect(String),
    /// Categories in source-declared order.
    Categorized(Vec<Category>),
    /// Present but carries none of description, categories or redirect.
    Malformed,
}

impl Entry {
    /// Decodes an entry from its TOML representation.
    pub fn from_toml(value: &toml::Value) -> Entry {
        let Some(table) = value.as_table() else {
            return Entry::Malformed;
        };

        if let Some(target) = first_str(table, SAME_KEYS) {
            return Entry::Redirect(target.to_string());
        }

        // Categories without their own display name inherit the parent's.
        let display = first_str(table, DISPLAY_KEYS);
        let categories: Vec<Category> = table
            .iter()
            .filter(|(key, value)| !is_fixed_field(key) && value.is_table())
            .map(|(key, value)| {
                let mut entry = Entry::from_toml(value);
                if let Entry::Simple(ref mut meaning) = entry {
                    if meaning.display.is_none() {
                        meaning.display = display.map(str::to_string);
                    }
                }
                Category {
                    name: key.clone(),
                    entry,
                }
            })
            .collect();
        if !categories.is_empty() {
            return Entry::Categorized(categories);
        }

        match first_str(table, DESCRIPTION_KEYS) {
            Some(description) => Entry::Simple(Meaning {
                display: display.map(str::to_string),
                description: description.to_string(),
                full: first_str(table, FULL_KEYS).map(str::to_string),
                see_also: see_also(table),
            }),
            None => Entry::Malformed,
        }
    }

    /// Finds a category by name, ignoring ASCII case.
    pub fn category(&self, name: &str) -> Option<&Category> {
        match self {
            Entry::Categorized(categories) => categories
                .iter()
                .find(|c| c.name.eq_ignore_ascii_case(name)),
            _ => None,
        }
    }
}

fn first_str<'a>(table: &'a toml::Table, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| table.get(*key))
        .and_then(toml::Value::as_str)
}

/// `see` may be authored as an array of names or a single name.
fn see_also(table: &toml::Table) -> Vec<String> {
    match SEE_KEYS.iter().find_map(|key| table.get(*key)) {
        Some(toml::Value::Array(items)) => items
            .iter()
            .filter_map(toml::Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(toml::Value::String(name)) => vec![name.clone()],
        _ => Vec::new(),
    }
}

/// Name of the bucket file (without extension) a term lives in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileKey(String);

impl FileKey {
    /// Computes the bucket for `term`: its lowercase first character, or the
    /// shared digit bucket. Returns `None` for an empty term.
    pub fn for_term(term: &str) -> Option<FileKey> {
        let first = term.trim().chars().next()?;
        if first.is_ascii_digit() {
            return Some(FileKey(DIGIT_BUCKET.to_string()));
        }
        Some(FileKey(first.to_lowercase().collect()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FileKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A parsed synonym target of the form `CANONICAL[.CATEGORY]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTarget {
    /// Canonical term, lowercased for lookup.
    pub canonical: String,
    pub category: Option<String>,
}

impl RedirectTarget {
    pub fn parse(raw: &str) -> RedirectTarget {
        let raw = raw.trim();
        match raw.split_once('.') {
            Some((canonical, category)) if !category.is_empty() => RedirectTarget {
                canonical: canonical.to_lowercase(),
                category: Some(category.to_string()),
            },
            Some((canonical, _)) => RedirectTarget {
                canonical: canonical.to_lowercase(),
                category: None,
            },
            None => RedirectTarget {
                canonical: raw.to_lowercase(),
                category: None,
            },
        }
    }
}

/// A meaning labelled with the category it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedMeaning {
    pub category: String,
    pub meaning: Meaning,
}

/// What a sheet has to say about a term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "meanings")]
pub enum Finding {
    Single(Meaning),
    /// Meanings in source-declared category order.
    Multiple(Vec<NamedMeaning>),
}

/// A finding together with the sheet it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetMatch {
    pub sheet: String,
    /// Redirect target that was followed to reach the finding, if any.
    pub via: Option<String>,
    pub finding: Finding,
}

/// Per-sheet found/not-found record, in search order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetVerdict {
    pub sheet: String,
    pub found: bool,
}

/// Combined outcome of searching every sheet for one term.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateResult {
    pub term: String,
    /// Matches in search order; the primary sheet's match comes first.
    pub matches: Vec<SheetMatch>,
    pub verdicts: Vec<SheetVerdict>,
    pub defects: Vec<Defect>,
    pub any_found: bool,
}

impl AggregateResult {
    /// `true` when no sheet knew the term and the caller should show the
    /// contribution fallback.
    pub fn is_exhausted(&self) -> bool {
        !self.any_found
    }
}
