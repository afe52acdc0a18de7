use crate::store::EntryStore;
use crate::types::{Category, Entry, Meaning};

/// Result of looking a term up in one bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<'a> {
    /// The term is not in the bucket.
    NotFound,
    /// The entry defers to another term; the target is the raw `same` value.
    Redirect(&'a str),
    /// The entry has exactly one meaning.
    Single(&'a Meaning),
    /// The entry has several unrelated meanings, in source-declared order.
    Multiple(&'a [Category]),
    /// The entry exists but carries no usable meaning.
    Malformed,
}

/// Resolves `term` against a single bucket.
///
/// Lookup is exact apart from case. Redirects are reported, not followed;
/// following them is the sheet search's job since the target may live in a
/// different bucket.
pub fn resolve<'a>(store: &'a EntryStore, term: &str) -> Outcome<'a> {
    match store.get(term.trim()) {
        None => Outcome::NotFound,
        Some(entry) => classify(entry),
    }
}

/// Maps an already-located entry onto its outcome.
pub(crate) fn classify(entry: &Entry) -> Outcome<'_> {
    match entry {
        Entry::Redirect(target) => Outcome::Redirect(target),
        Entry::Categorized(categories) if !categories.is_empty() => {
            Outcome::Multiple(categories)
        }
        Entry::Simple(meaning) => Outcome::Single(meaning),
        Entry::Categorized(_) | Entry::Malformed => Outcome::Malformed,
    }
}
