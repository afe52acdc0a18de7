use tracing::{debug, warn};

use crate::errors::{Defect, RedirectFault};
use crate::registry::Sheet;
use crate::resolution::{resolve, Outcome};
use crate::store::{EntryStore, Loader};
use crate::types::{Category, Entry, FileKey, Finding, NamedMeaning, RedirectTarget, SheetMatch};

/// Whether a sheet produced a meaning for the term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(SheetMatch),
    NotFound,
}

/// Outcome of searching one sheet, with any defects met on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetReport {
    pub sheet: String,
    pub outcome: SearchOutcome,
    pub defects: Vec<Defect>,
}

impl SheetReport {
    fn new(sheet: &Sheet) -> Self {
        Self {
            sheet: sheet.name.clone(),
            outcome: SearchOutcome::NotFound,
            defects: Vec::new(),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self.outcome, SearchOutcome::Found(_))
    }

    fn defect(&mut self, defect: Defect) {
        warn!("{}", defect);
        self.defects.push(defect);
    }
}

/// Searches a single sheet for a term.
pub struct SheetSearch<'a, L: Loader + ?Sized> {
    loader: &'a L,
}

impl<'a, L: Loader + ?Sized> SheetSearch<'a, L> {
    pub fn new(loader: &'a L) -> Self {
        Self { loader }
    }

    /// Looks `term` up in `sheet`, following at most one redirect.
    ///
    /// Never fails: absent buckets, authoring defects and unreadable files
    /// all degrade to [`SearchOutcome::NotFound`], the latter two with a
    /// defect recorded in the report.
    pub fn search(&self, sheet: &Sheet, term: &str) -> SheetReport {
        let mut report = SheetReport::new(sheet);
        let term = term.trim().to_lowercase();
        let Some(key) = FileKey::for_term(&term) else {
            return report;
        };

        let Some(store) = self.load(sheet, &key, &mut report) else {
            return report;
        };

        let finding = match resolve(&store, &term) {
            Outcome::NotFound => None,
            Outcome::Malformed => {
                report.defect(Defect::MalformedEntry {
                    sheet: sheet.name.clone(),
                    file: key.to_string(),
                    term: term.clone(),
                });
                None
            }
            Outcome::Single(meaning) => Some((Finding::Single(meaning.clone()), None)),
            Outcome::Multiple(categories) => {
                collect_categories(sheet, &key, &term, categories, &mut report)
                    .map(|f| (f, None))
            }
            Outcome::Redirect(raw) => self
                .follow(sheet, &key, &store, &term, raw, &mut report)
                .map(|f| (f, Some(raw.to_string()))),
        };

        if let Some((finding, via)) = finding {
            report.outcome = SearchOutcome::Found(SheetMatch {
                sheet: sheet.name.clone(),
                via,
                finding,
            });
        }
        report
    }

    /// Follows a single synonym jump from `term` to `raw`.
    ///
    /// The already-loaded bucket is reused when the target hashes to the
    /// same bucket; otherwise the target's bucket is loaded.
    fn follow(
        &self,
        sheet: &Sheet,
        key: &FileKey,
        store: &EntryStore,
        term: &str,
        raw: &str,
        report: &mut SheetReport,
    ) -> Option<Finding> {
        let target = RedirectTarget::parse(raw);
        let broken = |file: &FileKey, reason: RedirectFault| Defect::BrokenRedirect {
            sheet: sheet.name.clone(),
            file: file.to_string(),
            term: term.to_string(),
            target: raw.to_string(),
            reason,
        };

        let Some(target_key) = FileKey::for_term(&target.canonical) else {
            report.defect(broken(key, RedirectFault::MissingTarget));
            return None;
        };

        let reloaded;
        let target_store = if target_key == *key {
            store
        } else {
            debug!(sheet = %sheet.name, from = %key, to = %target_key, "redirect crosses buckets");
            let known = report.defects.len();
            match self.load(sheet, &target_key, report) {
                Some(s) => {
                    reloaded = s;
                    &reloaded
                }
                None => {
                    // A loader failure has already been recorded.
                    if report.defects.len() == known {
                        report.defect(broken(&target_key, RedirectFault::MissingFile));
                    }
                    return None;
                }
            }
        };

        let Some(entry) = target_store.get(&target.canonical) else {
            report.defect(broken(&target_key, RedirectFault::MissingTarget));
            return None;
        };

        let entry = match (&target.category, entry) {
            (None, Entry::Categorized(categories)) => {
                let names = categories.iter().map(|c| c.name.clone()).collect();
                report.defect(broken(
                    &target_key,
                    RedirectFault::Ambiguous { categories: names },
                ));
                return None;
            }
            (None, entry) => entry,
            (Some(name), entry) => match entry.category(name) {
                Some(category) => &category.entry,
                None => {
                    report.defect(broken(
                        &target_key,
                        RedirectFault::MissingCategory {
                            category: name.clone(),
                        },
                    ));
                    return None;
                }
            },
        };

        match entry {
            Entry::Simple(meaning) => Some(Finding::Single(meaning.clone())),
            Entry::Redirect(next) => {
                report.defect(broken(
                    &target_key,
                    RedirectFault::Chained { next: next.clone() },
                ));
                None
            }
            Entry::Categorized(_) | Entry::Malformed => {
                report.defect(broken(&target_key, RedirectFault::EmptyTarget));
                None
            }
        }
    }

    /// Loads a bucket, recording a loader failure in the report.
    fn load(&self, sheet: &Sheet, key: &FileKey, report: &mut SheetReport) -> Option<EntryStore> {
        match self.loader.load(sheet, key) {
            Ok(store) => store,
            Err(e) => {
                report.defect(Defect::LoaderFailure {
                    sheet: sheet.name.clone(),
                    file: key.to_string(),
                    message: e.to_string(),
                });
                None
            }
        }
    }
}

/// Gathers the simple meanings of a categorized entry in source order.
///
/// Categories without a meaning of their own are reported and skipped.
fn collect_categories(
    sheet: &Sheet,
    key: &FileKey,
    term: &str,
    categories: &[Category],
    report: &mut SheetReport,
) -> Option<Finding> {
    let mut meanings = Vec::with_capacity(categories.len());
    for category in categories {
        match &category.entry {
            Entry::Simple(meaning) => meanings.push(NamedMeaning {
                category: category.name.clone(),
                meaning: meaning.clone(),
            }),
            Entry::Redirect(target) => report.defect(Defect::RedirectingCategory {
                sheet: sheet.name.clone(),
                file: key.to_string(),
                term: format!("{}.{}", term, category.name),
                target: target.clone(),
            }),
            Entry::Categorized(_) | Entry::Malformed => report.defect(Defect::MalformedEntry {
                sheet: sheet.name.clone(),
                file: key.to_string(),
                term: format!("{}.{}", term, category.name),
            }),
        }
    }
    if meanings.is_empty() {
        None
    } else {
        Some(Finding::Multiple(meanings))
    }
}
