use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::ResolverConfig;
use crate::errors::{CrypticError, Defect, Result};
use crate::registry::{Sheet, SheetRegistry};
use crate::search::{SearchOutcome, SheetReport, SheetSearch};
use crate::store::{FsLoader, Loader};
use crate::types::{AggregateResult, FileKey, SheetVerdict};

/// Cross-sheet resolver: searches every registered sheet for a term and
/// combines the findings.
pub struct CrypticResolver<L: Loader = FsLoader> {
    registry: SheetRegistry,
    loader: Arc<L>,
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

impl CrypticResolver<FsLoader> {
    /// Opens the sheets installed under `root`, reading buckets from disk.
    pub fn open(root: &Path, config: &ResolverConfig) -> Result<Self> {
        let registry =
            SheetRegistry::discover(root, &config.primary_sheet, &config.sheet_prefix)?;
        if registry.primary().is_none() && !registry.is_empty() {
            warn!(
                primary = %config.primary_sheet,
                "primary sheet is not installed; searching in name order"
            );
        }
        Ok(Self::new(registry, FsLoader))
    }
}

impl<L: Loader> CrypticResolver<L> {
    pub fn new(registry: SheetRegistry, loader: L) -> Self {
        Self {
            registry,
            loader: Arc::new(loader),
        }
    }

    pub fn registry(&self) -> &SheetRegistry {
        &self.registry
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

impl<L: Loader> CrypticResolver<L> {
    /// Searches the primary sheet, then every other sheet in registry order.
    ///
    /// All sheets are searched even after a match since the same term can
    /// mean different things in different domains.
    pub fn resolve_across_sheets(&self, term: &str) -> Result<AggregateResult> {
        let term = normalize(term)?;
        let search = SheetSearch::new(self.loader.as_ref());
        let reports = self
            .registry
            .search_order()
            .into_iter()
            .map(|sheet| search.search(sheet, &term))
            .collect();
        Ok(aggregate(term, reports))
    }
}

impl<L: Loader + 'static> CrypticResolver<L> {
    /// Same as [`resolve_across_sheets`](Self::resolve_across_sheets) but
    /// searches the sheets on the blocking thread pool.
    ///
    /// Every task is joined in search order before aggregating, so the
    /// result is identical to the sequential one. A task that panics counts
    /// as a loader failure for its sheet.
    pub async fn resolve_across_sheets_parallel(&self, term: &str) -> Result<AggregateResult> {
        let term = normalize(term)?;

        let handles: Vec<(Sheet, tokio::task::JoinHandle<SheetReport>)> = self
            .registry
            .search_order()
            .into_iter()
            .map(|sheet| {
                let loader = Arc::clone(&self.loader);
                let owned = sheet.clone();
                let term = term.clone();
                let handle = tokio::task::spawn_blocking(move || {
                    SheetSearch::new(loader.as_ref()).search(&owned, &term)
                });
                (sheet.clone(), handle)
            })
            .collect();

        let mut reports = Vec::with_capacity(handles.len());
        for (sheet, handle) in handles {
            let report = match handle.await {
                Ok(report) => report,
                Err(e) => {
                    let defect = Defect::LoaderFailure {
                        sheet: sheet.name.clone(),
                        file: FileKey::for_term(&term)
                            .map(|k| k.to_string())
                            .unwrap_or_default(),
                        message: format!("search task failed: {e}"),
                    };
                    warn!("{}", defect);
                    SheetReport {
                        sheet: sheet.name,
                        outcome: SearchOutcome::NotFound,
                        defects: vec![defect],
                    }
                }
            };
            reports.push(report);
        }
        Ok(aggregate(term, reports))
    }
}

/// Lowercases and trims the query, rejecting empty terms.
fn normalize(term: &str) -> Result<String> {
    let term = term.trim();
    if term.is_empty() {
        return Err(CrypticError::InvalidTerm {
            message: "term must not be empty".to_string(),
        });
    }
    Ok(term.to_lowercase())
}

/// Folds per-sheet reports (already in search order) into one result.
fn aggregate(term: String, reports: Vec<SheetReport>) -> AggregateResult {
    let mut result = AggregateResult {
        term,
        ..AggregateResult::default()
    };
    for report in reports {
        let found = report.is_found();
        result.verdicts.push(SheetVerdict {
            sheet: report.sheet,
            found,
        });
        result.defects.extend(report.defects);
        if let SearchOutcome::Found(m) = report.outcome {
            result.matches.push(m);
        }
        result.any_found |= found;
    }
    debug!(
        term = %result.term,
        sheets = result.verdicts.len(),
        matches = result.matches.len(),
        "resolution finished"
    );
    result
}
