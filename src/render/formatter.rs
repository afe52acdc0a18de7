use std::path::Path;

use crate::config::SheetSource;
use crate::errors::Result;
use crate::registry::SheetRegistry;
use crate::types::{AggregateResult, Finding, Meaning, SheetMatch};

/// Shown in place of a meaning's display name when none was authored.
pub const NO_NAME: &str = "No name!";

/// Formats one sheet's match, labelled with the sheet it came from.
///
/// Categorized meanings are printed in the order they were authored.
pub fn format_match(m: &SheetMatch) -> String {
    let mut out = format!("From: {}\n", m.sheet);
    match &m.finding {
        Finding::Single(meaning) => push_meaning(&mut out, meaning, None),
        Finding::Multiple(meanings) => {
            for named in meanings {
                push_meaning(&mut out, &named.meaning, Some(&named.category));
            }
        }
    }
    out
}

fn push_meaning(out: &mut String, meaning: &Meaning, category: Option<&str>) {
    let display = meaning.display.as_deref().unwrap_or(NO_NAME);
    match category {
        Some(category) => out.push_str(&format!(
            "\n  {} ({}): {}\n",
            display, category, meaning.description
        )),
        None => out.push_str(&format!("\n  {}: {}\n", display, meaning.description)),
    }
    if let Some(ref full) = meaning.full {
        out.push_str(&format!("\n     {}\n", full));
    }
    if !meaning.see_also.is_empty() {
        out.push_str(&format!("\n  SEE ALSO {}\n", meaning.see_also.join(", ")));
    }
}

/// Formats a full resolution result as text.
///
/// Matches are printed in search order. An exhausted result prints the
/// contribution fallback listing `sources`.
pub fn format_result_as_text(result: &AggregateResult, sources: &[SheetSource]) -> String {
    if result.is_exhausted() {
        return format_not_found(sources);
    }
    result
        .matches
        .iter()
        .map(format_match)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Formats a resolution result as pretty-printed JSON.
pub fn format_result_as_json(result: &AggregateResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// The "nothing found" fallback inviting contributions.
pub fn format_not_found(sources: &[SheetSource]) -> String {
    let mut out = String::new();
    out.push_str("cr: Not found anything.\n\n");
    out.push_str("You may update your sheets with git,\n");
    out.push_str("or you could contribute to our sheets: Thanks!\n\n");
    push_sources(&mut out, sources);
    out
}

/// Shown when no sheet is installed under the root at all.
pub fn format_no_sheets(root: &Path, sources: &[SheetSource]) -> String {
    let mut out = format!("cr: No sheets installed under {}.\n\n", root.display());
    out.push_str("Clone one or more of these into that directory:\n\n");
    push_sources(&mut out, sources);
    out
}

fn push_sources(out: &mut String, sources: &[SheetSource]) {
    let width = sources.iter().map(|s| s.name.len()).max().unwrap_or(0) + 1;
    for (i, source) in sources.iter().enumerate() {
        out.push_str(&format!(
            "    {}. {:<width$} {}\n",
            i + 1,
            format!("{}:", source.name),
            source.url,
            width = width
        ));
    }
}

/// Lists installed sheets in search order, marking the primary.
pub fn format_sheet_list(registry: &SheetRegistry) -> String {
    let primary = registry.primary().map(|s| s.name.as_str());
    let mut out = String::new();
    for sheet in registry.search_order() {
        let marker = if Some(sheet.name.as_str()) == primary {
            " (primary)"
        } else {
            ""
        };
        out.push_str(&format!(
            "{}{}  {}\n",
            sheet.name,
            marker,
            sheet.path.display()
        ));
    }
    out
}
