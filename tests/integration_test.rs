use std::fs;
use std::path::Path;

use cryptic::config::ResolverConfig;
use cryptic::cryptic::CrypticResolver;
use cryptic::errors::{CrypticError, Defect, RedirectFault};
use cryptic::types::*;
use tempfile::TempDir;

/// Writes `<root>/cryptic_<sheet>/<file>.toml`.
fn write_bucket(root: &Path, sheet: &str, file: &str, source: &str) {
    let dir = root.join(format!("cryptic_{sheet}"));
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{file}.toml")), source).unwrap();
}

/// Builds a root with `computer`, `common` and `medicine` sheets.
fn setup_sheets() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    write_bucket(
        root,
        "computer",
        "x",
        r#"
[xdg]
disp = "XDG"
desc = "X Desktop Group"

[xdg2]
disp = "XDG"

[xdg2.download]
desc = "XDG download directory"

[xdg2.group]
desc = "X Desktop Group"
"#,
    );
    write_bucket(
        root,
        "computer",
        "a",
        r#"
[ack]
disp = "ACK"
desc = "acknowledgement packet"
"#,
    );
    write_bucket(
        root,
        "computer",
        "b",
        r#"
[blah]
same = "xdg2"

[blub]
same = "xdg2.download"
"#,
    );
    write_bucket(
        root,
        "medicine",
        "a",
        r#"
[ack]
disp = "a.c."
desc = "before meals, from Latin"
"#,
    );
    fs::create_dir_all(root.join("cryptic_common")).unwrap();
    dir
}

fn open(root: &Path) -> CrypticResolver {
    CrypticResolver::open(root, &ResolverConfig::default()).unwrap()
}

fn description(m: &SheetMatch) -> &str {
    match &m.finding {
        Finding::Single(meaning) => &meaning.description,
        Finding::Multiple(_) => panic!("expected a single meaning"),
    }
}

#[test]
fn test_single_match_from_primary() {
    let dir = setup_sheets();
    let result = open(dir.path()).resolve_across_sheets("xdg").unwrap();

    assert!(result.any_found);
    assert_eq!(result.matches.len(), 1);
    assert_eq!(result.matches[0].sheet, "computer");
    assert_eq!(description(&result.matches[0]), "X Desktop Group");
    assert!(result.defects.is_empty());
}

#[test]
fn test_all_sheets_searched_primary_first() {
    let dir = setup_sheets();
    let result = open(dir.path()).resolve_across_sheets("ACK").unwrap();

    let sheets: Vec<&str> = result.matches.iter().map(|m| m.sheet.as_str()).collect();
    assert_eq!(sheets, vec!["computer", "medicine"]);
    assert_eq!(description(&result.matches[0]), "acknowledgement packet");
    assert_eq!(description(&result.matches[1]), "before meals, from Latin");

    let verdicts: Vec<(&str, bool)> = result
        .verdicts
        .iter()
        .map(|v| (v.sheet.as_str(), v.found))
        .collect();
    assert_eq!(
        verdicts,
        vec![("computer", true), ("common", false), ("medicine", true)]
    );
}

#[test]
fn test_multiple_meanings_keep_source_order() {
    let dir = setup_sheets();
    let result = open(dir.path()).resolve_across_sheets("xdg2").unwrap();
    match &result.matches[0].finding {
        Finding::Multiple(meanings) => {
            let categories: Vec<&str> = meanings.iter().map(|m| m.category.as_str()).collect();
            assert_eq!(categories, vec!["download", "group"]);
            assert!(meanings
                .iter()
                .all(|m| m.meaning.display.as_deref() == Some("XDG")));
        }
        other => panic!("expected Multiple, got {:?}", other),
    }
}

#[test]
fn test_ambiguous_redirect_is_broken() {
    let dir = setup_sheets();
    let result = open(dir.path()).resolve_across_sheets("blah").unwrap();

    assert!(result.is_exhausted());
    assert!(result.matches.is_empty());
    match &result.defects[..] {
        [Defect::BrokenRedirect {
            sheet,
            file,
            term,
            target,
            reason,
        }] => {
            assert_eq!(sheet, "computer");
            assert_eq!(file, "x");
            assert_eq!(term, "blah");
            assert_eq!(target, "xdg2");
            assert_eq!(
                *reason,
                RedirectFault::Ambiguous {
                    categories: vec!["download".to_string(), "group".to_string()],
                }
            );
        }
        other => panic!("expected one broken redirect, got {:?}", other),
    }
}

#[test]
fn test_redirect_with_category_resolves_across_buckets() {
    let dir = setup_sheets();
    let result = open(dir.path()).resolve_across_sheets("blub").unwrap();

    assert!(result.any_found);
    assert_eq!(description(&result.matches[0]), "XDG download directory");
    assert_eq!(result.matches[0].via.as_deref(), Some("xdg2.download"));
}

#[test]
fn test_unknown_term_is_exhausted() {
    let dir = setup_sheets();
    let result = open(dir.path()).resolve_across_sheets("zzz").unwrap();

    assert!(!result.any_found);
    assert!(result.is_exhausted());
    assert!(result.matches.is_empty());
    assert_eq!(result.verdicts.len(), 3);
    assert!(result.verdicts.iter().all(|v| !v.found));
}

#[test]
fn test_resolution_is_idempotent() {
    let dir = setup_sheets();
    let resolver = open(dir.path());
    let first = resolver.resolve_across_sheets("ack").unwrap();
    let second = resolver.resolve_across_sheets("ack").unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_broken_sheet_does_not_stop_others() {
    let dir = setup_sheets();
    write_bucket(dir.path(), "common", "a", "[ack\ndesc = ");

    let result = open(dir.path()).resolve_across_sheets("ack").unwrap();
    assert_eq!(result.matches.len(), 2);
    assert!(matches!(
        &result.defects[..],
        [Defect::LoaderFailure { sheet, .. }] if sheet == "common"
    ));
}

#[test]
fn test_malformed_entry_counts_as_not_found() {
    let dir = setup_sheets();
    write_bucket(dir.path(), "common", "e", "[emacs]\ndisp = \"Emacs\"\n");

    let result = open(dir.path()).resolve_across_sheets("emacs").unwrap();
    assert!(result.is_exhausted());
    assert!(matches!(
        &result.defects[..],
        [Defect::MalformedEntry { term, file, .. }] if term == "emacs" && file == "e"
    ));
}

#[test]
fn test_empty_term_is_rejected() {
    let dir = setup_sheets();
    let err = open(dir.path()).resolve_across_sheets("  ").unwrap_err();
    assert!(matches!(err, CrypticError::InvalidTerm { .. }));
}

#[test]
fn test_no_sheets_is_exhausted() {
    let dir = TempDir::new().unwrap();
    let resolver = open(dir.path());
    assert!(resolver.registry().is_empty());
    let result = resolver.resolve_across_sheets("xdg").unwrap();
    assert!(result.is_exhausted());
    assert!(result.verdicts.is_empty());
}

#[tokio::test]
async fn test_parallel_matches_sequential() {
    let dir = setup_sheets();
    let resolver = open(dir.path());
    for term in ["ack", "xdg", "xdg2", "blah", "blub", "zzz"] {
        let sequential = resolver.resolve_across_sheets(term).unwrap();
        let parallel = resolver.resolve_across_sheets_parallel(term).await.unwrap();
        assert_eq!(sequential, parallel, "term {term}");
    }
}
