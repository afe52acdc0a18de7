use std::fs;

use cryptic::errors::CrypticError;
use cryptic::registry::{Sheet, SheetRegistry};
use cryptic::store::{EntryStore, FsLoader, Loader};
use cryptic::types::{Entry, FileKey};
use tempfile::TempDir;

fn key(term: &str) -> FileKey {
    FileKey::for_term(term).unwrap()
}

#[test]
fn test_store_keys_are_lowercased() {
    let store = EntryStore::parse("[XDG]\ndesc = \"X Desktop Group\"\n").unwrap();
    assert_eq!(store.len(), 1);
    assert!(matches!(store.get("xdg"), Some(Entry::Simple(_))));
    assert!(matches!(store.get("Xdg"), Some(Entry::Simple(_))));
}

#[test]
fn test_fs_loader_absent_bucket_is_none() {
    let dir = TempDir::new().unwrap();
    let sheet = Sheet::new("computer", dir.path());
    let loaded = FsLoader.load(&sheet, &key("zsh")).unwrap();
    assert!(loaded.is_none());
}

#[test]
fn test_fs_loader_reads_bucket() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("x.toml"),
        "[xdg]\ndisp = \"XDG\"\ndesc = \"X Desktop Group\"\n",
    )
    .unwrap();
    let sheet = Sheet::new("computer", dir.path());
    let store = FsLoader.load(&sheet, &key("xdg")).unwrap().unwrap();
    assert!(store.get("xdg").is_some());
}

#[test]
fn test_fs_loader_reports_parse_failure() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("b.toml"), "[broken\ndesc = ").unwrap();
    let sheet = Sheet::new("computer", dir.path());
    let err = FsLoader.load(&sheet, &key("bad")).unwrap_err();
    assert!(matches!(err, CrypticError::Parse { .. }));
}

#[test]
fn test_bucket_path_uses_digit_bucket() {
    let sheet = Sheet::new("computer", "/sheets/cryptic_computer");
    let path = FsLoader::bucket_path(&sheet, &key("3d")).unwrap();
    assert!(path.ends_with("cryptic_computer/0123456789.toml"));
}

#[test]
fn test_bucket_path_stays_inside_sheet() {
    let sheet = Sheet::new("computer", "/sheets/cryptic_computer");
    assert!(FsLoader::bucket_path(&sheet, &key("/etc")).is_none());

    let dotted = FsLoader::bucket_path(&sheet, &key(".net")).unwrap();
    assert!(dotted.starts_with("/sheets/cryptic_computer"));
}

#[test]
fn test_fs_loader_separator_key_is_none() {
    let dir = TempDir::new().unwrap();
    let sheet = Sheet::new("computer", dir.path());
    assert!(FsLoader.load(&sheet, &key("/dev")).unwrap().is_none());
}

#[test]
fn test_discover_strips_prefix_and_puts_primary_first() {
    let dir = TempDir::new().unwrap();
    for name in ["cryptic_common", "cryptic_computer", "cryptic_medicine", ".git"] {
        fs::create_dir(dir.path().join(name)).unwrap();
    }
    fs::write(dir.path().join("config.toml"), "").unwrap();

    let registry = SheetRegistry::discover(dir.path(), "computer", "cryptic_").unwrap();
    assert_eq!(registry.len(), 3);
    assert_eq!(registry.primary().unwrap().name, "computer");

    let order: Vec<&str> = registry
        .search_order()
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(order, vec!["computer", "common", "medicine"]);
}

#[cfg(unix)]
#[test]
fn test_discover_follows_symlinked_sheets() {
    let installed = TempDir::new().unwrap();
    let real = installed.path().join("cryptic_computer");
    fs::create_dir(&real).unwrap();
    fs::write(real.join("x.toml"), "[xdg]\ndesc = \"X Desktop Group\"\n").unwrap();

    let root = TempDir::new().unwrap();
    std::os::unix::fs::symlink(&real, root.path().join("cryptic_computer")).unwrap();

    let registry = SheetRegistry::discover(root.path(), "computer", "cryptic_").unwrap();
    assert_eq!(registry.len(), 1);
    let sheet = registry.primary().unwrap();
    assert_eq!(sheet.name, "computer");
    assert!(FsLoader.load(sheet, &key("xdg")).unwrap().is_some());
}

#[cfg(unix)]
#[test]
fn test_discover_skips_dangling_symlink() {
    let root = TempDir::new().unwrap();
    fs::create_dir(root.path().join("cryptic_common")).unwrap();
    std::os::unix::fs::symlink(
        root.path().join("gone"),
        root.path().join("cryptic_medicine"),
    )
    .unwrap();

    let registry = SheetRegistry::discover(root.path(), "computer", "cryptic_").unwrap();
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.sheets()[0].name, "common");
}

#[test]
fn test_discover_keeps_unprefixed_names() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("slang")).unwrap();
    let registry = SheetRegistry::discover(dir.path(), "computer", "cryptic_").unwrap();
    assert_eq!(registry.sheets()[0].name, "slang");
    assert!(registry.primary().is_none());
}

#[test]
fn test_discover_missing_root_is_empty() {
    let dir = TempDir::new().unwrap();
    let registry =
        SheetRegistry::discover(&dir.path().join("nowhere"), "computer", "cryptic_").unwrap();
    assert!(registry.is_empty());
    assert!(registry.search_order().is_empty());
}
