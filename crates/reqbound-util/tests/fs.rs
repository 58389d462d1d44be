use std::fs;
use std::path::Path;

use reqbound_util::fs::{find_ancestor_with, resolve_sibling};
use tempfile::TempDir;

#[test]
fn find_ancestor_with_finds_parent() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("reqbound.toml"), "").unwrap();
    let nested = tmp.path().join("a").join("b");
    fs::create_dir_all(&nested).unwrap();

    let found = find_ancestor_with(&nested, "reqbound.toml").unwrap();
    assert_eq!(found, tmp.path());
}

#[test]
fn find_ancestor_with_ignores_directories() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("marker.d")).unwrap();
    assert!(find_ancestor_with(tmp.path(), "marker.d").is_none());
}

#[test]
fn resolve_sibling_relative() {
    let p = resolve_sibling(Path::new("requirements/base.txt"), "extra.txt");
    assert_eq!(p, Path::new("requirements/extra.txt"));
}

#[test]
fn resolve_sibling_absolute_unchanged() {
    let abs = std::env::temp_dir().join("other.txt");
    let p = resolve_sibling(Path::new("requirements/base.txt"), abs.to_str().unwrap());
    assert_eq!(p, abs);
}
