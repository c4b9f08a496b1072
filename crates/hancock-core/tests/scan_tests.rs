use std::fs;
use std::path::Path;

use hancock_core::{scrape_directory, scrape_file, Config, LanguageRegistry, ScanError, Scanner};
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "src/animal.js", "class Animal { speak(){} }");
    write(dir.path(), "src/util.mjs", "function helper(a){ }");
    write(dir.path(), "README.md", "# readme { }");
    write(dir.path(), "node_modules/dep/index.js", "function vendored(){ }");
    write(dir.path(), ".hidden/secret.js", "function hidden(){ }");
    dir
}

#[test]
fn test_scrape_directory_skips_excluded_and_unknown_files() {
    let dir = project();
    let registry = LanguageRegistry::new();
    let reports = scrape_directory(dir.path(), &registry, &Config::default()).unwrap();

    let files: Vec<_> = reports
        .iter()
        .map(|r| r.path.strip_prefix(dir.path()).unwrap().to_path_buf())
        .collect();
    assert_eq!(
        files,
        vec![Path::new("src/animal.js"), Path::new("src/util.mjs")]
    );

    let animal = &reports[0];
    assert_eq!(animal.language, "JavaScript");
    assert_eq!(animal.hash.len(), 64);
    assert!(animal.forest.contains_root("Animal"));
    assert!(animal.directory.is_none());
}

#[test]
fn test_oversized_files_are_skipped() {
    let dir = project();
    let registry = LanguageRegistry::new();
    let scanner = Scanner::new(&registry).max_file_size(24);

    let reports = scanner.scrape_directory(dir.path()).unwrap();
    // Only util.mjs fits in 24 bytes.
    assert_eq!(reports.len(), 1);
    assert!(reports[0].forest.contains_root("helper"));

    let err = scanner
        .scrape_file(dir.path().join("src/animal.js"))
        .unwrap_err();
    assert!(matches!(err, ScanError::TooLarge { size: 26, limit: 24, .. }));
}

#[test]
fn test_scrape_file_falls_back_to_default_language() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "script.txt", "function foo(a,b){ }");
    let registry = LanguageRegistry::new();

    let report = scrape_file(dir.path().join("script.txt"), &registry, &Config::default()).unwrap();
    assert_eq!(report.language, "JavaScript");
    assert!(report.forest.contains_root("foo"));

    let err = Scanner::new(&registry)
        .scrape_file(dir.path().join("script.txt"))
        .unwrap_err();
    assert!(matches!(err, ScanError::UnknownLanguage { .. }));
}

#[test]
fn test_identical_content_hashes_match() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.js", "function foo(){ }");
    write(dir.path(), "b.js", "function foo(){ }");
    let registry = LanguageRegistry::new();

    let reports = Scanner::new(&registry)
        .keep_directory(true)
        .scrape_directory(dir.path())
        .unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].hash, reports[1].hash);
    assert_eq!(reports[0].directory.as_ref().map(|d| d.len()), Some(1));
}

#[test]
fn test_missing_root_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let registry = LanguageRegistry::new();
    let err = Scanner::new(&registry)
        .scrape_directory(dir.path().join("absent"))
        .unwrap_err();
    assert!(matches!(err, ScanError::Io { .. }));
}

#[test]
fn test_warnings_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "broken.js", "function foo(){");
    let registry = LanguageRegistry::new();

    let report = Scanner::new(&registry)
        .language("javascript")
        .unwrap()
        .scrape_file(dir.path().join("broken.js"))
        .unwrap();
    assert_eq!(report.warnings.len(), 1);
    assert!(report.forest.contains_root("foo"));
}
