//! Integration test: banned-symbols end-to-end via Analyzer.
//!
//! The fixture project under `tests/fixtures/project/` carries its own
//! `.goban.cfg` and exercises every diagnostic category.

use goban::{BannedPatterns, BannedSymbols, PatternStore};
use goban_core::{Analyzer, AnalyzerError, Config, LintResult, Severity};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn fixture_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/project")
}

fn analyze(root: &Path, rule: BannedSymbols) -> Result<LintResult, AnalyzerError> {
    Analyzer::builder()
        .root(root)
        .rule(rule)
        .build()
        .expect("analyzer should build")
        .analyze()
}

fn render(result: &LintResult) -> String {
    result
        .violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Writes `files` (relative path, content) under a fresh temp dir.
fn project(files: &[(&str, &str)]) -> tempfile::TempDir {
    let tmp = tempfile::TempDir::new().unwrap();
    for (path, content) in files {
        let path = tmp.path().join(path);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }
    tmp
}

// ── Fixture project ──

#[test]
fn reports_every_category_in_fixture() {
    let root = fixture_root();
    let result = analyze(&root, BannedSymbols::new(root.join(".goban.cfg"))).unwrap();

    assert_eq!(result.files_checked, 3);
    insta::assert_snapshot!(render(&result), @r###"
    src/main.rs:2:11: error [GB001] package 'std::cell' is banned - share state through channels
    src/main.rs:7:5: error [GB001] func std::env::set_var is banned - not thread-safe
    src/main.rs:12:5: error [GB001] func std::process::exit is banned - use graceful shutdown
    src/shutdown.rs:4:16: error [GB001] type std::rc::Rc<u8> is banned
    src/shutdown.rs:6:16: error [GB001] func std::process::exit is banned - use graceful shutdown
    src/tls.rs:1:14: error [GB001] package 'openssl' is banned - use rustls
    "###);
}

#[test]
fn severity_override_from_config() {
    let root = fixture_root();
    let config = Config::parse(
        r#"
[rules.banned-symbols]
severity = "warning"
"#,
    )
    .unwrap();

    let result = Analyzer::builder()
        .root(&root)
        .config(config)
        .rule(BannedSymbols::new(root.join(".goban.cfg")))
        .build()
        .unwrap()
        .analyze()
        .unwrap();

    assert!(!result.violations.is_empty());
    assert!(!result.has_errors());
    assert!(result
        .violations
        .iter()
        .all(|v| v.severity == Severity::Warning));
}

#[test]
fn disabled_rule_does_not_load_ban_list() {
    let tmp = project(&[("src/lib.rs", "fn f() {}")]);
    let config = Config::parse("[rules.banned-symbols]\nenabled = false\n").unwrap();

    let result = Analyzer::builder()
        .root(tmp.path())
        .config(config)
        .rule(BannedSymbols::new(tmp.path().join("missing.cfg")))
        .build()
        .unwrap()
        .analyze()
        .unwrap();

    assert!(result.violations.is_empty());
}

// ── Ban-list semantics ──

#[test]
fn single_call_gives_exact_diagnostic() {
    let tmp = project(&[
        (".goban.cfg", "std::process::exit # use graceful shutdown\n"),
        ("src/main.rs", "fn main() {\n    std::process::exit(1);\n}\n"),
    ]);

    let result = analyze(tmp.path(), BannedSymbols::new(tmp.path().join(".goban.cfg"))).unwrap();

    assert_eq!(result.violations.len(), 1);
    assert_eq!(
        result.violations[0].message,
        "func std::process::exit is banned - use graceful shutdown"
    );
    assert_eq!(result.violations[0].location.line, 2);
}

#[test]
fn call_suffix_matches_call_and_reference() {
    let tmp = project(&[
        (".goban.cfg", "std::env::remove_var() # not thread-safe\n"),
        (
            "src/lib.rs",
            "use std::env;\n\
             pub fn clear() {\n    env::remove_var(\"A\");\n    [\"B\"].iter().for_each(env::remove_var);\n}\n",
        ),
    ]);

    let result = analyze(tmp.path(), BannedSymbols::new(tmp.path().join(".goban.cfg"))).unwrap();

    let messages: Vec<&str> = result.violations.iter().map(|v| v.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "func std::env::remove_var is banned - not thread-safe",
            "func std::env::remove_var is banned - not thread-safe",
        ]
    );
}

#[test]
fn comment_only_list_bans_nothing() {
    let tmp = project(&[
        (".goban.cfg", "# nothing yet\n\n   \n# std::process::exit\n"),
        ("src/main.rs", "use std::process;\nfn main() { process::exit(0) }\n"),
    ]);

    let result = analyze(tmp.path(), BannedSymbols::new(tmp.path().join(".goban.cfg"))).unwrap();

    assert!(result.violations.is_empty());
    assert_eq!(result.files_checked, 1);
}

#[test]
fn one_diagnostic_per_banned_import() {
    let tmp = project(&[
        (".goban.cfg", "std::sync::mpsc # use crossbeam\n"),
        (
            "src/lib.rs",
            "use std::sync::mpsc;\nuse std::sync::{mpsc as channel, Arc};\nuse std::sync::Mutex;\n",
        ),
    ]);

    let result = analyze(tmp.path(), BannedSymbols::new(tmp.path().join(".goban.cfg"))).unwrap();

    let lines: Vec<usize> = result.violations.iter().map(|v| v.location.line).collect();
    assert_eq!(lines, vec![1, 2]);
    assert!(result
        .violations
        .iter()
        .all(|v| v.message == "package 'std::sync::mpsc' is banned - use crossbeam"));
}

#[test]
fn repeated_calls_are_each_reported() {
    let tmp = project(&[
        (".goban.cfg", "std::thread::sleep\n"),
        (
            "src/lib.rs",
            "use std::thread;\nuse std::time::Duration;\n\
             pub fn wait() {\n    thread::sleep(Duration::ZERO);\n    thread::sleep(Duration::ZERO);\n}\n",
        ),
    ]);

    let result = analyze(tmp.path(), BannedSymbols::new(tmp.path().join(".goban.cfg"))).unwrap();

    let lines: Vec<usize> = result.violations.iter().map(|v| v.location.line).collect();
    assert_eq!(lines, vec![4, 5]);
}

#[test]
fn locals_named_like_banned_functions_are_not_reported() {
    let tmp = project(&[
        (".goban.cfg", "std::cmp::max\nstd::mem::drop\n"),
        (
            "src/lib.rs",
            "use std::cmp::max;\n\
             pub fn pick(values: &[u8], max: u8) -> Vec<u8> {\n    \
             values.iter().copied().filter(|drop| *drop < max).collect()\n}\n",
        ),
    ]);

    let result = analyze(tmp.path(), BannedSymbols::new(tmp.path().join(".goban.cfg"))).unwrap();

    let messages: Vec<&str> = result.violations.iter().map(|v| v.message.as_str()).collect();
    assert_eq!(messages, vec!["package 'std::cmp::max' is banned"]);
}

// ── Loading ──

#[test]
fn missing_ban_list_aborts_before_any_diagnostic() {
    let tmp = project(&[("src/main.rs", "fn main() { std::process::exit(1) }\n")]);
    let rule = BannedSymbols::new(tmp.path().join(".goban.cfg"));
    let analyzer = Analyzer::builder()
        .root(tmp.path())
        .rule(rule)
        .build()
        .unwrap();

    for _ in 0..2 {
        let err = analyzer.analyze().unwrap_err();
        assert!(matches!(err, AnalyzerError::Prepare { ref rule, .. } if rule == "banned-symbols"));
        assert!(err.to_string().contains("when opening goban config file"));
    }
}

#[test]
fn parallel_run_loads_ban_list_once() {
    let files: Vec<(String, String)> = (0..24)
        .map(|i| {
            (
                format!("src/m{i}.rs"),
                "pub fn f() { std::process::abort() }\n".to_string(),
            )
        })
        .collect();
    let refs: Vec<(&str, &str)> = files
        .iter()
        .map(|(p, c)| (p.as_str(), c.as_str()))
        .collect();
    let tmp = project(&refs);

    let loads = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&loads);
    let store = Arc::new(PatternStore::with_loader("in-memory", move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(BannedPatterns::parse("std::process::abort # crashes"))
    }));

    let result = Analyzer::builder()
        .root(tmp.path())
        .parallelism(8)
        .rule(BannedSymbols::from_store(Arc::clone(&store)))
        .build()
        .unwrap()
        .analyze()
        .unwrap();

    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert_eq!(result.violations.len(), 24);
    assert!(store.is_loaded());
}
