//! # goban
//!
//! Flags uses of explicitly forbidden symbols in Rust sources.
//!
//! A ban list names imports, functions, and types by their fully-qualified
//! identity, each with an optional message:
//!
//! ```text
//! std::process::exit      # use graceful shutdown
//! std::env::set_var()     # not thread-safe
//! openssl                 # use rustls
//! std::rc::Rc<u8>
//! ```
//!
//! [`BannedSymbols`] is a [`goban_core::Rule`] that resolves every `use`
//! leaf, call, function reference, and type in a file and reports the ones
//! the list names.
//!
//! ## Usage
//!
//! ```ignore
//! use goban::BannedSymbols;
//! use goban_core::Analyzer;
//!
//! let analyzer = Analyzer::builder()
//!     .root(".")
//!     .rule(BannedSymbols::new(".goban.cfg"))
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod banlist;
mod report;
mod resolve;
mod store;
mod visitor;

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use goban_core::{FileContext, PrepareError, Rule, Severity, Violation};
use syn::visit::Visit;
use tracing::{debug, warn};

pub use banlist::{BannedPatterns, LoadError};
pub use report::{BannedUse, SymbolKind};
pub use resolve::Resolver;
pub use store::PatternStore;

/// Rule code for banned-symbols.
pub const CODE: &str = "GB001";

/// Rule name for banned-symbols.
pub const NAME: &str = "banned-symbols";

/// Ban list read when no path is configured.
pub const DEFAULT_CONFIG_PATH: &str = ".goban.cfg";

/// Reports imports, calls, and type uses of banned symbols.
#[derive(Debug, Clone)]
pub struct BannedSymbols {
    store: Arc<PatternStore>,
    patterns: OnceLock<Arc<BannedPatterns>>,
    severity: Severity,
}

impl Default for BannedSymbols {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_PATH)
    }
}

impl BannedSymbols {
    /// Creates the rule with the ban list at `path`, loaded on first use.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::from_store(Arc::new(PatternStore::new(path)))
    }

    /// Creates the rule over an existing store.
    #[must_use]
    pub fn from_store(store: Arc<PatternStore>) -> Self {
        Self {
            store,
            patterns: OnceLock::new(),
            severity: Severity::Error,
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// The store backing this rule.
    #[must_use]
    pub fn store(&self) -> &Arc<PatternStore> {
        &self.store
    }
}

impl Rule for BannedSymbols {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids imports, calls, and types named in the ban list"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn prepare(&self) -> Result<(), PrepareError> {
        let patterns = self.store.get()?;
        debug!("{} banned symbol(s) ready", patterns.len());
        self.patterns.get_or_init(|| patterns);
        Ok(())
    }

    /// Reports nothing until [`Rule::prepare`] has loaded the ban list.
    fn check(&self, ctx: &FileContext, ast: &syn::File) -> Vec<Violation> {
        let Some(patterns) = self.patterns.get() else {
            warn!("{NAME} checked {} before the ban list was loaded", ctx.relative_path.display());
            return Vec::new();
        };
        if patterns.is_empty() {
            return Vec::new();
        }

        let reporter = report::Reporter::new(ctx, CODE, NAME, self.severity);
        let mut visitor =
            visitor::BannedSymbolVisitor::new(patterns, reporter, ctx.module_path.clone());
        visitor.visit_file(ast);
        visitor.into_reporter().into_violations()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn check(bans: &str, source: &str) -> Vec<Violation> {
        let store = PatternStore::from_patterns(BannedPatterns::parse(bans));
        let rule = BannedSymbols::from_store(Arc::new(store));
        rule.prepare().unwrap();
        let ctx = FileContext::detached(Path::new("src/lib.rs"));
        let ast = syn::parse_file(source).unwrap();
        rule.check(&ctx, &ast)
    }

    #[test]
    fn test_rule_metadata() {
        let rule = BannedSymbols::default();
        assert_eq!(rule.name(), "banned-symbols");
        assert_eq!(rule.code(), "GB001");
        assert_eq!(rule.store().path(), Path::new(".goban.cfg"));
        assert_eq!(rule.default_severity(), Severity::Error);
    }

    #[test]
    fn test_violations_carry_rule_identity() {
        let violations = check(
            "std::thread::sleep # blocks the executor",
            "fn f() { std::thread::sleep(std::time::Duration::ZERO) }",
        );
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, CODE);
        assert_eq!(violations[0].rule, NAME);
        assert_eq!(
            violations[0].message,
            "func std::thread::sleep is banned - blocks the executor"
        );
    }

    #[test]
    fn test_prepare_fails_on_missing_list() {
        let dir = tempfile::TempDir::new().unwrap();
        let rule = BannedSymbols::new(dir.path().join("missing.cfg"));

        let err = rule.prepare().unwrap_err();
        assert!(err.to_string().contains("when opening goban config file"));
        assert!(!rule.store().is_loaded());
    }

    #[test]
    fn test_check_before_prepare_reports_nothing() {
        let store = PatternStore::from_patterns(BannedPatterns::parse("std::process::exit"));
        let rule = BannedSymbols::from_store(Arc::new(store));
        let ctx = FileContext::detached(Path::new("src/lib.rs"));
        let ast = syn::parse_file("fn f() { std::process::exit(1) }").unwrap();

        assert!(rule.check(&ctx, &ast).is_empty());
        rule.prepare().unwrap();
        assert_eq!(rule.check(&ctx, &ast).len(), 1);
    }

    #[test]
    fn test_custom_severity() {
        let rule = BannedSymbols::default().severity(Severity::Warning);
        assert_eq!(rule.default_severity(), Severity::Warning);
    }
}
