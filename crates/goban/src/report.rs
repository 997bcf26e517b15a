//! Turning matches into violations.

use goban_core::{FileContext, Location, Severity, Violation};

/// Which kind of use matched a banned symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// A `use` import or `extern crate`.
    Package,
    /// A call, or a function referenced as a value.
    Func,
    /// A type in type position or a struct literal.
    Type,
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Package => write!(f, "package"),
            Self::Func => write!(f, "func"),
            Self::Type => write!(f, "type"),
        }
    }
}

/// A single banned-symbol finding.
///
/// Displays as `package '<path>' is banned - <comment>`,
/// `func <name> is banned - <comment>`, or `type <name> is banned - <comment>`.
/// The ` - <comment>` part is left out when the ban-list entry has no comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannedUse {
    /// Kind of use.
    pub kind: SymbolKind,
    /// Canonical identity that matched.
    pub symbol: String,
    /// Message from the ban list, possibly empty.
    pub comment: String,
}

impl std::fmt::Display for BannedUse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            SymbolKind::Package => write!(f, "package '{}' is banned", self.symbol)?,
            kind => write!(f, "{kind} {} is banned", self.symbol)?,
        }
        if !self.comment.is_empty() {
            write!(f, " - {}", self.comment)?;
        }
        Ok(())
    }
}

/// Hands findings to the analyzer's violation sink, in the order reported.
pub struct Reporter<'a> {
    ctx: &'a FileContext<'a>,
    code: &'static str,
    rule: &'static str,
    severity: Severity,
    sink: Vec<Violation>,
}

impl<'a> Reporter<'a> {
    /// Creates a reporter for one file.
    #[must_use]
    pub fn new(
        ctx: &'a FileContext<'a>,
        code: &'static str,
        rule: &'static str,
        severity: Severity,
    ) -> Self {
        Self {
            ctx,
            code,
            rule,
            severity,
            sink: Vec::new(),
        }
    }

    /// Records a finding at the start of `span`.
    pub fn report(&mut self, span: proc_macro2::Span, banned: &BannedUse) {
        let location = Location::from_span(self.ctx.relative_path.clone(), span);
        self.sink.push(Violation::new(
            self.code,
            self.rule,
            self.severity,
            location,
            banned.to_string(),
        ));
    }

    /// Returns everything reported so far.
    #[must_use]
    pub fn into_violations(self) -> Vec<Violation> {
        self.sink
    }
}
