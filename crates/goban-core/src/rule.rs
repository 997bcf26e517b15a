//! Rule trait for defining lint rules.

use crate::context::FileContext;
use crate::types::{Severity, Violation};

/// Error returned by [`Rule::prepare`].
pub type PrepareError = Box<dyn std::error::Error + Send + Sync>;

/// A per-file lint rule based on `syn` AST analysis.
///
/// Implement this trait to create rules that analyze individual source files.
/// Rules receive the parsed AST and can use the visitor pattern to traverse it.
///
/// The analyzer may call [`Rule::check`] for many files at once from worker
/// threads, so implementations must not mutate shared state while checking.
///
/// # Example
///
/// ```ignore
/// use goban_core::{Rule, FileContext, Violation};
/// use syn::visit::Visit;
///
/// pub struct NoTodoComments;
///
/// impl Rule for NoTodoComments {
///     fn name(&self) -> &'static str { "no-todo-comments" }
///     fn code(&self) -> &'static str { "GB900" }
///
///     fn check(&self, ctx: &FileContext, ast: &syn::File) -> Vec<Violation> {
///         let mut visitor = TodoVisitor::new(ctx);
///         visitor.visit_file(ast);
///         visitor.violations
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the kebab-case name of this rule (e.g., "banned-symbols").
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "GB001").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for violations from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Performs one-time setup before any file is checked.
    ///
    /// The analyzer calls this once per run, before file discovery. An error
    /// aborts the whole run: no file is checked and no violation is reported.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule cannot operate (e.g. its data is missing).
    fn prepare(&self) -> Result<(), PrepareError> {
        Ok(())
    }

    /// Checks a single file and returns any violations found.
    ///
    /// # Arguments
    ///
    /// * `ctx` - Context about the file being checked
    /// * `ast` - The parsed syntax tree of the file
    ///
    /// # Returns
    ///
    /// A vector of violations found in this file.
    fn check(&self, ctx: &FileContext, ast: &syn::File) -> Vec<Violation>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;
