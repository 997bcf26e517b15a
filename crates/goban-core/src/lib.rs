//! # goban-core
//!
//! Host framework for goban, built on `syn` AST analysis.
//!
//! This crate plays the role of the analysis driver: it discovers source
//! files, parses each one into a compilation unit, hands the unit to every
//! registered [`Rule`], and aggregates the findings. It includes:
//!
//! - [`Rule`] trait for per-file AST-based rules
//! - [`Analyzer`] for orchestrating (parallel) lint execution
//! - [`Violation`] and [`LintResult`] for representing findings
//! - [`Config`] for the TOML driver configuration
//!
//! ## Example
//!
//! ```ignore
//! use goban_core::Analyzer;
//!
//! let analyzer = Analyzer::builder()
//!     .root("./src")
//!     .rule(MyRule::new())
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! for violation in &result.violations {
//!     println!("{violation}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod config;
mod context;
mod rule;
mod types;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError};
pub use config::{AnalyzerConfig, Config, ConfigError, RuleConfig};
pub use context::FileContext;
pub use rule::{PrepareError, Rule, RuleBox};
pub use types::{LintResult, Location, Severity, Violation};
