//! Context types for rule execution.

use std::path::{Component, Path, PathBuf};

/// Context provided to per-file rules.
///
/// Together with the parsed `syn::File`, this forms one compilation unit:
/// where the source lives and which module it defines.
#[derive(Debug, Clone)]
pub struct FileContext<'a> {
    /// Absolute path to the file.
    pub path: &'a Path,
    /// Path relative to the project root.
    pub relative_path: PathBuf,
    /// Module path from the crate root (e.g., `["crate", "net", "tcp"]`).
    ///
    /// `None` when the file does not sit below a `src` directory, in which
    /// case its module position is unknown.
    pub module_path: Option<Vec<String>>,
}

impl<'a> FileContext<'a> {
    /// Creates a new file context.
    #[must_use]
    pub fn new(path: &'a Path, root: &Path) -> Self {
        let relative_path = path
            .strip_prefix(root)
            .map_or_else(|_| path.to_path_buf(), Path::to_path_buf);
        let module_path = Self::compute_module_path(&relative_path);

        Self {
            path,
            relative_path,
            module_path,
        }
    }

    /// Creates a context for in-memory source, e.g. in tests.
    #[must_use]
    pub fn detached(path: &'a Path) -> Self {
        Self {
            path,
            relative_path: path.to_path_buf(),
            module_path: Self::compute_module_path(path),
        }
    }

    /// Computes the module path from a path relative to the project root.
    ///
    /// Everything up to the innermost `src` directory is the crate location;
    /// the rest maps to modules. `lib.rs`, `main.rs`, and `src/bin/*.rs` are
    /// crate roots.
    fn compute_module_path(relative_path: &Path) -> Option<Vec<String>> {
        let parts: Vec<String> = relative_path
            .with_extension("")
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => s.to_str().map(String::from),
                _ => None,
            })
            .collect();

        let src_idx = parts.iter().rposition(|p| p == "src")?;
        let mut modules: Vec<String> = parts[src_idx + 1..].to_vec();

        if modules.first().is_some_and(|m| m == "bin") {
            modules.clear();
        }
        if modules.last().is_some_and(|m| m == "mod") {
            modules.pop();
        }
        if modules.len() == 1 && (modules[0] == "lib" || modules[0] == "main") {
            modules.clear();
        }

        let mut path = vec!["crate".to_string()];
        path.extend(modules);
        Some(path)
    }
}
