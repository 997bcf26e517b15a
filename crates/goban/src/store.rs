//! Lazily loaded, shared ban list.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use tracing::debug;

use crate::banlist::{BannedPatterns, LoadError};

type Loader = Box<dyn Fn(&Path) -> Result<BannedPatterns, LoadError> + Send + Sync>;

/// Holds the ban list for the lifetime of an analysis run.
///
/// The first [`PatternStore::get`] performs the load; concurrent first
/// callers wait on an init lock so the loader runs exactly once and all of
/// them receive the same [`Arc`]. Once loaded, `get` reads the cell without
/// locking and the patterns are never replaced.
pub struct PatternStore {
    path: PathBuf,
    loader: Loader,
    init: Mutex<()>,
    patterns: OnceLock<Arc<BannedPatterns>>,
}

impl PatternStore {
    /// Creates a store that reads the ban list at `path` on first use.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_loader(path, BannedPatterns::load)
    }

    /// Creates a store with a custom loader.
    #[must_use]
    pub fn with_loader<F>(path: impl Into<PathBuf>, loader: F) -> Self
    where
        F: Fn(&Path) -> Result<BannedPatterns, LoadError> + Send + Sync + 'static,
    {
        Self {
            path: path.into(),
            loader: Box::new(loader),
            init: Mutex::new(()),
            patterns: OnceLock::new(),
        }
    }

    /// Creates a store that is already loaded.
    #[must_use]
    pub fn from_patterns(patterns: BannedPatterns) -> Self {
        let store = Self::with_loader(PathBuf::new(), |_| Ok(BannedPatterns::default()));
        let _ = store.patterns.set(Arc::new(patterns));
        store
    }

    /// Path the ban list is read from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true once the ban list has been loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.patterns.get().is_some()
    }

    /// Returns the ban list, loading it on first call.
    ///
    /// # Errors
    ///
    /// Returns the loader's error. A failed load leaves the store empty;
    /// callers are expected to abort the run.
    pub fn get(&self) -> Result<Arc<BannedPatterns>, LoadError> {
        if let Some(patterns) = self.patterns.get() {
            return Ok(Arc::clone(patterns));
        }

        // Poisoning only means another loader panicked; the cell is still
        // either empty or fully set.
        let _guard = self.init.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(patterns) = self.patterns.get() {
            return Ok(Arc::clone(patterns));
        }

        debug!("Loading ban list from {}", self.path.display());
        let loaded = Arc::new((self.loader)(&self.path)?);
        Ok(Arc::clone(self.patterns.get_or_init(|| loaded)))
    }
}

impl std::fmt::Debug for PatternStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternStore")
            .field("path", &self.path)
            .field("loaded", &self.is_loaded())
            .finish_non_exhaustive()
    }
}
