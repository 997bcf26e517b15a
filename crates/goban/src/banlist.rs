//! Ban-list loading.
//!
//! The ban list is a line-oriented UTF-8 file:
//!
//! ```text
//! # comments and blank lines are ignored
//! std::process::exit          # use graceful shutdown
//! std::env::set_var()         # not thread-safe
//! std::rc::Rc<u8>
//! ```
//!
//! Everything after the first `#` is the message for that symbol. A symbol
//! ending in `()` is registered twice: verbatim and without the suffix.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

/// Marks the start of a message on a ban-list line.
const COMMENT_DELIMITER: char = '#';

/// Suffix that registers both the called and the referenced form.
const CALL_SUFFIX: &str = "()";

/// Errors raised while loading a ban list.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be opened.
    #[error("when opening goban config file {path}: {source}")]
    Open {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },

    /// A line could not be read (IO failure or invalid UTF-8).
    #[error("when reading goban config file {path} at line {line}: {source}")]
    Read {
        /// Path being read.
        path: PathBuf,
        /// 1-indexed line number.
        line: usize,
        /// Underlying IO error.
        source: io::Error,
    },
}

/// Immutable mapping from symbol identity to explanatory message.
///
/// An empty message means the entry carried no comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BannedPatterns {
    entries: HashMap<String, String>,
}

impl BannedPatterns {
    /// Loads a ban list from disk.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Open`] if the file cannot be opened and
    /// [`LoadError::Read`] if a line cannot be read as UTF-8 text.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let file = File::open(path).map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let patterns =
            Self::from_reader(BufReader::new(file)).map_err(|(line, source)| LoadError::Read {
                path: path.to_path_buf(),
                line,
                source,
            })?;

        info!(
            "Loaded {} banned symbol(s) from {}",
            patterns.len(),
            path.display()
        );
        Ok(patterns)
    }

    /// Parses a ban list held in memory.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut patterns = Self::default();
        for line in content.lines() {
            patterns.insert_line(line);
        }
        patterns
    }

    /// Reads a ban list until end of input.
    ///
    /// # Errors
    ///
    /// Returns the failing 1-indexed line number with the IO error.
    pub fn from_reader(reader: impl BufRead) -> Result<Self, (usize, io::Error)> {
        let mut patterns = Self::default();
        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| (idx + 1, e))?;
            patterns.insert_line(&line);
        }
        Ok(patterns)
    }

    fn insert_line(&mut self, line: &str) {
        let (symbol, message) = match line.split_once(COMMENT_DELIMITER) {
            Some((symbol, message)) => (symbol, trim(message)),
            None => (line, ""),
        };

        let symbol = trim(symbol);
        if symbol.is_empty() {
            return;
        }

        debug!("Banning `{symbol}`");
        self.entries.insert(symbol.to_string(), message.to_string());

        if let Some(stripped) = symbol.strip_suffix(CALL_SUFFIX) {
            self.entries.insert(stripped.to_string(), message.to_string());
        }
    }

    /// Returns the message for a banned symbol, or `None` if not banned.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&str> {
        self.entries.get(symbol).map(String::as_str)
    }

    /// Returns true if the symbol is banned.
    #[must_use]
    pub fn contains(&self, symbol: &str) -> bool {
        self.entries.contains_key(symbol)
    }

    /// Number of registered keys (a `()` entry counts twice).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is banned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(symbol, message)` pairs sorted by symbol.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        let mut pairs: Vec<(&str, &str)> = self
            .entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        pairs.sort_unstable();
        pairs.into_iter()
    }
}

fn trim(s: &str) -> &str {
    s.trim_matches(|c| matches!(c, ' ' | '\t' | '\r' | '\n'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_symbol_with_message() {
        let patterns = BannedPatterns::parse("std::process::exit # use graceful shutdown\n");
        assert_eq!(
            patterns.get("std::process::exit"),
            Some("use graceful shutdown")
        );
        assert_eq!(patterns.len(), 1);
    }

    #[test]
    fn test_symbol_without_message() {
        let patterns = BannedPatterns::parse("  std::rc::Rc<u8>\t\r\n");
        assert_eq!(patterns.get("std::rc::Rc<u8>"), Some(""));
    }

    #[test]
    fn test_call_suffix_registers_two_keys() {
        let patterns = BannedPatterns::parse("std::env::set_var() # not thread-safe");
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns.get("std::env::set_var()"), Some("not thread-safe"));
        assert_eq!(patterns.get("std::env::set_var"), Some("not thread-safe"));
    }

    #[test]
    fn test_blank_and_comment_lines_are_skipped() {
        let patterns = BannedPatterns::parse("\n   \n# header\n\t# indented\n  #\n");
        assert!(patterns.is_empty());
    }

    #[test]
    fn test_only_first_delimiter_splits() {
        let patterns = BannedPatterns::parse("std::mem::forget # leaks # really");
        assert_eq!(patterns.get("std::mem::forget"), Some("leaks # really"));
    }

    #[test]
    fn test_last_duplicate_wins() {
        let patterns = BannedPatterns::parse("std::fs # first\nstd::fs # second\n");
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns.get("std::fs"), Some("second"));
    }

    #[test]
    fn test_missing_final_newline_keeps_last_entry() {
        let patterns = BannedPatterns::parse("a::b\nc::d # last");
        assert!(patterns.contains("a::b"));
        assert_eq!(patterns.get("c::d"), Some("last"));
    }

    #[test]
    fn test_iter_is_sorted() {
        let patterns = BannedPatterns::parse("z::f\na::g()\n");
        let keys: Vec<&str> = patterns.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a::g", "a::g()", "z::f"]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# bans").unwrap();
        writeln!(file, "std::thread::sleep # blocks the executor").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "openssl").unwrap();

        let patterns = BannedPatterns::load(file.path()).unwrap();
        assert_eq!(patterns.len(), 2);
        assert_eq!(
            patterns.get("std::thread::sleep"),
            Some("blocks the executor")
        );
        assert_eq!(patterns.get("openssl"), Some(""));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(".goban.cfg");

        let err = BannedPatterns::load(&path).unwrap_err();
        assert!(matches!(err, LoadError::Open { .. }));
        assert!(err.to_string().starts_with("when opening goban config file"));
    }

    #[test]
    fn test_load_invalid_utf8_fails_with_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"ok::fine\n\xff\xfe\n").unwrap();

        let err = BannedPatterns::load(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Read { line: 2, .. }));
    }
}
