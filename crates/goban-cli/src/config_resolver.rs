//! Locating the driver config and the ban list.
//!
//! Driver config (`goban.toml`), first match wins:
//!
//! 1. `--config` flag
//! 2. `{project}/goban.toml`, then `{project}/.goban.toml`
//! 3. `$GOBAN_CONFIG_DIR/config.toml`, else `~/.goban/config.toml`
//! 4. built-in defaults
//!
//! Ban list: `--cfg` flag, then `[rules.banned-symbols] cfg`, then
//! `.goban.cfg` in the working directory.

use anyhow::{Context, Result};
use goban_core::Config;
use std::path::{Path, PathBuf};

/// Where the driver config came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config` flag.
    Explicit(PathBuf),
    /// Project directory.
    Project(PathBuf),
    /// Global config directory.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Reads and parses the config, or returns defaults for [`ConfigSource::Default`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load(&self) -> Result<Config> {
        let Some(path) = self.path() else {
            tracing::debug!("No goban.toml found, using defaults");
            return Ok(Config::default());
        };
        if matches!(self, Self::Global(_)) {
            tracing::info!("Using global config: {}", path.display());
        }
        Config::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))
    }
}

const PROJECT_CONFIG_NAMES: &[&str] = &["goban.toml", ".goban.toml"];

const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Option key naming the ban-list file under `[rules.banned-symbols]`.
const BAN_LIST_OPTION: &str = "cfg";

/// Finds the driver config for `project_dir`.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_inner(project_dir, explicit, global_config_dir())
}

fn resolve_inner(
    project_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    if let Some(found) = PROJECT_CONFIG_NAMES
        .iter()
        .map(|name| project_dir.join(name))
        .find(|candidate| candidate.exists())
    {
        tracing::debug!("Found project config: {}", found.display());
        return ConfigSource::Project(found);
    }

    global_dir
        .map(|dir| dir.join(GLOBAL_CONFIG_NAME))
        .filter(|candidate| candidate.exists())
        .map_or(ConfigSource::Default, |found| {
            tracing::debug!("Found global config: {}", found.display());
            ConfigSource::Global(found)
        })
}

/// `$GOBAN_CONFIG_DIR`, else `~/.goban/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("GOBAN_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".goban"))
}

/// Picks the ban-list path from the flag, the rule option, or the default.
#[must_use]
pub fn ban_list_path(flag: Option<&Path>, config: &Config) -> PathBuf {
    if let Some(path) = flag {
        return path.to_path_buf();
    }
    config
        .rule_option_str(goban::NAME, BAN_LIST_OPTION)
        .map_or_else(|| PathBuf::from(goban::DEFAULT_CONFIG_PATH), PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn explicit_wins_even_if_missing() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("goban.toml"), "").unwrap();

        let result = resolve_inner(tmp.path(), Some(Path::new("/nonexistent.toml")), None);
        assert_eq!(
            result,
            ConfigSource::Explicit(PathBuf::from("/nonexistent.toml"))
        );
    }

    #[test]
    fn project_names_in_order() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".goban.toml"), "").unwrap();
        assert_eq!(
            resolve_inner(tmp.path(), None, None),
            ConfigSource::Project(tmp.path().join(".goban.toml"))
        );

        fs::write(tmp.path().join("goban.toml"), "").unwrap();
        assert_eq!(
            resolve_inner(tmp.path(), None, None),
            ConfigSource::Project(tmp.path().join("goban.toml"))
        );
    }

    #[test]
    fn global_only_without_project_config() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        assert_eq!(
            resolve_inner(project.path(), None, Some(global.path().to_path_buf())),
            ConfigSource::Default
        );

        fs::write(global.path().join("config.toml"), "").unwrap();
        assert_eq!(
            resolve_inner(project.path(), None, Some(global.path().to_path_buf())),
            ConfigSource::Global(global.path().join("config.toml"))
        );

        fs::write(project.path().join("goban.toml"), "").unwrap();
        assert!(matches!(
            resolve_inner(project.path(), None, Some(global.path().to_path_buf())),
            ConfigSource::Project(_)
        ));
    }

    #[test]
    fn load_reads_rule_options() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("goban.toml");
        fs::write(&path, "[rules.banned-symbols]\ncfg = \"lint/bans.cfg\"\n").unwrap();

        let config = ConfigSource::Project(path).load().unwrap();
        assert_eq!(
            ban_list_path(None, &config),
            PathBuf::from("lint/bans.cfg")
        );
        assert_eq!(
            ban_list_path(Some(Path::new("other.cfg")), &config),
            PathBuf::from("other.cfg")
        );
    }

    #[test]
    fn load_rejects_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("goban.toml");
        fs::write(&path, "[rules\n").unwrap();

        let err = ConfigSource::Explicit(path).load().unwrap_err();
        assert!(err.to_string().starts_with("Failed to load config"));
    }

    #[test]
    fn default_ban_list_path() {
        assert_eq!(
            ban_list_path(None, &Config::default()),
            PathBuf::from(".goban.cfg")
        );
        assert!(ConfigSource::Default.load().unwrap().rules.is_empty());
    }
}
