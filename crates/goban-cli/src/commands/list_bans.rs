//! List-bans command implementation.

use anyhow::{Context, Result};
use goban::BannedPatterns;
use std::path::Path;

use crate::config_resolver::{self, ConfigSource};

/// Prints every registered key of the ban list, sorted, one per line.
pub fn run(ban_list: Option<&Path>, source: &ConfigSource) -> Result<()> {
    let config = source.load()?;
    let path = config_resolver::ban_list_path(ban_list, &config);
    let patterns = BannedPatterns::load(&path)
        .with_context(|| format!("Failed to load ban list {}", path.display()))?;

    for (symbol, message) in patterns.iter() {
        if message.is_empty() {
            println!("{symbol}");
        } else {
            println!("{symbol}  # {message}");
        }
    }
    println!("\n{} banned symbol(s) in {}", patterns.len(), path.display());

    Ok(())
}
