//! Subcommand implementations.

pub mod check;
pub mod list_bans;
pub mod output;
