//! Command execution for gitflow-release-notes.
//!
//! Each subcommand parses its arguments, sets up the forge and output
//! clients and runs its workflow. Commands honor `--dry-run` by logging
//! publishing side effects instead of performing them.

/// Generates, publishes and posts changelogs for a tag range.
pub mod changelog;
