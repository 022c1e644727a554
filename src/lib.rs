pub mod changelog;
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod forge;
pub mod release;
pub mod slack;
pub mod version;

pub use cli::{Args, ChangelogArgs, Command};
pub use error::{ReleaseNotesError, Result};

#[cfg(test)]
pub mod test_helpers;
