//! Forge access for reading release data and publishing releases.
//!
//! The [`traits::Forge`] trait is the seam between the changelog command and
//! the hosted API. [`manager::ForgeManager`] wraps an implementation and owns
//! dry-run handling and idempotent publishing.

/// Connection configuration and defaults.
pub mod config;

/// GitHub API client implementation for GitHub.com and Enterprise.
pub mod github;

/// Dry-run aware wrapper around a forge implementation.
pub mod manager;

/// Request and response types for forge operations.
pub mod request;

/// Common trait for forge platform abstraction.
pub mod traits;
