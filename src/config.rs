//! Configuration loading and parsing for `gitflow-release-notes.toml`
//! files.
use derive_builder::Builder;
use log::*;
use serde::Deserialize;
use std::path::Path;

use crate::{
    Result,
    changelog::{markdown::DEFAULT_BODY, slack::DEFAULT_USERNAME},
    error::ReleaseNotesError,
    forge::config::{
        DEFAULT_COMMIT_SEARCH_DEPTH, DEFAULT_PR_LIMIT, DEFAULT_TAG_LIMIT,
    },
};

/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "gitflow-release-notes.toml";

/// Default branch feature, bugfix and release branches are merged into.
pub const DEFAULT_INTEGRATION_BRANCH: &str = "develop";

/// Default prefix stripped from tag names before version parsing.
pub const DEFAULT_TAG_PREFIX: &str = "v";

/// Changelog template configuration using Tera syntax.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Builder)]
#[builder(setter(into, strip_option), default)]
#[serde(default)] // Use default for missing fields
pub struct ChangelogConfig {
    /// Main changelog body template.
    pub body: String,
    /// Marks releases whose tag carries a prerelease version as GitHub
    /// prereleases (default: true)
    pub mark_prereleases: bool,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            body: DEFAULT_BODY.into(),
            mark_prereleases: true,
        }
    }
}

/// Slack defaults, overridden by command line flags.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Builder)]
#[builder(setter(into, strip_option), default)]
#[serde(default)]
pub struct SlackConfig {
    pub channel: Option<String>,
    pub webhook_url: Option<String>,
    pub icon_url: Option<String>,
    pub username: String,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            channel: None,
            webhook_url: None,
            icon_url: None,
            username: DEFAULT_USERNAME.into(),
        }
    }
}

/// Root configuration structure for `gitflow-release-notes.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Builder)]
#[builder(setter(into, strip_option), default)]
#[serde(default)]
pub struct Config {
    /// Prefix stripped from tag names, e.g. "v" for `v1.2.3`.
    pub tag_prefix: String,
    /// Branch pull requests are merged into.
    pub integration_branch: String,
    /// Most recent tags to fetch.
    pub tag_limit: u8,
    /// Most recently updated pull requests to fetch.
    pub pull_request_limit: u8,
    /// Maximum number of commits to walk when a range has no lower tag.
    pub commit_search_depth: u64,
    /// Changelog generation settings.
    pub changelog: ChangelogConfig,
    /// Slack posting settings.
    pub slack: SlackConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tag_prefix: DEFAULT_TAG_PREFIX.into(),
            integration_branch: DEFAULT_INTEGRATION_BRANCH.into(),
            tag_limit: DEFAULT_TAG_LIMIT,
            pull_request_limit: DEFAULT_PR_LIMIT,
            commit_search_depth: DEFAULT_COMMIT_SEARCH_DEPTH,
            changelog: ChangelogConfig::default(),
            slack: SlackConfig::default(),
        }
    }
}

impl Config {
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;

        if config.tag_limit == 0 || config.pull_request_limit == 0 {
            return Err(ReleaseNotesError::invalid_config(
                "tag_limit and pull_request_limit must be between 1 and 255",
            ));
        }

        Ok(config)
    }

    /// Loads `path` when given, which must exist. Otherwise looks for
    /// [`DEFAULT_CONFIG_FILE`] in `dir` and falls back to defaults.
    pub async fn load(path: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = path {
            info!("loading configuration from {}", path.display());
            let content = tokio::fs::read_to_string(path).await?;
            return Self::parse(&content);
        }

        let default_path = dir.join(DEFAULT_CONFIG_FILE);

        if !tokio::fs::try_exists(&default_path).await? {
            debug!(
                "no {DEFAULT_CONFIG_FILE} found: using default configuration"
            );
            return Ok(Self::default());
        }

        info!("loading configuration from {}", default_path.display());
        let content = tokio::fs::read_to_string(&default_path).await?;

        Self::parse(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn loads_defaults() {
        let config = Config::default();
        assert!(!config.changelog.body.is_empty());
        assert_eq!(config.integration_branch, "develop");
        assert_eq!(config.tag_prefix, "v");
        assert_eq!(config.commit_search_depth, DEFAULT_COMMIT_SEARCH_DEPTH);
        assert_eq!(config.slack.username, DEFAULT_USERNAME);
    }

    #[test]
    fn parses_partial_file() {
        let config = Config::parse(
            r##"
tag_prefix = "release-"
pull_request_limit = 50

[slack]
channel = "#releases"
"##,
        )
        .unwrap();

        assert_eq!(config.tag_prefix, "release-");
        assert_eq!(config.pull_request_limit, 50);
        assert_eq!(config.tag_limit, DEFAULT_TAG_LIMIT);
        assert_eq!(config.slack.channel.as_deref(), Some("#releases"));
        assert_eq!(config.slack.username, DEFAULT_USERNAME);
        assert_eq!(config.changelog, ChangelogConfig::default());
    }

    #[test]
    fn rejects_out_of_range_limit() {
        let result = Config::parse("tag_limit = 1000");
        assert!(result.is_err());

        let result = Config::parse("pull_request_limit = 0");
        assert!(matches!(result, Err(ReleaseNotesError::InvalidConfig(_))));
    }

    #[test]
    fn accepts_limits_above_one_page() {
        let config = Config::parse("tag_limit = 250\npull_request_limit = 200")
            .unwrap();
        assert_eq!(config.tag_limit, 250);
        assert_eq!(config.pull_request_limit, 200);
    }

    #[tokio::test]
    async fn falls_back_to_defaults_without_file() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(None, dir.path()).await.unwrap();
        assert_eq!(config, Config::default());
    }

    #[tokio::test]
    async fn loads_file_from_directory() {
        let dir = TempDir::new().unwrap();
        tokio::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "integration_branch = \"dev\"\n\n[changelog]\nbody = \"{{ tag_name }}\"\n",
        )
        .await
        .unwrap();

        let config = Config::load(None, dir.path()).await.unwrap();

        assert_eq!(config.integration_branch, "dev");
        assert_eq!(config.changelog.body, "{{ tag_name }}");
    }

    #[tokio::test]
    async fn explicit_path_must_exist() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.toml");
        let result = Config::load(Some(&missing), dir.path()).await;
        assert!(result.is_err());
    }
}
