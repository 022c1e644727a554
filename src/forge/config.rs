//! Configuration for GitHub connections.
use secrecy::{ExposeSecret, SecretString};

/// Default host when a repository is given as `owner/name`.
pub const DEFAULT_HOST: &str = "github.com";
/// Default number of most recent tags to fetch.
pub const DEFAULT_TAG_LIMIT: u8 = 100;
/// Default number of most recently updated pull requests to fetch.
pub const DEFAULT_PR_LIMIT: u8 = 100;
/// Default page size for paginated commit queries
pub const DEFAULT_PAGE_SIZE: u8 = 100;
/// Default number of commits to walk when a range has no lower bound.
pub const DEFAULT_COMMIT_SEARCH_DEPTH: u64 = 400;

/// Remote repository connection configuration, constructed once per run and
/// handed to the forge client.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Remote forge host (e.g., "github.com").
    pub host: String,
    /// URL scheme (http or https).
    pub scheme: String,
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Access token, empty for anonymous access.
    pub token: SecretString,
    /// Base URL for release links,
    /// `<scheme>://<host>/<owner>/<repo>/releases/tag`.
    pub release_link_base_url: String,
    /// Maximum number of commits walked when no comparison base exists.
    pub commit_search_depth: u64,
    /// Log publishing side effects instead of performing them.
    pub dry_run: bool,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: "".to_string(),
            scheme: "".to_string(),
            owner: "".to_string(),
            repo: "".to_string(),
            token: SecretString::from("".to_string()),
            release_link_base_url: "".to_string(),
            commit_search_depth: DEFAULT_COMMIT_SEARCH_DEPTH,
            dry_run: false,
        }
    }
}

impl RemoteConfig {
    /// `owner/repo`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    pub fn has_token(&self) -> bool {
        !self.token.expose_secret().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_remote_config() {
        let remote = RemoteConfig::default();
        assert!(!remote.has_token());
        assert!(!remote.dry_run);
        assert_eq!(remote.commit_search_depth, DEFAULT_COMMIT_SEARCH_DEPTH);
    }

    #[test]
    fn test_full_name() {
        let remote = RemoteConfig {
            owner: "franzwilhelm".into(),
            repo: "gitflow-release-notes".into(),
            token: SecretString::from("token".to_string()),
            ..RemoteConfig::default()
        };
        assert_eq!(remote.full_name(), "franzwilhelm/gitflow-release-notes");
        assert!(remote.has_token());
    }
}
