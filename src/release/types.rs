//! Data types for tags, commits, pull requests and releases.
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Display;

/// Git tag as returned by the forge, linking a name to the commit it
/// points at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tag {
    /// Tag name, e.g. `v1.2.3`.
    pub name: String,
    /// SHA of the commit the tag points at.
    pub target_commit_id: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target_commit_id: target.into(),
        }
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Commit from a base..head comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Commit {
    pub id: String,
    pub author_date: Option<DateTime<Utc>>,
    pub message: String,
}

impl Commit {
    /// First eight characters of the commit SHA.
    pub fn short_id(&self) -> &str {
        self.id.get(..8).unwrap_or(&self.id)
    }

    /// First line of the commit message.
    pub fn title(&self) -> &str {
        self.message.lines().next().unwrap_or_default().trim()
    }
}

/// Merged pull request, keyed later by its merge commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub html_url: String,
    pub merge_commit_id: String,
    /// Name of the source branch, e.g. `feature/login-page`.
    pub head_ref_name: String,
    pub merged_at: Option<DateTime<Utc>>,
}

/// One tag's worth of changes: the commits of its window and the pull
/// requests those commits were merged by.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Release {
    pub tag: Tag,
    pub commits: Vec<Commit>,
    pub pull_requests: Vec<PullRequest>,
}

impl Release {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            commits: vec![],
            pull_requests: vec![],
        }
    }

    pub fn tag_name(&self) -> &str {
        &self.tag.name
    }

    /// Filename for this release with dots replaced, e.g. tag `v1.2.3` and
    /// extension `md` gives `v1_2_3.md`.
    pub fn filename(&self, ext: &str) -> String {
        format!("{}.{ext}", self.tag_name().replace('.', "_"))
    }

    /// Link to the release page given the repository's release base url
    /// (`https://<host>/<owner>/<repo>/releases/tag`).
    pub fn link(&self, release_link_base_url: &str) -> String {
        format!(
            "{}/{}",
            release_link_base_url.trim_end_matches('/'),
            self.tag_name()
        )
    }
}
