//! Traits related to remote git forges
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::{
    Result,
    forge::{
        config::RemoteConfig,
        request::{
            CompareRequest, CreateReleaseRequest, ExistingRelease,
            ListPullRequestsRequest,
        },
    },
    release::types::{Commit, PullRequest, Tag},
};

/// Data and publishing operations the changelog command needs from a forge.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Forge: Send + Sync {
    fn remote_config(&self) -> RemoteConfig;

    /// Most recent tags, at most `limit`.
    async fn list_tags(&self, limit: u8) -> Result<Vec<Tag>>;

    /// Commits between two refs, oldest first.
    async fn compare_commits(&self, req: CompareRequest) -> Result<Vec<Commit>>;

    /// Merged pull requests, most recently updated first.
    async fn list_merged_pull_requests(
        &self,
        req: ListPullRequestsRequest,
    ) -> Result<Vec<PullRequest>>;

    async fn get_release_by_tag(
        &self,
        tag: String,
    ) -> Result<Option<ExistingRelease>>;

    async fn create_release(&self, req: CreateReleaseRequest) -> Result<()>;

    async fn delete_release(&self, id: u64) -> Result<()>;
}
