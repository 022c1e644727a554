//! Manager that wraps forge implementations
use log::*;

use crate::{
    Result,
    forge::{
        config::RemoteConfig,
        request::{
            CompareRequest, CreateReleaseRequest, ListPullRequestsRequest,
            PublishOutcome,
        },
        traits::Forge,
    },
    release::types::{Commit, PullRequest, Tag},
};

pub struct ForgeManager {
    forge: Box<dyn Forge>,
    remote_config: RemoteConfig,
}

impl ForgeManager {
    pub fn new(forge: Box<dyn Forge>) -> Self {
        let remote_config = forge.remote_config();
        Self {
            forge,
            remote_config,
        }
    }

    pub fn remote_config(&self) -> RemoteConfig {
        self.remote_config.clone()
    }

    pub async fn list_tags(&self, limit: u8) -> Result<Vec<Tag>> {
        self.forge.list_tags(limit).await
    }

    pub async fn compare_commits(
        &self,
        req: CompareRequest,
    ) -> Result<Vec<Commit>> {
        debug!(
            "getting commits from [{:?}] up to and including {}",
            req.base, req.head
        );
        self.forge.compare_commits(req).await
    }

    pub async fn list_merged_pull_requests(
        &self,
        req: ListPullRequestsRequest,
    ) -> Result<Vec<PullRequest>> {
        self.forge.list_merged_pull_requests(req).await
    }

    /// Creates a release for `tag`. An existing release is left alone
    /// unless `overwrite` is set, in which case it is deleted and created
    /// again with the new notes.
    pub async fn publish_release(
        &self,
        req: CreateReleaseRequest,
        overwrite: bool,
    ) -> Result<PublishOutcome> {
        let existing = self.forge.get_release_by_tag(req.tag.clone()).await?;

        let outcome = match existing {
            Some(_) if !overwrite => {
                warn!(
                    "release already exists for {}: skipping, use --overwrite to replace it",
                    req.tag
                );
                return Ok(PublishOutcome::Skipped);
            }
            Some(release) => {
                if self.remote_config.dry_run {
                    warn!(
                        "dry_run: would delete release: id: {}, tag: {}",
                        release.id, release.tag
                    );
                } else {
                    info!("deleting existing release for {}", release.tag);
                    self.forge.delete_release(release.id).await?;
                }
                PublishOutcome::Overwritten
            }
            None => PublishOutcome::Created,
        };

        if self.remote_config.dry_run {
            warn!("dry_run: would create release: req: {:#?}", req);
            return Ok(outcome);
        }

        info!("creating release for {}", req.tag);
        self.forge.create_release(req).await?;

        Ok(outcome)
    }
}
