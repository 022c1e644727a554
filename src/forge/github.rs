//! Implements the Forge trait for Github
use async_trait::async_trait;
use log::*;
use octocrab::{Octocrab, params};
use reqwest::StatusCode;

use crate::{
    Result,
    forge::{
        config::{DEFAULT_PAGE_SIZE, RemoteConfig},
        request::{
            CompareRequest, CreateReleaseRequest, ExistingRelease,
            ListPullRequestsRequest,
        },
        traits::Forge,
    },
    release::types::{Commit, PullRequest, Tag},
};

mod types;

use types::{
    CompareResponse, GithubCommit, HistoryParams, LimitedPages, PageParams,
};

/// GitHub forge implementation using Octocrab for tags, commit
/// comparisons, pull requests and releases.
pub struct Github {
    config: RemoteConfig,
    instance: Octocrab,
}

impl Github {
    /// Create GitHub client with optional personal access token
    /// authentication and API base URL configuration.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let base_uri = format!("{}://api.{}", config.scheme, config.host);

        let mut builder = Octocrab::builder().base_uri(base_uri)?;

        if config.has_token() {
            builder = builder.personal_token(config.token.clone());
        } else {
            warn!("no github token set: using unauthenticated client");
        }

        let instance = builder.build()?;

        Ok(Self { config, instance })
    }

    async fn compare_range(
        &self,
        base: &str,
        head: &str,
    ) -> Result<Vec<Commit>> {
        let route = format!(
            "/repos/{}/{}/compare/{base}...{head}",
            self.config.owner, self.config.repo
        );

        info!("fetching all commits between {base} and {head}");

        let mut commits: Vec<Commit> = vec![];
        let mut page = 1;

        loop {
            let params = PageParams {
                per_page: DEFAULT_PAGE_SIZE,
                page,
            };

            let result: CompareResponse =
                self.instance.get(&route, Some(&params)).await?;

            let count = result.commits.len();
            commits.extend(result.commits.into_iter().map(Commit::from));

            debug!(
                "compare page {page}: {count} commit(s), {} of {}",
                commits.len(),
                result.total_commits
            );

            if count < DEFAULT_PAGE_SIZE as usize
                || commits.len() as u64 >= result.total_commits
            {
                break;
            }

            page += 1;
        }

        Ok(commits)
    }

    /// Walks `head`'s history newest first up to the search depth and
    /// returns it oldest first.
    async fn list_history(&self, head: &str) -> Result<Vec<Commit>> {
        let route = format!(
            "/repos/{}/{}/commits",
            self.config.owner, self.config.repo
        );

        let depth = self.config.commit_search_depth as usize;

        info!("fetching up to {depth} commits of {head}");

        let mut commits: Vec<Commit> = vec![];
        let mut page = 1;

        while commits.len() < depth {
            let params = HistoryParams {
                sha: head.to_string(),
                per_page: DEFAULT_PAGE_SIZE,
                page,
            };

            let result: Vec<GithubCommit> =
                self.instance.get(&route, Some(&params)).await?;

            let count = result.len();
            commits.extend(result.into_iter().map(Commit::from));

            if count < DEFAULT_PAGE_SIZE as usize {
                break;
            }

            page += 1;
        }

        if commits.len() >= depth {
            warn!(
                "history of {head} reached the search depth of {depth} commits: older releases may fail to find their tagged commit"
            );
            commits.truncate(depth);
        }

        commits.reverse();

        Ok(commits)
    }
}

#[async_trait]
impl Forge for Github {
    fn remote_config(&self) -> RemoteConfig {
        self.config.clone()
    }

    async fn list_tags(&self, limit: u8) -> Result<Vec<Tag>> {
        info!("fetching the latest {limit} tags");

        let mut pages = LimitedPages::new(limit);
        let mut tags: Vec<Tag> = vec![];

        loop {
            let page = self
                .instance
                .repos(&self.config.owner, &self.config.repo)
                .list_tags()
                .per_page(pages.per_page)
                .page(pages.page)
                .send()
                .await?;

            let count = page.items.len();
            tags.extend(
                page.items
                    .into_iter()
                    .map(|t| Tag::new(t.name, t.commit.sha)),
            );

            if !pages.advance(tags.len(), count) {
                break;
            }
        }

        tags.truncate(pages.limit);

        if tags.len() >= limit as usize
            && let (Some(first), Some(last)) = (tags.first(), tags.last())
        {
            warn!(
                "only tags between {} and {} will generate changelogs",
                last.name, first.name
            );
        }

        Ok(tags)
    }

    async fn compare_commits(
        &self,
        req: CompareRequest,
    ) -> Result<Vec<Commit>> {
        match req.base {
            Some(base) => self.compare_range(&base, &req.head).await,
            None => self.list_history(&req.head).await,
        }
    }

    async fn list_merged_pull_requests(
        &self,
        req: ListPullRequestsRequest,
    ) -> Result<Vec<PullRequest>> {
        info!(
            "fetching latest {} pull requests merged into {}",
            req.limit, req.base_branch
        );

        let mut pages = LimitedPages::new(req.limit);
        let mut items = vec![];

        loop {
            let page = self
                .instance
                .pulls(&self.config.owner, &self.config.repo)
                .list()
                .state(params::State::Closed)
                .base(req.base_branch.clone())
                .sort(params::pulls::Sort::Updated)
                .direction(params::Direction::Descending)
                .per_page(pages.per_page)
                .page(pages.page)
                .send()
                .await?;

            let count = page.items.len();
            items.extend(page.items);

            if !pages.advance(items.len(), count) {
                break;
            }
        }

        items.truncate(pages.limit);
        let fetched = items.len();

        let prs = items
            .into_iter()
            .filter(|pr| pr.merged_at.is_some())
            .map(|pr| PullRequest {
                number: pr.number,
                title: pr.title.unwrap_or_default(),
                body: pr.body.unwrap_or_default(),
                html_url: pr
                    .html_url
                    .map(|u| u.to_string())
                    .unwrap_or_default(),
                merge_commit_id: pr.merge_commit_sha.unwrap_or_default(),
                head_ref_name: pr.head.ref_field.clone(),
                merged_at: pr.merged_at,
            })
            .collect::<Vec<PullRequest>>();

        debug!(
            "{} of {fetched} closed pull requests were merged",
            prs.len()
        );

        if fetched >= req.limit as usize
            && let (Some(newest), Some(oldest)) = (prs.first(), prs.last())
        {
            warn!(
                "only prs between #{} and #{} will be added to changelogs",
                oldest.number, newest.number
            );
        }

        Ok(prs)
    }

    async fn get_release_by_tag(
        &self,
        tag: String,
    ) -> Result<Option<ExistingRelease>> {
        let result = self
            .instance
            .repos(&self.config.owner, &self.config.repo)
            .releases()
            .get_by_tag(&tag)
            .await;

        match result {
            Ok(release) => Ok(Some(ExistingRelease {
                id: release.id.into_inner(),
                tag: release.tag_name,
            })),
            Err(octocrab::Error::GitHub { source, .. })
                if source.status_code == StatusCode::NOT_FOUND =>
            {
                debug!("no release found for tag: {tag}");
                Ok(None)
            }
            Err(err) => {
                error!("failed to look up release for tag {tag}: {err}");
                Err(err.into())
            }
        }
    }

    async fn create_release(&self, req: CreateReleaseRequest) -> Result<()> {
        self.instance
            .repos(&self.config.owner, &self.config.repo)
            .releases()
            .create(&req.tag)
            .name(&req.tag)
            .body(&req.notes)
            .draft(false)
            .prerelease(req.prerelease)
            .send()
            .await?;

        Ok(())
    }

    async fn delete_release(&self, id: u64) -> Result<()> {
        self.instance
            .repos(&self.config.owner, &self.config.repo)
            .releases()
            .delete(id)
            .await?;

        Ok(())
    }
}
