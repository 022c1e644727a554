//! Release windowing and pull request attribution.
//!
//! Given a resolved [`ReleaseRange`], the commits of its comparison and a
//! snapshot of merged pull requests, [`generate_releases`] cuts one
//! [`Release`] per tag in the range and attaches the pull requests that
//! produced each window's commits. Everything here is synchronous and
//! works on data that was already fetched.
use log::*;

use crate::{
    Result,
    release::{
        attribution::PullRequestIndex,
        types::{Commit, PullRequest, Release, Tag},
    },
    version::{ReleaseRange, VersionIndex},
};

/// Merge-commit lookup and commit-to-pull-request attribution.
pub mod attribution;

/// Branch-name categories and title cleanup.
pub mod section;

/// Tags, commits, pull requests and releases.
pub mod types;

/// Commit window partitioning.
pub mod window;

/// Builds the releases for `range`, oldest first.
///
/// Fails only when a tag's boundary commit is missing from `commits`;
/// attribution gaps are logged and otherwise ignored.
pub fn generate_releases(
    index: &VersionIndex,
    range: &ReleaseRange,
    commits: &[Commit],
    pull_requests: Vec<PullRequest>,
) -> Result<Vec<Release>> {
    let tags = index
        .included(range)
        .into_iter()
        .map(|t| t.tag)
        .collect::<Vec<Tag>>();

    let lead_in = range.base_tag.as_ref().map(|t| &t.tag);

    let mut releases = window::partition(&tags, commits, lead_in)?;

    if releases.is_empty() {
        return Ok(releases);
    }

    let pr_index = PullRequestIndex::new(pull_requests);

    let windowed = releases
        .iter()
        .flat_map(|r| r.commits.iter().cloned())
        .collect::<Vec<Commit>>();

    if let Some(gap) = pr_index.coverage_gap(&windowed) {
        warn!(
            "oldest fetched pull request was merged {} but commits go back to {}: older pull requests will be missing from changelogs, raise the pull request limit to include them",
            gap.oldest_pull_request.format("%Y-%m-%d"),
            gap.oldest_commit.format("%Y-%m-%d"),
        );
    }

    let report = attribution::attribute(&mut releases, &pr_index);

    info!(
        "attributed {} commit(s) to pull requests across {} release(s)",
        report.attributed,
        releases.len()
    );

    if !report.unattributed.is_empty() {
        warn!(
            "{} commit(s) have no pull request in the fetched snapshot",
            report.unattributed.len()
        );
    }

    Ok(releases)
}
