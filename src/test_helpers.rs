//! Common test fixtures shared across test modules.
use chrono::{TimeZone, Utc};

use crate::release::types::{Commit, PullRequest, Tag};

/// Tags v0.9.0→c0, v1.0.0→c1, v1.1.0→c3 and v1.2.0→c5, most recent first
/// the way the forge lists them.
pub fn scenario_tags() -> Vec<Tag> {
    vec![
        Tag::new("v1.2.0", "c5"),
        Tag::new("v1.1.0", "c3"),
        Tag::new("v1.0.0", "c1"),
        Tag::new("v0.9.0", "c0"),
    ]
}

/// Commits with the given ids, oldest first, one day apart.
pub fn commits(ids: &[&str]) -> Vec<Commit> {
    ids.iter()
        .enumerate()
        .map(|(i, id)| Commit {
            id: id.to_string(),
            author_date: Utc
                .with_ymd_and_hms(2024, 1, 1 + i as u32, 12, 0, 0)
                .single(),
            message: format!("commit {id}"),
        })
        .collect()
}

/// Pull request from `branch` merged as `merge_commit_id`.
pub fn merged_pr(
    number: u64,
    merge_commit_id: &str,
    branch: &str,
) -> PullRequest {
    PullRequest {
        number,
        title: branch.to_string(),
        body: format!("Body of #{number}"),
        html_url: format!("https://github.com/acme/app/pull/{number}"),
        merge_commit_id: merge_commit_id.to_string(),
        head_ref_name: branch.to_string(),
        merged_at: Utc.with_ymd_and_hms(2023, 12, 1, 12, 0, 0).single(),
    }
}
