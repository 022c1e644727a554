//! Links commits to the pull requests that merged them.
use chrono::{DateTime, Utc};
use log::*;
use std::collections::HashMap;

use crate::release::types::{Commit, PullRequest, Release};

/// Lookup from merge commit SHA to pull request, built from a bounded
/// snapshot of recently merged pull requests.
#[derive(Debug, Clone, Default)]
pub struct PullRequestIndex {
    by_merge_commit: HashMap<String, PullRequest>,
    oldest_merged_at: Option<DateTime<Utc>>,
}

/// The pull request snapshot does not reach back far enough to cover every
/// commit being processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageGap {
    pub oldest_pull_request: DateTime<Utc>,
    pub oldest_commit: DateTime<Utc>,
}

/// Outcome of attributing a set of releases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributionReport {
    pub attributed: usize,
    /// Commits with no matching pull request, in window order.
    pub unattributed: Vec<String>,
}

impl PullRequestIndex {
    /// Indexes pull requests by merge commit. When two pull requests claim
    /// the same merge commit, the first one in the snapshot wins.
    pub fn new(pull_requests: Vec<PullRequest>) -> Self {
        let mut by_merge_commit = HashMap::new();
        let mut oldest_merged_at: Option<DateTime<Utc>> = None;

        for pr in pull_requests {
            if pr.merge_commit_id.is_empty() {
                debug!(
                    "pull request #{} has no merge commit: skipping",
                    pr.number
                );
                continue;
            }

            if let Some(merged_at) = pr.merged_at {
                oldest_merged_at = Some(
                    oldest_merged_at.map_or(merged_at, |o| o.min(merged_at)),
                );
            }

            if by_merge_commit.contains_key(&pr.merge_commit_id) {
                debug!(
                    "pull request #{} shares merge commit {}: keeping the first",
                    pr.number, pr.merge_commit_id
                );
                continue;
            }

            by_merge_commit.insert(pr.merge_commit_id.clone(), pr);
        }

        Self {
            by_merge_commit,
            oldest_merged_at,
        }
    }

    pub fn len(&self) -> usize {
        self.by_merge_commit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_merge_commit.is_empty()
    }

    pub fn get(&self, merge_commit_id: &str) -> Option<&PullRequest> {
        self.by_merge_commit.get(merge_commit_id)
    }

    /// Returns a gap when the oldest visible pull request was merged after
    /// the oldest commit in `commits`. Pull requests older than the
    /// snapshot cannot be attributed.
    pub fn coverage_gap(&self, commits: &[Commit]) -> Option<CoverageGap> {
        let oldest_pull_request = self.oldest_merged_at?;
        let oldest_commit = commits.iter().filter_map(|c| c.author_date).min()?;

        (oldest_pull_request > oldest_commit).then_some(CoverageGap {
            oldest_pull_request,
            oldest_commit,
        })
    }
}

/// Appends to each release the pull requests merged by its commits, in
/// commit order. Unmatched commits are direct commits and add nothing.
pub fn attribute(
    releases: &mut [Release],
    index: &PullRequestIndex,
) -> AttributionReport {
    let mut report = AttributionReport::default();

    for release in releases.iter_mut() {
        for commit in release.commits.iter() {
            match index.get(&commit.id) {
                Some(pr) => {
                    debug!(
                        "{}: commit {} merged by #{}",
                        release.tag,
                        commit.short_id(),
                        pr.number
                    );
                    release.pull_requests.push(pr.clone());
                    report.attributed += 1;
                }
                None => {
                    debug!(
                        "{}: no pull request for commit {} : {}",
                        release.tag,
                        commit.short_id(),
                        commit.title()
                    );
                    report.unattributed.push(commit.id.clone());
                }
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::types::Tag;
    use chrono::TimeZone;

    fn pr(number: u64, merge: &str) -> PullRequest {
        PullRequest {
            number,
            title: format!("PR {number}"),
            merge_commit_id: merge.to_string(),
            head_ref_name: format!("feature/pr-{number}"),
            ..PullRequest::default()
        }
    }

    fn commit(id: &str) -> Commit {
        Commit {
            id: id.to_string(),
            ..Commit::default()
        }
    }

    fn release(tag: &str, ids: &[&str]) -> Release {
        let mut release = Release::new(Tag::new(tag, *ids.last().unwrap()));
        release.commits = ids.iter().map(|id| commit(id)).collect();
        release
    }

    #[test]
    fn attributes_in_commit_order() {
        let index = PullRequestIndex::new(vec![
            pr(3, "m3"),
            pr(1, "m1"),
            pr(2, "m2"),
        ]);

        let mut releases = vec![
            release("v1.1.0", &["m2", "d1", "m1"]),
            release("v1.2.0", &["m3", "d2"]),
        ];

        let report = attribute(&mut releases, &index);

        let numbers = |r: &Release| {
            r.pull_requests.iter().map(|p| p.number).collect::<Vec<u64>>()
        };
        assert_eq!(numbers(&releases[0]), vec![2, 1]);
        assert_eq!(numbers(&releases[1]), vec![3]);
        assert_eq!(report.attributed, 3);
        assert_eq!(report.unattributed, vec!["d1", "d2"]);
    }

    #[test]
    fn pull_request_lands_in_exactly_one_release() {
        let index = PullRequestIndex::new(vec![pr(7, "m7")]);
        let mut releases =
            vec![release("v1.0.0", &["a", "b"]), release("v1.1.0", &["m7"])];

        attribute(&mut releases, &index);

        assert!(releases[0].pull_requests.is_empty());
        assert_eq!(releases[1].pull_requests.len(), 1);
    }

    #[test]
    fn skips_pull_requests_without_merge_commit() {
        let index = PullRequestIndex::new(vec![pr(1, ""), pr(2, "m2")]);
        assert_eq!(index.len(), 1);
        assert!(index.get("").is_none());
    }

    #[test]
    fn first_pull_request_wins_shared_merge_commit() {
        let index = PullRequestIndex::new(vec![pr(9, "m"), pr(4, "m")]);
        assert_eq!(index.get("m").unwrap().number, 9);
    }

    #[test]
    fn detects_snapshot_older_than_commits() {
        let day = |d: u32| Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap();

        let mut newest = pr(2, "m2");
        newest.merged_at = Some(day(20));
        let mut oldest = pr(1, "m1");
        oldest.merged_at = Some(day(10));
        let index = PullRequestIndex::new(vec![newest, oldest]);

        let early = Commit {
            author_date: Some(day(5)),
            ..commit("c1")
        };
        let late = Commit {
            author_date: Some(day(15)),
            ..commit("c2")
        };

        let gap = index.coverage_gap(&[late.clone(), early]).unwrap();
        assert_eq!(gap.oldest_pull_request, day(10));
        assert_eq!(gap.oldest_commit, day(5));

        assert!(index.coverage_gap(&[late]).is_none());
        assert!(index.coverage_gap(&[commit("undated")]).is_none());
    }
}
