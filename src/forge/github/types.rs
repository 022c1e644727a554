use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{forge::config::DEFAULT_PAGE_SIZE, release::types::Commit};

#[derive(Debug, Serialize)]
pub struct PageParams {
    pub per_page: u8,
    pub page: u32,
}

#[derive(Debug, Serialize)]
pub struct HistoryParams {
    pub sha: String,
    pub per_page: u8,
    pub page: u32,
}

/// Page cursor for fetching the `limit` most recent items of a listing.
/// GitHub serves at most [`DEFAULT_PAGE_SIZE`] items per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitedPages {
    pub limit: usize,
    pub per_page: u8,
    pub page: u32,
}

impl LimitedPages {
    pub fn new(limit: u8) -> Self {
        Self {
            limit: limit as usize,
            per_page: limit.clamp(1, DEFAULT_PAGE_SIZE),
            page: 1,
        }
    }

    /// Moves to the next page. Returns false once `fetched` items reach
    /// the limit or the last page came back short.
    pub fn advance(&mut self, fetched: usize, page_len: usize) -> bool {
        if fetched >= self.limit || page_len < self.per_page as usize {
            return false;
        }
        self.page += 1;
        true
    }
}

#[derive(Debug, Deserialize)]
pub struct GithubCommitAuthor {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GithubCommitDetail {
    pub message: String,
    pub author: Option<GithubCommitAuthor>,
}

#[derive(Debug, Deserialize)]
pub struct GithubCommit {
    pub sha: String,
    pub commit: GithubCommitDetail,
}

#[derive(Debug, Deserialize)]
pub struct CompareResponse {
    pub total_commits: u64,
    pub commits: Vec<GithubCommit>,
}

impl From<GithubCommit> for Commit {
    fn from(value: GithubCommit) -> Self {
        let author_date = value
            .commit
            .author
            .and_then(|a| a.date)
            .and_then(|d| DateTime::parse_from_rfc3339(&d).ok())
            .map(|d| d.with_timezone(&Utc));

        Commit {
            id: value.sha,
            author_date,
            message: value.commit.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn pages_past_the_api_maximum() {
        let mut pages = LimitedPages::new(250);
        assert_eq!(pages.per_page, 100);

        assert!(pages.advance(100, 100));
        assert_eq!(pages.page, 2);
        assert!(pages.advance(200, 100));
        assert_eq!(pages.page, 3);
        assert!(!pages.advance(300, 100));
    }

    #[test]
    fn stops_on_short_page_or_small_limit() {
        let mut pages = LimitedPages::new(200);
        assert!(!pages.advance(42, 42));
        assert_eq!(pages.page, 1);

        let mut pages = LimitedPages::new(30);
        assert_eq!(pages.per_page, 30);
        assert!(!pages.advance(30, 30));
    }

    #[test]
    fn converts_compare_response_commits() {
        let json = serde_json::json!({
            "total_commits": 1,
            "commits": [{
                "sha": "abc123",
                "commit": {
                    "message": "Merge pull request #42 from org/feature/login\n\nLogin page",
                    "author": { "name": "dev", "date": "2024-03-01T12:30:00Z" }
                }
            }]
        });

        let response: CompareResponse = serde_json::from_value(json).unwrap();
        assert_eq!(response.total_commits, 1);

        let commit = Commit::from(response.commits.into_iter().next().unwrap());
        assert_eq!(commit.id, "abc123");
        assert_eq!(
            commit.author_date,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap())
        );
        assert_eq!(
            commit.title(),
            "Merge pull request #42 from org/feature/login"
        );
    }

    #[test]
    fn tolerates_missing_author() {
        let json = serde_json::json!({
            "sha": "def456",
            "commit": { "message": "direct", "author": null }
        });

        let commit: Commit =
            serde_json::from_value::<GithubCommit>(json).unwrap().into();
        assert!(commit.author_date.is_none());
    }
}
