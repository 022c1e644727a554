//! Request and response types passed across the
//! [`Forge`](super::traits::Forge) trait.

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request for the commits of a comparison.
pub struct CompareRequest {
    /// Lower ref, exclusive. `None` walks the head's history instead.
    pub base: Option<String>,
    /// Upper ref, inclusive.
    pub head: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request for recently merged pull requests.
pub struct ListPullRequestsRequest {
    /// Branch the pull requests were merged into.
    pub base_branch: String,
    /// Most recently updated pull requests to fetch.
    pub limit: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to create a release for an existing tag.
pub struct CreateReleaseRequest {
    pub tag: String,
    pub notes: String,
    pub prerelease: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A release that already exists on the forge.
pub struct ExistingRelease {
    pub id: u64,
    pub tag: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// What happened when publishing a release.
pub enum PublishOutcome {
    Created,
    Overwritten,
    /// Release existed and overwrite was not requested.
    Skipped,
}
