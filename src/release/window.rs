//! Splits one linear commit list into per-tag release windows.
use log::*;

use crate::{
    Result,
    error::ReleaseNotesError,
    release::types::{Commit, Release, Tag},
};

/// Walks `commits` with a single cursor and cuts a window at each tag's
/// target commit. `tags` must be ordered oldest first.
///
/// When `lead_in` is given, commits up to and including its target are
/// dropped first: they belong to the base release, which is not part of
/// the output. A lead-in target missing from the list means the list
/// already starts after it.
///
/// Fails with [`ReleaseNotesError::MissingBoundaryCommit`] as soon as a
/// tag's target is not found before the list runs out. Nothing is
/// returned in that case since every later window would be shifted.
pub fn partition(
    tags: &[Tag],
    commits: &[Commit],
    lead_in: Option<&Tag>,
) -> Result<Vec<Release>> {
    if tags.is_empty() {
        info!("no tags in range: nothing to partition");
        return Ok(vec![]);
    }

    let mut cursor = 0;

    if let Some(base) = lead_in
        && let Some(pos) =
            commits.iter().position(|c| c.id == base.target_commit_id)
    {
        debug!(
            "skipping {} commit(s) released by base tag {base}",
            pos + 1
        );
        cursor = pos + 1;
    }

    let mut releases = Vec::with_capacity(tags.len());

    for tag in tags {
        let mut release = Release::new(tag.clone());
        let mut found = false;

        while let Some(commit) = commits.get(cursor) {
            cursor += 1;
            release.commits.push(commit.clone());

            if commit.id == tag.target_commit_id {
                found = true;
                break;
            }
        }

        if !found {
            error!(
                "reached end of commit list without finding {} for tag {tag}",
                tag.target_commit_id
            );
            return Err(ReleaseNotesError::missing_boundary(
                &tag.name,
                &tag.target_commit_id,
            ));
        }

        debug!("{tag}: {} commit(s) in window", release.commits.len());
        releases.push(release);
    }

    if cursor < commits.len() {
        warn!(
            "{} commit(s) after the last tag were not assigned to a release",
            commits.len() - cursor
        );
    }

    Ok(releases)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commits(ids: &[&str]) -> Vec<Commit> {
        ids.iter()
            .map(|id| Commit {
                id: id.to_string(),
                message: format!("commit {id}"),
                ..Commit::default()
            })
            .collect()
    }

    fn ids(release: &Release) -> Vec<&str> {
        release.commits.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn splits_windows_at_tag_targets() {
        let tags = vec![Tag::new("v1.1.0", "c3"), Tag::new("v1.2.0", "c5")];
        let base = Tag::new("v1.0.0", "c1");
        let list = commits(&["c1", "c2", "c3", "c4", "c5"]);

        let releases = partition(&tags, &list, Some(&base)).unwrap();

        assert_eq!(releases.len(), 2);
        assert_eq!(releases[0].tag.name, "v1.1.0");
        assert_eq!(ids(&releases[0]), vec!["c2", "c3"]);
        assert_eq!(releases[1].tag.name, "v1.2.0");
        assert_eq!(ids(&releases[1]), vec!["c4", "c5"]);
    }

    #[test]
    fn missing_boundary_commit_is_fatal() {
        let tags = vec![Tag::new("v1.1.0", "c3"), Tag::new("v1.2.0", "c5")];
        let base = Tag::new("v1.0.0", "c1");
        let list = commits(&["c1", "c2", "c4", "c5"]);

        let err = partition(&tags, &list, Some(&base)).unwrap_err();

        match err {
            ReleaseNotesError::MissingBoundaryCommit { tag, sha } => {
                assert_eq!(tag, "v1.1.0");
                assert_eq!(sha, "c3");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn windows_reconstruct_the_commit_list() {
        let cases: Vec<(Vec<Tag>, Vec<Commit>)> = vec![
            (
                vec![Tag::new("a", "1")],
                commits(&["1"]),
            ),
            (
                vec![
                    Tag::new("a", "3"),
                    Tag::new("b", "4"),
                    Tag::new("c", "9"),
                ],
                commits(&["1", "2", "3", "4", "5", "6", "7", "8", "9"]),
            ),
            (
                vec![Tag::new("a", "x"), Tag::new("b", "y")],
                commits(&["x", "y"]),
            ),
        ];

        for (tags, list) in cases {
            let releases = partition(&tags, &list, None).unwrap();

            let rebuilt = releases
                .iter()
                .flat_map(|r| r.commits.clone())
                .collect::<Vec<Commit>>();
            assert_eq!(rebuilt, list);

            for release in releases.iter() {
                let last = release.commits.last().unwrap();
                assert_eq!(last.id, release.tag.target_commit_id);
            }
        }
    }

    #[test]
    fn no_tags_yields_no_releases() {
        let releases = partition(&[], &commits(&["c1", "c2"]), None).unwrap();
        assert!(releases.is_empty());
    }

    #[test]
    fn absent_lead_in_means_list_starts_after_base() {
        let tags = vec![Tag::new("v1.1.0", "c3")];
        let base = Tag::new("v1.0.0", "c1");
        let list = commits(&["c2", "c3"]);

        let releases = partition(&tags, &list, Some(&base)).unwrap();
        assert_eq!(ids(&releases[0]), vec!["c2", "c3"]);
    }

    #[test_log::test]
    fn trailing_commits_are_left_unassigned() {
        let tags = vec![Tag::new("v1.1.0", "c2")];
        let list = commits(&["c1", "c2", "c3"]);

        let releases = partition(&tags, &list, None).unwrap();
        assert_eq!(releases.len(), 1);
        assert_eq!(ids(&releases[0]), vec!["c1", "c2"]);
    }

    #[test]
    fn same_target_for_two_tags_fails_on_the_second() {
        let tags = vec![Tag::new("v1.0.0", "c2"), Tag::new("1.0.0", "c2")];
        let list = commits(&["c1", "c2"]);

        assert!(matches!(
            partition(&tags, &list, None),
            Err(ReleaseNotesError::MissingBoundaryCommit { .. })
        ));
    }
}
