//! Rendering of generated releases into Markdown documents and Slack
//! webhook messages.
use serde::Serialize;

use crate::release::{
    section::{Category, Sections, clean_title},
    types::{PullRequest, Release},
};

/// Markdown rendering via tera templates.
pub mod markdown;

/// Slack webhook message rendering.
pub mod slack;

/// Pull request as exposed to changelog templates, with a cleaned title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangelogEntry {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub html_url: String,
    pub branch: String,
}

impl From<&PullRequest> for ChangelogEntry {
    fn from(pr: &PullRequest) -> Self {
        Self {
            number: pr.number,
            title: clean_title(&pr.title),
            body: pr.body.trim_end().to_string(),
            html_url: pr.html_url.clone(),
            branch: pr.head_ref_name.clone(),
        }
    }
}

/// One non-empty changelog section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangelogSection {
    pub category: Category,
    pub title: String,
    pub entries: Vec<ChangelogEntry>,
}

/// Template context for a single release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangelogContext {
    pub tag_name: String,
    pub link: String,
    pub sections: Vec<ChangelogSection>,
}

impl ChangelogContext {
    pub fn new(release: &Release, release_link_base_url: &str) -> Self {
        let sections = Sections::from_release(release)
            .iter()
            .map(|(category, prs)| ChangelogSection {
                category,
                title: category.title().to_string(),
                entries: prs.iter().map(ChangelogEntry::from).collect(),
            })
            .collect();

        Self {
            tag_name: release.tag_name().to_string(),
            link: release.link(release_link_base_url),
            sections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::types::Tag;

    #[test]
    fn context_skips_empty_and_omitted_sections() {
        let mut release = Release::new(Tag::new("v1.1.0", "c3"));
        release.pull_requests = vec![
            PullRequest {
                number: 3,
                title: "release/1.1.0".into(),
                head_ref_name: "release/1.1.0".into(),
                ..PullRequest::default()
            },
            PullRequest {
                number: 2,
                title: "feature/dark-mode".into(),
                body: "Adds a toggle\n\n".into(),
                head_ref_name: "feature/dark-mode".into(),
                ..PullRequest::default()
            },
        ];

        let context = ChangelogContext::new(
            &release,
            "https://github.com/acme/app/releases/tag",
        );

        assert_eq!(
            context.link,
            "https://github.com/acme/app/releases/tag/v1.1.0"
        );
        assert_eq!(context.sections.len(), 1);
        assert_eq!(context.sections[0].title, "Features");
        assert_eq!(context.sections[0].entries[0].title, "Dark Mode");
        assert_eq!(context.sections[0].entries[0].body, "Adds a toggle");
    }
}
