//! Gitflow branch-name classification of pull requests.
use serde::Serialize;
use std::fmt::Display;

use crate::release::types::{PullRequest, Release};

/// Branch prefix for gitflow feature branches
pub const FEATURE: &str = "feature";
/// Branch prefix for gitflow bugfix branches
pub const BUGFIX: &str = "bugfix";
/// Branch prefix for gitflow hotfix branches
pub const HOTFIX: &str = "hotfix";
/// Branch prefix for gitflow release branches
pub const RELEASE: &str = "release";

const GITFLOW_PREFIXES: [&str; 4] = [FEATURE, BUGFIX, HOTFIX, RELEASE];

/// Changelog category of a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Feature,
    Bugfix,
    Hotfix,
    /// Release branch merges never show up in changelogs.
    Omitted,
    Other,
}

impl Category {
    /// Section heading used by renderers.
    pub fn title(&self) -> &'static str {
        match self {
            Category::Feature => "Features",
            Category::Bugfix => "Bug fixes",
            Category::Hotfix => "Hotfixes",
            Category::Omitted => "Omitted",
            Category::Other => "Other",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// Classifies a pull request by the part of its source branch before the
/// first `/`. The comparison is case-sensitive and every input maps to a
/// category.
pub fn classify(pr: &PullRequest) -> Category {
    classify_branch(&pr.head_ref_name)
}

/// Branch-name half of [`classify`].
pub fn classify_branch(head_ref_name: &str) -> Category {
    let Some((prefix, _)) = head_ref_name.split_once('/') else {
        return Category::Other;
    };

    match prefix {
        FEATURE => Category::Feature,
        BUGFIX => Category::Bugfix,
        HOTFIX => Category::Hotfix,
        RELEASE => Category::Omitted,
        _ => Category::Other,
    }
}

/// Strips leading gitflow prefixes from a title and title-cases it.
///
/// `Feature/new_logIN-pages` becomes `New Login Pages`. Separators are only
/// turned into spaces when a prefix was removed, since the title then came
/// from a branch name. Applying it twice gives the same result.
pub fn clean_title(title: &str) -> String {
    let mut s = title.to_lowercase();

    loop {
        let trimmed = s.trim();
        match strip_gitflow_prefix(trimmed) {
            Some(rest) => s = rest.replace(['-', '_'], " "),
            None => {
                s = trimmed.to_string();
                break;
            }
        }
    }

    title_case(&s)
}

fn strip_gitflow_prefix(s: &str) -> Option<&str> {
    GITFLOW_PREFIXES
        .iter()
        .find_map(|p| s.strip_prefix(p).and_then(|r| r.strip_prefix('/')))
}

/// Upper-cases the first letter of every word. Word boundaries are any
/// character that is not alphanumeric, an apostrophe or an underscore.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;

    for c in s.chars() {
        if at_word_start && c.is_alphabetic() {
            let mut upper = c.to_uppercase();
            match (upper.next(), upper.next()) {
                (Some(u), None) => out.push(u),
                _ => out.push(c),
            }
        } else {
            out.push(c);
        }

        at_word_start = !(c.is_alphanumeric() || c == '\'' || c == '_');
    }

    out
}

/// A release's pull requests grouped by category, in the order they were
/// attributed. Omitted pull requests are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Sections {
    pub features: Vec<PullRequest>,
    pub bugfixes: Vec<PullRequest>,
    pub hotfixes: Vec<PullRequest>,
    pub other: Vec<PullRequest>,
}

impl Sections {
    pub fn from_release(release: &Release) -> Self {
        let mut sections = Sections::default();

        for (category, pr) in categorize(release) {
            match category {
                Category::Feature => sections.features.push(pr.clone()),
                Category::Bugfix => sections.bugfixes.push(pr.clone()),
                Category::Hotfix => sections.hotfixes.push(pr.clone()),
                Category::Other => sections.other.push(pr.clone()),
                Category::Omitted => {}
            }
        }

        sections
    }

    /// Non-empty sections in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[PullRequest])> {
        [
            (Category::Feature, self.features.as_slice()),
            (Category::Bugfix, self.bugfixes.as_slice()),
            (Category::Hotfix, self.hotfixes.as_slice()),
            (Category::Other, self.other.as_slice()),
        ]
        .into_iter()
        .filter(|(_, prs)| !prs.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// Pairs every pull request of a release with its category, preserving
/// attribution order.
pub fn categorize(release: &Release) -> Vec<(Category, &PullRequest)> {
    release
        .pull_requests
        .iter()
        .map(|pr| (classify(pr), pr))
        .collect()
}
