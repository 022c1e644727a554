//! Semantic ordering of repository tags and resolution of the
//! `base..head` window releases are generated for.
//!
//! Tag names are parsed with [`parse_tag_name`], a pure function that
//! strips an optional fixed prefix and parses what remains. Ordering and
//! boundary queries live on [`VersionIndex`] and never look at raw names.
use log::*;
use regex::Regex;
use semver::{BuildMetadata, Prerelease, Version};
use std::{cmp::Ordering, fmt::Display, sync::LazyLock};

use crate::{Result, error::ReleaseNotesError, release::types::Tag};

/// Loose `MAJOR[.MINOR[.PATCH]][-PRE][+BUILD]` form accepted when strict
/// semver parsing fails.
static LENIENT_VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?<major>\d+)(?:\.(?<minor>\d+))?(?:\.(?<patch>\d+))?(?:-(?<pre>[0-9A-Za-z.-]+))?(?:\+(?<build>[0-9A-Za-z.-]+))?$",
    )
    .unwrap()
});

/// Result of stripping and parsing a raw tag name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTagName {
    pub version: Version,
    /// The prefix that was stripped, empty when the name had none.
    pub prefix: String,
}

/// Parses a version string. Strict semver is tried first, then the
/// lenient form so that `1.2` reads as `1.2.0`.
pub fn parse_version(input: &str) -> Result<Version> {
    if let Ok(version) = Version::parse(input) {
        return Ok(version);
    }

    let caps = LENIENT_VERSION_REGEX.captures(input).ok_or_else(|| {
        ReleaseNotesError::invalid_version(input, "not a semantic version")
    })?;

    let number = |name: &str| -> Result<u64> {
        caps.name(name)
            .map(|m| m.as_str().parse::<u64>())
            .transpose()
            .map(|n| n.unwrap_or(0))
            .map_err(|e| {
                ReleaseNotesError::invalid_version(input, e.to_string())
            })
    };

    let mut version =
        Version::new(number("major")?, number("minor")?, number("patch")?);

    if let Some(pre) = caps.name("pre") {
        version.pre = Prerelease::new(pre.as_str()).map_err(|e| {
            ReleaseNotesError::invalid_version(input, e.to_string())
        })?;
    }

    if let Some(build) = caps.name("build") {
        version.build = BuildMetadata::new(build.as_str()).map_err(|e| {
            ReleaseNotesError::invalid_version(input, e.to_string())
        })?;
    }

    Ok(version)
}

/// Strips `prefix` from `name` when present and parses the rest. Returns
/// `None` for names that are not versions.
pub fn parse_tag_name(name: &str, prefix: &str) -> Option<ParsedTagName> {
    let (rest, stripped) = match name.strip_prefix(prefix) {
        Some(rest) if !prefix.is_empty() => (rest, prefix),
        _ => (name, ""),
    };

    parse_version(rest).ok().map(|version| ParsedTagName {
        version,
        prefix: stripped.to_string(),
    })
}

/// Parses a user supplied range bound such as `v1.2.0` or `1.2`.
pub fn parse_version_bound(input: &str, prefix: &str) -> Result<Version> {
    let input = input.trim();
    let rest = input.strip_prefix(prefix).unwrap_or(input);
    parse_version(rest)
}

/// A tag that parsed as a version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedTag {
    pub tag: Tag,
    pub version: Version,
    pub prefix: String,
}

impl Display for IndexedTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.tag.name)
    }
}

/// What the user asked for on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeRequest {
    /// `base..head`: everything after base up to and including head.
    Between { base: Version, head: Version },
    /// A single tag: just that release.
    Single(Version),
}

impl RangeRequest {
    /// Parses `base..head` or a single version.
    pub fn parse(input: &str, prefix: &str) -> Result<Self> {
        let parts = input.split("..").collect::<Vec<&str>>();

        match parts.as_slice() {
            [single] if !single.trim().is_empty() => {
                Ok(Self::Single(parse_version_bound(single, prefix)?))
            }
            [base, head] => Ok(Self::Between {
                base: parse_version_bound(base, prefix)?,
                head: parse_version_bound(head, prefix)?,
            }),
            _ => Err(ReleaseNotesError::invalid_args(format!(
                "bad range format '{input}': expected <base>..<head> or <tag>"
            ))),
        }
    }

    pub fn head(&self) -> &Version {
        match self {
            Self::Between { head, .. } => head,
            Self::Single(head) => head,
        }
    }
}

/// Resolved window: releases are produced for tags in `(base, head]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRange {
    /// Exclusive lower bound, `None` means the start of history.
    pub base: Option<Version>,
    /// Tag exactly matching the requested base. Its own commits are
    /// fetched as part of the comparison but belong to no release.
    pub base_tag: Option<IndexedTag>,
    /// Lower ref of the commit comparison.
    pub effective_base: Option<IndexedTag>,
    /// Inclusive upper bound; always an existing tag.
    pub head: IndexedTag,
}

impl ReleaseRange {
    /// Inclusion predicate for producing a release. Build metadata is
    /// ignored, as semver precedence requires.
    pub fn contains(&self, version: &Version) -> bool {
        let after_base = self
            .base
            .as_ref()
            .is_none_or(|base| version.cmp_precedence(base).is_gt());
        after_base && version.cmp_precedence(&self.head.version).is_le()
    }
}

/// Parsed tags in ascending version order.
#[derive(Debug, Clone, Default)]
pub struct VersionIndex {
    tags: Vec<IndexedTag>,
}

impl VersionIndex {
    /// Builds the index from tags in any order. Tags that do not parse are
    /// skipped. Equal versions keep their input order.
    pub fn new(tags: &[Tag], prefix: &str) -> Self {
        let mut indexed = vec![];

        for tag in tags {
            match parse_tag_name(&tag.name, prefix) {
                Some(parsed) => indexed.push(IndexedTag {
                    tag: tag.clone(),
                    version: parsed.version,
                    prefix: parsed.prefix,
                }),
                None => debug!("skipping non-version tag: {}", tag.name),
            }
        }

        indexed.sort_by(|a, b| a.version.cmp_precedence(&b.version));

        for pair in indexed.windows(2) {
            if pair[0].version.cmp_precedence(&pair[1].version)
                == Ordering::Equal
            {
                warn!(
                    "tags {} and {} resolve to the same version {}: ordering between them is undefined",
                    pair[0].tag.name, pair[1].tag.name, pair[0].version
                );
            }
        }

        Self { tags: indexed }
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexedTag> {
        self.tags.iter()
    }

    /// First tag with the same precedence as `version`.
    pub fn find(&self, version: &Version) -> Option<&IndexedTag> {
        self.tags
            .iter()
            .find(|t| t.version.cmp_precedence(version) == Ordering::Equal)
    }

    /// Greatest tag with lower precedence than `version`.
    pub fn predecessor(&self, version: &Version) -> Option<&IndexedTag> {
        self.tags
            .iter()
            .rev()
            .find(|t| t.version.cmp_precedence(version) == Ordering::Less)
    }

    /// Resolves a requested range against the tags in the index.
    pub fn resolve(&self, request: &RangeRequest) -> Result<ReleaseRange> {
        if self.is_empty() {
            return Err(ReleaseNotesError::NoTags);
        }

        let head = self.find(request.head()).cloned().ok_or_else(|| {
            ReleaseNotesError::TagNotFound(request.head().to_string())
        })?;

        let base = match request {
            RangeRequest::Between { base, .. } => Some(base.clone()),
            RangeRequest::Single(head) => {
                self.predecessor(head).map(|t| t.version.clone())
            }
        };

        let Some(base) = base else {
            debug!("no lower bound for {head}: using the start of history");
            return Ok(ReleaseRange {
                base: None,
                base_tag: None,
                effective_base: None,
                head,
            });
        };

        let base_tag = self.find(&base).cloned();
        let effective_base = self.predecessor(&base).cloned();

        match (&base_tag, &effective_base) {
            (Some(base_tag), Some(effective)) => debug!(
                "base {base_tag} exists: comparison starts at preceding tag {effective}"
            ),
            (Some(base_tag), None) => debug!(
                "base {base_tag} is the oldest tag: comparison starts at the beginning of history"
            ),
            (None, _) => {
                debug!("no tag matches base {base}: using it as given")
            }
        }

        Ok(ReleaseRange {
            base: Some(base),
            base_tag,
            effective_base,
            head,
        })
    }

    /// Tags that produce a release for `range`, oldest first.
    pub fn included(&self, range: &ReleaseRange) -> Vec<IndexedTag> {
        self.tags
            .iter()
            .filter(|t| range.contains(&t.version))
            .cloned()
            .collect()
    }
}
