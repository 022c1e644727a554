//! `changelog` command: fetches a snapshot, generates the releases of a
//! tag range and sends each one to the requested outputs.
use log::*;
use secrecy::SecretString;
use std::path::{Path, PathBuf};

use crate::{
    Result,
    changelog::{
        markdown::MarkdownRenderer,
        slack::{SlackTarget, build_message},
    },
    cli::{Args, ChangelogArgs},
    config::Config,
    error::ReleaseNotesError,
    forge::{
        github::Github,
        manager::ForgeManager,
        request::{
            CompareRequest, CreateReleaseRequest, ListPullRequestsRequest,
            PublishOutcome,
        },
    },
    release::{generate_releases, types::Release},
    slack::{SlackClient, SlackPoster},
    version::{RangeRequest, VersionIndex, parse_tag_name},
};

/// Command line flags merged over the configuration file.
#[derive(Debug, Clone)]
pub struct ChangelogOptions {
    pub range: String,
    pub tag_prefix: String,
    pub integration_branch: String,
    pub tag_limit: u8,
    pub pr_limit: u8,
    pub push: bool,
    pub overwrite: bool,
    pub save: bool,
    pub output_dir: PathBuf,
    pub body: String,
    pub mark_prereleases: bool,
    pub slack: Option<SlackTarget>,
    pub slack_webhook: Option<SecretString>,
}

impl ChangelogOptions {
    pub fn resolve(args: &ChangelogArgs, config: &Config) -> Result<Self> {
        let channel = args
            .slack_channel
            .clone()
            .or_else(|| config.slack.channel.clone())
            .filter(|c| !c.is_empty());

        let webhook = args
            .slack_webhook
            .clone()
            .or_else(|| config.slack.webhook_url.clone())
            .filter(|w| !w.is_empty());

        let (slack, slack_webhook) = match (channel, webhook) {
            (Some(_), None) => {
                return Err(ReleaseNotesError::invalid_args(
                    "--slack-webhook is needed to post to slack",
                ));
            }
            (None, Some(_)) => {
                warn!("slack webhook set without --slack-channel: not posting to slack");
                (None, None)
            }
            (None, None) => (None, None),
            (Some(channel), Some(webhook)) => {
                let target = SlackTarget {
                    channel,
                    username: config.slack.username.clone(),
                    icon_url: args
                        .slack_icon
                        .clone()
                        .or_else(|| config.slack.icon_url.clone()),
                };
                (Some(target), Some(SecretString::from(webhook)))
            }
        };

        Ok(Self {
            range: args.range.clone(),
            tag_prefix: args
                .tag_prefix
                .clone()
                .unwrap_or_else(|| config.tag_prefix.clone()),
            integration_branch: args
                .integration_branch
                .clone()
                .unwrap_or_else(|| config.integration_branch.clone()),
            tag_limit: args.tag_limit.unwrap_or(config.tag_limit),
            pr_limit: args.pr_limit.unwrap_or(config.pull_request_limit),
            push: args.push,
            overwrite: args.overwrite,
            save: args.save,
            output_dir: args.output_dir.clone(),
            body: config.changelog.body.clone(),
            mark_prereleases: config.changelog.mark_prereleases,
            slack,
            slack_webhook,
        })
    }

    /// Nothing was requested besides printing.
    fn prints_to_stdout(&self) -> bool {
        !self.push && !self.save && self.slack.is_none()
    }
}

/// Releases generated by a run and how many of their outputs failed.
#[derive(Debug, Default)]
pub struct ChangelogSummary {
    pub releases: Vec<Release>,
    pub failed_outputs: usize,
}

/// Entry point used by the binary.
pub async fn run(
    args: &Args,
    changelog_args: &ChangelogArgs,
) -> Result<ChangelogSummary> {
    let cwd = std::env::current_dir()?;
    let config = Config::load(args.config.as_deref(), &cwd).await?;
    let options = ChangelogOptions::resolve(changelog_args, &config)?;

    let remote = args.get_remote(config.commit_search_depth)?;

    info!(
        "generating changelog for {} in {}",
        options.range,
        remote.full_name()
    );

    let forge = ForgeManager::new(Box::new(Github::new(remote)?));

    let slack = match options.slack_webhook.clone() {
        Some(webhook) => Some(SlackClient::new(webhook)?),
        None => None,
    };

    execute(
        &forge,
        &options,
        slack.as_ref().map(|s| s as &dyn SlackPoster),
    )
    .await
}

/// Generates the releases of `options.range` and sends each one to its
/// outputs. Failures of one release's outputs are logged and counted but do
/// not stop the others.
pub async fn execute(
    forge: &ForgeManager,
    options: &ChangelogOptions,
    slack: Option<&dyn SlackPoster>,
) -> Result<ChangelogSummary> {
    let request = RangeRequest::parse(&options.range, &options.tag_prefix)?;

    let (tags, pull_requests) = tokio::try_join!(
        forge.list_tags(options.tag_limit),
        forge.list_merged_pull_requests(ListPullRequestsRequest {
            base_branch: options.integration_branch.clone(),
            limit: options.pr_limit,
        }),
    )?;

    debug!(
        "fetched {} tag(s) and {} merged pull request(s)",
        tags.len(),
        pull_requests.len()
    );

    let index = VersionIndex::new(&tags, &options.tag_prefix);
    let range = index.resolve(&request)?;

    if index.included(&range).is_empty() {
        info!("no tags in range {}: nothing to do", options.range);
        return Ok(ChangelogSummary::default());
    }

    let commits = forge
        .compare_commits(CompareRequest {
            base: range.effective_base.as_ref().map(|t| t.tag.name.clone()),
            head: range.head.tag.name.clone(),
        })
        .await?;

    let releases = generate_releases(&index, &range, &commits, pull_requests)?;

    let remote = forge.remote_config();
    let renderer =
        MarkdownRenderer::new(&options.body, &remote.release_link_base_url);

    let mut failed_outputs = 0;

    for release in releases.iter() {
        info!(
            "{}: {} commit(s), {} pull request(s)",
            release.tag_name(),
            release.commits.len(),
            release.pull_requests.len()
        );

        failed_outputs +=
            send_release(forge, options, slack, &renderer, release).await;
    }

    if failed_outputs > 0 {
        warn!("{failed_outputs} changelog output(s) failed");
    }

    Ok(ChangelogSummary {
        releases,
        failed_outputs,
    })
}

/// Sends one release to every requested output, returning the number of
/// outputs that failed.
async fn send_release(
    forge: &ForgeManager,
    options: &ChangelogOptions,
    slack: Option<&dyn SlackPoster>,
    renderer: &MarkdownRenderer,
    release: &Release,
) -> usize {
    let tag = release.tag_name();

    let notes = match renderer.render(release) {
        Ok(notes) => notes,
        Err(err) => {
            error!("{tag}: could not render changelog: {err}");
            return 1;
        }
    };

    let mut failed = 0;

    if options.push
        && let Err(err) = push_release(forge, options, release, &notes).await
    {
        error!("{tag}: could not push release to github: {err}");
        failed += 1;
    }

    if let (Some(target), Some(poster)) = (options.slack.as_ref(), slack)
        && let Err(err) = post_release(forge, target, poster, release).await
    {
        error!("{tag}: could not post release to slack: {err}");
        failed += 1;
    }

    if options.save {
        match save_release(&options.output_dir, release, &notes).await {
            Ok(path) => info!("{tag}: wrote changelog to {}", path.display()),
            Err(err) => {
                error!("{tag}: could not write changelog file: {err}");
                failed += 1;
            }
        }
    } else if options.prints_to_stdout() {
        println!("{notes}");
    }

    failed
}

async fn push_release(
    forge: &ForgeManager,
    options: &ChangelogOptions,
    release: &Release,
    notes: &str,
) -> Result<()> {
    let prerelease = options.mark_prereleases
        && parse_tag_name(release.tag_name(), &options.tag_prefix)
            .is_some_and(|p| !p.version.pre.is_empty());

    let outcome = forge
        .publish_release(
            CreateReleaseRequest {
                tag: release.tag_name().to_string(),
                notes: notes.to_string(),
                prerelease,
            },
            options.overwrite,
        )
        .await?;

    match outcome {
        PublishOutcome::Created => {
            info!("{}: pushed release to github", release.tag_name())
        }
        PublishOutcome::Overwritten => {
            warn!("{}: overwrote release in github", release.tag_name())
        }
        PublishOutcome::Skipped => {}
    }

    Ok(())
}

async fn post_release(
    forge: &ForgeManager,
    target: &SlackTarget,
    poster: &dyn SlackPoster,
    release: &Release,
) -> Result<()> {
    let remote = forge.remote_config();

    let message = build_message(
        release,
        target,
        &remote.repo,
        &remote.release_link_base_url,
    );

    if remote.dry_run {
        warn!("dry_run: would post to slack: {:#?}", message);
        return Ok(());
    }

    info!("{}: posting release to slack", release.tag_name());

    poster.post(&message).await
}

async fn save_release(
    output_dir: &Path,
    release: &Release,
    notes: &str,
) -> Result<PathBuf> {
    tokio::fs::create_dir_all(output_dir).await?;
    let path = output_dir.join(release.filename("md"));
    tokio::fs::write(&path, notes).await?;
    Ok(path)
}
