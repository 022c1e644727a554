//! CLI argument parsing and GitHub remote configuration.
use clap::{Parser, Subcommand};
use git_url_parse::GitUrl;
use secrecy::SecretString;
use std::{env, path::PathBuf};

use crate::{
    Result,
    error::ReleaseNotesError,
    forge::config::{DEFAULT_HOST, RemoteConfig},
};

/// Env vars searched, in order, for a token when `--token` is empty.
pub const TOKEN_ENV_VARS: [&str; 2] = ["GITHUB_TOKEN", "GITHUB_ACCESS_TOKEN"];

/// Global CLI arguments for the repository connection and debugging.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(
        long,
        short = 'r',
        visible_alias = "repo",
        default_value = "",
        global = true
    )]
    /// GitHub repository as `owner/name` or a full URL
    /// (https://github.com/owner/name).
    pub repository: String,

    #[arg(long, default_value = "", global = true)]
    /// GitHub personal access token. Falls back to GITHUB_TOKEN, then
    /// GITHUB_ACCESS_TOKEN env vars.
    pub token: String,

    #[arg(long, global = true)]
    /// Configuration file (default: ./gitflow-release-notes.toml).
    pub config: Option<PathBuf>,

    #[arg(long, default_value_t = false, global = true)]
    /// Log releases and slack messages instead of publishing them.
    pub dry_run: bool,

    #[arg(long, default_value_t = false, global = true)]
    /// Enable debug logging.
    pub debug: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Release notes subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generates changelogs for the specified tag or tag range.
    Changelog(ChangelogArgs),
}

/// Arguments of the `changelog` subcommand.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ChangelogArgs {
    /// Tag or tag range, e.g. `v1.2.0` or `v1.0.0..v1.2.0`.
    pub range: String,

    #[arg(long, default_value_t = false)]
    /// Push changelogs to GitHub releases.
    pub push: bool,

    #[arg(long, default_value_t = false)]
    /// Replace releases that already exist on GitHub.
    pub overwrite: bool,

    #[arg(long, short = 's', default_value_t = false)]
    /// Save changelogs to markdown files.
    pub save: bool,

    #[arg(long, default_value = ".")]
    /// Directory markdown files are saved into.
    pub output_dir: PathBuf,

    #[arg(long, short = 'c')]
    /// Post changelogs to a slack channel.
    pub slack_channel: Option<String>,

    #[arg(long, short = 'w', env = "SLACK_WEBHOOK_URL", hide_env_values = true)]
    /// Slack incoming webhook URL.
    pub slack_webhook: Option<String>,

    #[arg(long, short = 'i')]
    /// URL of the icon shown next to slack messages.
    pub slack_icon: Option<String>,

    #[arg(long)]
    /// Prefix stripped from tag names before version parsing.
    pub tag_prefix: Option<String>,

    #[arg(long)]
    /// Branch pull requests are merged into (default: develop).
    pub integration_branch: Option<String>,

    #[arg(long, value_parser = clap::value_parser!(u8).range(1..))]
    /// Most recent tags to fetch (1-255).
    pub tag_limit: Option<u8>,

    #[arg(long, value_parser = clap::value_parser!(u8).range(1..))]
    /// Most recently updated pull requests to fetch (1-255).
    pub pr_limit: Option<u8>,
}

impl Args {
    /// Configure remote repository connection from CLI arguments.
    pub fn get_remote(&self, commit_search_depth: u64) -> Result<RemoteConfig> {
        let env_token = TOKEN_ENV_VARS
            .iter()
            .find_map(|name| env::var(name).ok().filter(|v| !v.is_empty()));

        get_github_remote(
            &self.repository,
            &self.token,
            env_token,
            commit_search_depth,
            self.dry_run,
        )
    }
}

/// Configure GitHub remote from a repository reference, resolving the token
/// from the flag, the URL and then the environment.
fn get_github_remote(
    repository: &str,
    token: &str,
    env_token: Option<String>,
    commit_search_depth: u64,
    dry_run: bool,
) -> Result<RemoteConfig> {
    if repository.is_empty() {
        return Err(ReleaseNotesError::invalid_args(
            "must configure a repository with --repository, e.g. franzwilhelm/gitflow-release-notes",
        ));
    }

    let (scheme, host, owner, repo, url_token) = if repository.contains("://")
    {
        parse_repo_url(repository)?
    } else {
        let (owner, repo) = parse_repo_ref(repository)?;
        ("https".to_string(), DEFAULT_HOST.to_string(), owner, repo, None)
    };

    let mut token = token.to_string();

    if token.is_empty()
        && let Some(url_token) = url_token
    {
        token = url_token;
    }

    if token.is_empty()
        && let Some(env_token) = env_token
    {
        token = env_token;
    }

    let release_link_base_url =
        format!("{scheme}://{host}/{owner}/{repo}/releases/tag");

    Ok(RemoteConfig {
        host,
        scheme,
        owner,
        repo,
        token: SecretString::from(token),
        release_link_base_url,
        commit_search_depth,
        dry_run,
    })
}

/// Splits `owner/name`.
fn parse_repo_ref(repository: &str) -> Result<(String, String)> {
    match repository.split('/').collect::<Vec<&str>>().as_slice() {
        [owner, repo] if !owner.is_empty() && !repo.is_empty() => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(ReleaseNotesError::InvalidRepository(format!(
            "{repository}: expected owner/name, e.g. franzwilhelm/gitflow-release-notes"
        ))),
    }
}

type ParsedRepoUrl = (String, String, String, String, Option<String>);

fn parse_repo_url(repository: &str) -> Result<ParsedRepoUrl> {
    let parsed = GitUrl::parse(repository)?;

    match parsed.scheme {
        git_url_parse::Scheme::Http | git_url_parse::Scheme::Https => {}
        _ => {
            return Err(ReleaseNotesError::InvalidRepository(
                "only http and https schemes are supported for repo urls"
                    .into(),
            ));
        }
    }

    let host = parsed.host.ok_or_else(|| {
        ReleaseNotesError::InvalidRepository(format!(
            "unable to parse host from {repository}"
        ))
    })?;

    let owner = parsed.owner.ok_or_else(|| {
        ReleaseNotesError::InvalidRepository(format!(
            "unable to parse owner from {repository}"
        ))
    })?;

    Ok((
        parsed.scheme.to_string(),
        host,
        owner,
        parsed.name,
        parsed.token,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forge::config::DEFAULT_COMMIT_SEARCH_DEPTH;
    use secrecy::ExposeSecret;

    #[test]
    fn gets_remote_from_owner_and_name() {
        let remote = get_github_remote(
            "franzwilhelm/gitflow-release-notes",
            "github_token",
            None,
            DEFAULT_COMMIT_SEARCH_DEPTH,
            false,
        )
        .unwrap();

        assert_eq!(remote.host, "github.com");
        assert_eq!(remote.scheme, "https");
        assert_eq!(remote.owner, "franzwilhelm");
        assert_eq!(remote.repo, "gitflow-release-notes");
        assert_eq!(
            remote.release_link_base_url,
            "https://github.com/franzwilhelm/gitflow-release-notes/releases/tag"
        );
        assert_eq!(remote.token.expose_secret(), "github_token");
    }

    #[test]
    fn gets_remote_from_url() {
        let remote = get_github_remote(
            "https://github.example.com/github_owner/github_repo",
            "",
            None,
            DEFAULT_COMMIT_SEARCH_DEPTH,
            true,
        )
        .unwrap();

        assert_eq!(remote.host, "github.example.com");
        assert_eq!(remote.owner, "github_owner");
        assert_eq!(remote.repo, "github_repo");
        assert!(remote.dry_run);
        assert!(!remote.has_token());
    }

    #[test]
    fn flag_token_wins_over_env_token() {
        let remote = get_github_remote(
            "owner/repo",
            "flag",
            Some("env".into()),
            DEFAULT_COMMIT_SEARCH_DEPTH,
            false,
        )
        .unwrap();
        assert_eq!(remote.token.expose_secret(), "flag");

        let remote = get_github_remote(
            "owner/repo",
            "",
            Some("env".into()),
            DEFAULT_COMMIT_SEARCH_DEPTH,
            false,
        )
        .unwrap();
        assert_eq!(remote.token.expose_secret(), "env");
    }

    #[test]
    fn rejects_bad_repository_refs() {
        for repository in ["owner", "owner/repo/extra", "/repo", "owner/"] {
            let result = get_github_remote(
                repository,
                "",
                None,
                DEFAULT_COMMIT_SEARCH_DEPTH,
                false,
            );
            assert!(
                matches!(result, Err(ReleaseNotesError::InvalidRepository(_))),
                "{repository} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_missing_repository() {
        let result =
            get_github_remote("", "", None, DEFAULT_COMMIT_SEARCH_DEPTH, false);
        assert!(matches!(result, Err(ReleaseNotesError::InvalidArgs(_))));
    }

    #[test]
    fn parses_changelog_command() {
        let args = Args::try_parse_from([
            "gitflow-release-notes",
            "changelog",
            "v1.0.0..v1.2.0",
            "-r",
            "owner/repo",
            "--push",
            "--overwrite",
            "-s",
            "-c",
            "#releases",
            "-w",
            "https://hooks.slack.com/services/x",
            "--pr-limit",
            "50",
        ])
        .unwrap();

        assert_eq!(args.repository, "owner/repo");

        let Command::Changelog(changelog) = args.command;
        assert_eq!(changelog.range, "v1.0.0..v1.2.0");
        assert!(changelog.push && changelog.overwrite && changelog.save);
        assert_eq!(changelog.slack_channel.as_deref(), Some("#releases"));
        assert_eq!(
            changelog.slack_webhook.as_deref(),
            Some("https://hooks.slack.com/services/x")
        );
        assert_eq!(changelog.pr_limit, Some(50));
        assert_eq!(changelog.output_dir, PathBuf::from("."));
    }

    #[test]
    fn limits_must_be_positive() {
        let result = Args::try_parse_from([
            "gitflow-release-notes",
            "changelog",
            "v1.0.0",
            "--tag-limit",
            "0",
        ]);
        assert!(result.is_err());

        let args = Args::try_parse_from([
            "gitflow-release-notes",
            "changelog",
            "v1.0.0",
            "--pr-limit",
            "200",
        ])
        .unwrap();
        let Command::Changelog(changelog) = args.command;
        assert_eq!(changelog.pr_limit, Some(200));
    }
}
