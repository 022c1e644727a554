//! Slack incoming-webhook message rendering.
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use serde::Serialize;

use crate::{
    changelog::{ChangelogContext, ChangelogSection},
    release::{section::Category, types::Release},
};

/// Default bot username for posted messages.
pub const DEFAULT_USERNAME: &str = "Release Notes";

const FEATURE_COLOR: &str = "#315cfd";
const FIX_COLOR: &str = "#d80f5c";
const OTHER_COLOR: &str = "#2a284f";
const SECTION_DIVIDER: &str = "──────\n";

/// Message posted to a Slack incoming webhook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WebhookMessage {
    pub channel: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub icon_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

/// Colored message attachment, one per changelog section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Attachment {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub color: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    pub text: String,
    #[serde(rename = "mrkdwn_in", skip_serializing_if = "Vec::is_empty")]
    pub markdown_in: Vec<String>,
}

impl Attachment {
    fn from_section(section: &ChangelogSection) -> Self {
        let category = section.category;
        let (title, color) = match category {
            Category::Feature => (category.title(), FEATURE_COLOR),
            Category::Bugfix | Category::Hotfix => {
                (category.title(), FIX_COLOR)
            }
            Category::Other | Category::Omitted => ("", OTHER_COLOR),
        };

        let mut text = SECTION_DIVIDER.to_string();

        for entry in section.entries.iter() {
            text.push_str(&format!(
                "<{}|#{}>: _*{}*_\n",
                entry.html_url, entry.number, entry.title
            ));
            if !entry.body.is_empty() {
                text.push_str(markdown_to_slack(&entry.body).trim_end());
                text.push('\n');
            }
            text.push('\n');
        }

        Self {
            color: color.into(),
            title: title.into(),
            text,
            markdown_in: vec!["text".into()],
        }
    }
}

/// Where and as whom release messages are posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlackTarget {
    pub channel: String,
    pub username: String,
    pub icon_url: Option<String>,
}

impl SlackTarget {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            username: DEFAULT_USERNAME.into(),
            icon_url: None,
        }
    }
}

/// Builds the announcement for one release of `repo_name`.
pub fn build_message(
    release: &Release,
    target: &SlackTarget,
    repo_name: &str,
    release_link_base_url: &str,
) -> WebhookMessage {
    let context = ChangelogContext::new(release, release_link_base_url);

    let attachments = context
        .sections
        .iter()
        .map(Attachment::from_section)
        .collect();

    WebhookMessage {
        channel: target.channel.clone(),
        username: target.username.clone(),
        icon_url: target.icon_url.clone().unwrap_or_default(),
        text: format!(
            "New release: <{}|{}@{}> :tada:",
            context.link, repo_name, context.tag_name
        ),
        attachments,
    }
}

/// Converts GitHub flavored Markdown into Slack `mrkdwn` by walking the
/// parsed document. Code spans and code blocks keep their content, only
/// `&`, `<` and `>` are escaped there as everywhere else. Block HTML such
/// as template comments is dropped.
pub fn markdown_to_slack(markdown: &str) -> String {
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let mut output = String::with_capacity(markdown.len());

    // Open lists, holding the next number of ordered ones.
    let mut lists: Vec<Option<u64>> = vec![];
    // Output length right after each open link's `<url|`.
    let mut links: Vec<usize> = vec![];
    let mut in_html_block = false;

    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Start(Tag::Heading { .. }) => output.push('*'),
            Event::End(TagEnd::Heading(_)) => {
                output.push('*');
                end_block(&mut output, &lists);
            }
            Event::Start(Tag::Paragraph) => {}
            Event::End(TagEnd::Paragraph) => end_block(&mut output, &lists),
            Event::Start(Tag::CodeBlock(kind)) => {
                output.push_str("```");
                if let CodeBlockKind::Fenced(lang) = kind
                    && !lang.is_empty()
                {
                    output.push_str(&escape(&lang));
                }
                output.push('\n');
            }
            Event::End(TagEnd::CodeBlock) => {
                if !output.ends_with('\n') {
                    output.push('\n');
                }
                output.push_str("```");
                end_block(&mut output, &lists);
            }
            Event::Start(Tag::List(first)) => {
                if !lists.is_empty() && !output.ends_with('\n') {
                    output.push('\n');
                }
                lists.push(first);
            }
            Event::End(TagEnd::List(_)) => {
                lists.pop();
                if lists.is_empty() {
                    output.push('\n');
                }
            }
            Event::Start(Tag::Item) => {
                output.push_str(&"  ".repeat(lists.len().saturating_sub(1)));
                match lists.last_mut() {
                    Some(Some(number)) => {
                        output.push_str(&format!("{number}. "));
                        *number += 1;
                    }
                    _ => output.push_str("• "),
                }
            }
            Event::End(TagEnd::Item) => {
                if !output.ends_with('\n') {
                    output.push('\n');
                }
            }
            Event::TaskListMarker(checked) => {
                output.push_str(if checked { "☑ " } else { "☐ " });
            }
            Event::Start(Tag::Strong) | Event::End(TagEnd::Strong) => {
                output.push('*')
            }
            Event::Start(Tag::Emphasis) | Event::End(TagEnd::Emphasis) => {
                output.push('_')
            }
            Event::Start(Tag::Strikethrough)
            | Event::End(TagEnd::Strikethrough) => output.push('~'),
            Event::Start(Tag::Link { dest_url, .. })
            | Event::Start(Tag::Image { dest_url, .. }) => {
                output.push_str(&format!("<{dest_url}|"));
                links.push(output.len());
            }
            Event::End(TagEnd::Link) | Event::End(TagEnd::Image) => {
                // Links without text show the bare url.
                if links.pop() == Some(output.len()) {
                    output.pop();
                }
                output.push('>');
            }
            Event::Start(Tag::HtmlBlock) => in_html_block = true,
            Event::End(TagEnd::HtmlBlock) => in_html_block = false,
            Event::Html(_) if in_html_block => {}
            Event::Html(html) | Event::InlineHtml(html) => {
                output.push_str(&escape(&html))
            }
            Event::Text(text) => output.push_str(&escape(&text)),
            Event::Code(code) => {
                output.push('`');
                output.push_str(&escape(&code));
                output.push('`');
            }
            Event::SoftBreak | Event::HardBreak => output.push('\n'),
            Event::Rule => {
                output.push_str(SECTION_DIVIDER.trim_end());
                end_block(&mut output, &lists);
            }
            _ => {}
        }
    }

    output.trim_end().to_string()
}

/// Closes a block: a line break inside lists, a blank line elsewhere.
fn end_block(output: &mut String, lists: &[Option<u64>]) {
    output.push('\n');
    if lists.is_empty() {
        output.push('\n');
    }
}

/// Escapes the control characters Slack reserves for its own markup.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
