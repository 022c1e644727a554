//! Markdown changelog rendering.
use crate::{Result, changelog::ChangelogContext, release::types::Release};

/// Default changelog body template.
pub const DEFAULT_BODY: &str = r#"{% for section in sections %}## {{ section.title }}:
{% for entry in section.entries %}#### [#{{ entry.number }}]({{ entry.html_url }}): {{ entry.title }}
{{ entry.body }}

{% endfor %}{% endfor %}"#;

/// Renders releases with a tera template. The template sees `tag_name`,
/// `link` and `sections`, each section holding a `title` and its `entries`.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    body: String,
    release_link_base_url: String,
}

impl MarkdownRenderer {
    pub fn new(
        body: impl Into<String>,
        release_link_base_url: impl Into<String>,
    ) -> Self {
        Self {
            body: body.into(),
            release_link_base_url: release_link_base_url.into(),
        }
    }

    pub fn render(&self, release: &Release) -> Result<String> {
        let context =
            ChangelogContext::new(release, &self.release_link_base_url);
        let context = tera::Context::from_serialize(&context)?;
        let notes = tera::Tera::one_off(&self.body, &context, false)?;
        Ok(notes)
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_BODY, "")
    }
}
