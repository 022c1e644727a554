//! Slack incoming-webhook client.
use async_trait::async_trait;
use log::*;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

#[cfg(test)]
use mockall::automock;

use crate::{Result, changelog::slack::WebhookMessage, error::ReleaseNotesError};

/// Delivers rendered messages to Slack.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SlackPoster: Send + Sync {
    async fn post(&self, message: &WebhookMessage) -> Result<()>;
}

pub struct SlackClient {
    client: Client,
    webhook_url: SecretString,
}

impl SlackClient {
    /// Validates the webhook url and builds the http client.
    pub fn new(webhook_url: SecretString) -> Result<Self> {
        if webhook_url.expose_secret().is_empty() {
            return Err(ReleaseNotesError::invalid_args(
                "--slack-webhook is needed to post to slack",
            ));
        }

        let url = Url::parse(webhook_url.expose_secret())?;

        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(ReleaseNotesError::invalid_args(format!(
                "unsupported slack webhook scheme: {}",
                url.scheme()
            )));
        }

        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            client,
            webhook_url,
        })
    }
}

#[async_trait]
impl SlackPoster for SlackClient {
    async fn post(&self, message: &WebhookMessage) -> Result<()> {
        debug!(
            "posting {} attachment(s) to slack channel {}",
            message.attachments.len(),
            message.channel
        );

        let response = self
            .client
            .post(self.webhook_url.expose_secret())
            .json(message)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            return Err(ReleaseNotesError::SlackError(status.as_u16()));
        }

        Ok(())
    }
}
