use crate::formatter::MessageEmbed;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("webhook returned status {0}")]
    Status(u16),
}

/// Outbound notification transport. Both operations return the handle of
/// the live message; edits echo the handle they were given.
#[async_trait::async_trait]
pub trait Notifier {
    async fn create_message(&self, embed: &MessageEmbed) -> Result<String, NotifyError>;
    async fn edit_message(&self, message_id: &str, embed: &MessageEmbed)
    -> Result<String, NotifyError>;
}

/// Discord-style webhook client. Creation posts with `?wait=true` so the
/// response carries the message id needed for later edits.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    webhook_url: String,
    mention: Option<String>,
}

impl WebhookNotifier {
    pub fn new(webhook_url: String, mention: Option<String>) -> Self {
        Self {
            client: Client::new(),
            webhook_url,
            mention,
        }
    }

    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
        embed: &MessageEmbed,
    ) -> Result<String, NotifyError> {
        let payload = WebhookPayload {
            content: self.mention.as_deref(),
            embeds: [embed],
        };

        let response = request.json(&payload).send().await?;

        if !response.status().is_success() {
            return Err(NotifyError::Status(response.status().as_u16()));
        }

        let message = response.json::<WebhookMessage>().await?;
        Ok(message.id)
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    async fn create_message(&self, embed: &MessageEmbed) -> Result<String, NotifyError> {
        let url = format!("{}?wait=true", self.webhook_url);
        self.execute(self.client.post(url), embed).await
    }

    async fn edit_message(
        &self,
        message_id: &str,
        embed: &MessageEmbed,
    ) -> Result<String, NotifyError> {
        let url = format!("{}/messages/{message_id}", self.webhook_url);
        self.execute(self.client.patch(url), embed).await
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
    embeds: [&'a MessageEmbed; 1],
}

#[derive(Debug, Deserialize)]
struct WebhookMessage {
    id: String,
}
