//! Access requests delivered to a chat webhook.

use anyhow::{Context, Result, bail};
use log::info;
use serde::Serialize;

use crate::http::HttpClient;

/// A player asking to be let onto the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRequest {
    pub discord_username: String,
    pub minecraft_username: String,
}

impl AccessRequest {
    pub fn new(discord_username: impl Into<String>, minecraft_username: impl Into<String>) -> Self {
        Self {
            discord_username: discord_username.into(),
            minecraft_username: minecraft_username.into(),
        }
    }

    /// Both usernames are required.
    pub fn validate(&self) -> Result<()> {
        if self.discord_username.trim().is_empty() {
            bail!("Discord username is required");
        }
        if self.minecraft_username.trim().is_empty() {
            bail!("Minecraft username is required");
        }
        Ok(())
    }

    /// Message text posted to the webhook.
    pub fn message(&self) -> String {
        format!(
            "**New Access Request**\nDiscord: {}\nMinecraft: {}",
            self.discord_username, self.minecraft_username
        )
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
}

/// Posts access requests to a Discord-compatible webhook.
pub struct AccessNotifier {
    http_client: HttpClient,
    webhook_url: Option<String>,
}

impl AccessNotifier {
    pub fn from_http_client(http_client: HttpClient, webhook_url: Option<String>) -> Self {
        Self {
            http_client,
            webhook_url: webhook_url.filter(|u| !u.trim().is_empty()),
        }
    }

    /// Sends one request. Not retried.
    #[tracing::instrument(skip(self))]
    pub async fn send(&self, request: &AccessRequest) -> Result<()> {
        let Some(webhook_url) = self.webhook_url.as_deref() else {
            bail!("Discord webhook URL not configured");
        };
        request.validate()?;

        let content = request.message();
        self.http_client
            .post_json(webhook_url, &WebhookPayload { content: &content })
            .await
            .context("Failed to send webhook")?;

        info!(
            "Access request sent for {} ({})",
            request.minecraft_username, request.discord_username
        );
        Ok(())
    }
}
