//! Game server status from a mcsrvstat.us-compatible API.

use std::time::Duration;

use anyhow::Result;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::http::HttpClient;

/// Public mcsrvstat.us API.
pub const DEFAULT_STATUS_API_URL: &str = "https://api.mcsrvstat.us";

/// How often the poller refreshes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5 * 60);

const DEFAULT_SERVER_ADDRESS: &str = "mc.anchorlab.net";
const DEFAULT_VERSION: &str = "Forge 1.19.2";
const DEFAULT_DESCRIPTION: &str = "Welcome to AnchorLab MC - Modded Survival";
const DEFAULT_HEADLINE: &str = "Welcome to our modded Minecraft server!";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Players {
    #[serde(default)]
    pub online: u32,
    #[serde(default)]
    pub max: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Motd {
    #[serde(default)]
    pub clean: Vec<String>,
}

/// Server status as reported by the status API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerStatus {
    pub online: bool,
    #[serde(default)]
    pub players: Players,
    #[serde(default)]
    pub version: String,
    pub hostname: Option<String>,
    pub ip: Option<String>,
    pub motd: Option<Motd>,
}

/// Values shown before a real status is known.
#[derive(Debug, Clone, Default)]
pub struct StatusSettings {
    pub server_address: Option<String>,
    pub game_version: Option<String>,
    pub description: Option<String>,
}

impl ServerStatus {
    /// Placeholder status used until a fetch succeeds.
    pub fn fallback(settings: &StatusSettings) -> Self {
        let address = settings
            .server_address
            .clone()
            .unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_string());
        ServerStatus {
            online: true,
            players: Players { online: 12, max: 50 },
            version: settings
                .game_version
                .clone()
                .unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            hostname: Some(address.clone()),
            ip: Some(address),
            motd: Some(Motd {
                clean: vec![
                    settings
                        .description
                        .clone()
                        .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
                ],
            }),
        }
    }

    /// First MOTD line, or a generic greeting.
    pub fn headline(&self) -> &str {
        self.motd
            .as_ref()
            .and_then(|m| m.clean.first())
            .map(String::as_str)
            .unwrap_or(DEFAULT_HEADLINE)
    }
}

/// Fetches server status.
#[derive(Clone)]
pub struct StatusClient {
    http_client: HttpClient,
    api_url: String,
}

impl StatusClient {
    pub fn from_http_client(http_client: HttpClient, api_url: &str) -> Self {
        Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    #[tracing::instrument(skip(self))]
    pub async fn fetch(&self, address: &str) -> Result<ServerStatus> {
        let url = format!("{}/2/{}", self.api_url, address);
        debug!("Fetching server status from {}...", url);
        self.http_client.get_json(&url).await
    }
}

/// Periodically publishes the latest server status.
pub struct StatusPoller {
    client: StatusClient,
    address: String,
    interval: Duration,
}

impl StatusPoller {
    pub fn new(client: StatusClient, address: impl Into<String>) -> Self {
        Self {
            client,
            address: address.into(),
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Fetches immediately and then once per interval, replacing the value in
    /// `sender` on each success. Returns once every receiver is gone.
    pub async fn run(self, sender: watch::Sender<Option<ServerStatus>>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = sender.closed() => break,
                _ = ticker.tick() => {}
            }

            let result = tokio::select! {
                _ = sender.closed() => break,
                result = self.client.fetch(&self.address) => result,
            };

            match result {
                Ok(status) => {
                    sender.send_replace(Some(status));
                }
                Err(e) => warn!("Failed to fetch server status: {:#}", e),
            }
        }
        debug!("Status poll for {} stopped", self.address);
    }
}
