use std::time::Duration;

use anyhow::Result;
use log::debug;
use reqwest::{
    Client,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};

use crate::{
    access::AccessNotifier,
    catalog::{self, ModrinthCatalog},
    http::HttpClient,
    status::{self, StatusClient},
};

/// Default timeout for every outbound request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Connection settings collected from flags and environment.
#[derive(Clone)]
pub struct Settings {
    pub api_url: Option<String>,
    pub status_api_url: Option<String>,
    pub timeout: Duration,
    pub token: Option<String>,
    pub webhook_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: None,
            status_api_url: None,
            timeout: DEFAULT_TIMEOUT,
            token: None,
            webhook_url: None,
        }
    }
}

/// Clients built on one shared reqwest `Client`.
pub struct Config {
    pub catalog: ModrinthCatalog,
    pub status: StatusClient,
    pub notifier: AccessNotifier,
    pub timeout: Duration,
}

impl Config {
    pub fn new(settings: Settings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = settings.token.as_deref().filter(|t| !t.is_empty()) {
            let mut auth_value = HeaderValue::from_str(token)?;
            auth_value.set_sensitive(true);
            headers.insert(AUTHORIZATION, auth_value);
            debug!("Using MODRINTH_TOKEN for authentication: {}", mask(token));
        }

        let client = Client::builder()
            .user_agent(concat!("packboard/", env!("PACKBOARD_VERSION")))
            .default_headers(headers)
            .timeout(settings.timeout)
            .build()?;

        let http_client = HttpClient::new(client);
        let catalog = ModrinthCatalog::from_http_client(
            http_client.clone(),
            settings.api_url.as_deref().unwrap_or(catalog::DEFAULT_API_URL),
        );
        let status = StatusClient::from_http_client(
            http_client.clone(),
            settings
                .status_api_url
                .as_deref()
                .unwrap_or(status::DEFAULT_STATUS_API_URL),
        );
        let notifier = AccessNotifier::from_http_client(http_client, settings.webhook_url);

        Ok(Self {
            catalog,
            status,
            notifier,
            timeout: settings.timeout,
        })
    }
}

/// Keeps only the ends of a secret for logging.
fn mask(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 12 {
        return "*********".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}*********{}", head, tail)
}
