//! HTTP client with JSON helpers and status classification.
//!
//! Requests are attempted exactly once. Timeouts come from the wrapped
//! `reqwest::Client`.

use anyhow::{Context, Result};
use log::debug;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::status::check_status;

/// Thin wrapper around a shared reqwest `Client`.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Performs a GET request and deserializes the JSON response.
    #[tracing::instrument(skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET JSON from {}...", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        let response = response.error_for_status().map_err(check_status)?;

        response
            .json::<T>()
            .await
            .context("Failed to parse JSON response")
    }

    /// Performs a GET request with query parameters and deserializes the JSON response.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        debug!("GET JSON from {} with query {:?}...", url, query);

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .context("Failed to send request")?;

        let response = response.error_for_status().map_err(check_status)?;

        response
            .json::<T>()
            .await
            .context("Failed to parse JSON response")
    }

    /// POSTs a JSON body and discards the response body.
    #[tracing::instrument(skip(self, body))]
    pub async fn post_json<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<()> {
        debug!("POST JSON to {}...", url);

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        response.error_for_status().map_err(check_status)?;
        Ok(())
    }
}
