use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{config::Config, models::profile::RecipientProfile};

#[derive(Debug, Deserialize)]
struct ProfileResponse {
    data: RecipientProfile,
}

pub struct ProfileClient {
    http_client: Client,
    base_url: String,
}

impl ProfileClient {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.user_lookup_timeout_seconds))
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            http_client,
            base_url: config.user_service_url.clone(),
        })
    }

    /// Fetches the recipient profile. Absent users, unreachable service,
    /// timeouts, and undecodable bodies all surface as errors; the caller
    /// collapses them into one not-found outcome.
    pub async fn fetch(&self, user_id: &str) -> Result<RecipientProfile, Error> {
        let url = format!("{}/users/{}", self.base_url, user_id);

        debug!(user_id, "Fetching recipient profile");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Profile lookup failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Profile service returned status {}", status));
        }

        let body: ProfileResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse profile response: {}", e))?;

        Ok(body.data)
    }
}
