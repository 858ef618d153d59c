use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use crate::{config::Config, templates::RenderedEmail};

#[derive(Debug, Serialize)]
struct MailPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Mail relay client. One send attempt per call; retrying is the caller's
/// (non-)policy.
pub struct MailerClient {
    http_client: Client,
    base_url: String,
    from_address: String,
}

impl MailerClient {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        info!(base_url = %config.mail_api_url, "Mailer client initialized");

        Ok(Self {
            http_client,
            base_url: config.mail_api_url.clone(),
            from_address: config.mail_from_address.clone(),
        })
    }

    pub async fn send(&self, to: &str, content: &RenderedEmail) -> Result<(), Error> {
        let url = format!("{}/send", self.base_url);
        let payload = MailPayload {
            from: &self.from_address,
            to,
            subject: &content.subject,
            html: &content.body,
        };

        debug!(to, subject = %content.subject, "Sending email");

        let response = self
            .http_client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| anyhow!("Mail relay request failed: {}", e))?;

        let status = response.status();
        if status.is_success() {
            info!(to, "Email sent");
            Ok(())
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(anyhow!("Mail relay returned status {}: {}", status, error_text))
        }
    }
}
