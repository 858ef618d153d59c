use std::collections::HashMap;

use anyhow::{Error, Result, anyhow};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;

#[derive(Debug, Clone, Serialize)]
struct FcmRequest {
    message: FcmMessage,
}

#[derive(Debug, Clone, Serialize)]
struct FcmMessage {
    token: String,
    notification: FcmNotification,

    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize)]
struct FcmNotification {
    title: String,
    body: String,
}

pub struct FcmClient {
    http_client: Client,
    fcm_project_id: String,
}

impl FcmClient {
    pub fn new(config: &Config) -> Self {
        info!(project_id = %config.fcm_project_id, "FCM client initialized");

        Self {
            http_client: Client::new(),
            fcm_project_id: config.fcm_project_id.clone(),
        }
    }

    pub async fn send_notification(
        &self,
        device_token: &str,
        title: &str,
        body: &str,
        request_id: &str,
        data: Option<HashMap<String, String>>,
    ) -> Result<(), Error> {
        debug!(device_token, request_id, "Sending FCM push notification");

        let mut payload_data = data.unwrap_or_default();
        payload_data.insert("request_id".to_string(), request_id.to_string());

        let request = FcmRequest {
            message: FcmMessage {
                token: device_token.to_string(),
                notification: FcmNotification {
                    title: title.to_string(),
                    body: body.to_string(),
                },
                data: Some(payload_data),
            },
        };

        let provider = gcp_auth::provider().await?;
        let scopes = &["https://www.googleapis.com/auth/firebase.messaging"];
        let token = provider.token(scopes).await?;

        let url = format!(
            "https://fcm.googleapis.com/v1/projects/{}/messages:send",
            self.fcm_project_id
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(token.as_str())
            .json(&request)
            .send()
            .await?;

        if response.status().is_success() {
            info!(request_id, "FCM push notification sent");
            Ok(())
        } else {
            let error_text = response.text().await?;
            Err(anyhow!("FCM request failed: {}", error_text))
        }
    }
}
