use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::{
    clients::fcm::FcmClient,
    error::DeliveryError,
    models::envelope::PushEnvelope,
    templates::TemplateKind,
    worker::{ChannelHandler, Outcome},
};

pub struct PushChannel {
    fcm: FcmClient,
}

impl PushChannel {
    pub fn new(fcm: FcmClient) -> Self {
        Self { fcm }
    }
}

#[async_trait]
impl ChannelHandler for PushChannel {
    type Envelope = PushEnvelope;

    fn channel(&self) -> &'static str {
        "push"
    }

    async fn deliver(&self, envelope: PushEnvelope) -> Result<Outcome, DeliveryError> {
        // A tokenless envelope can never be sent; acknowledging it is the
        // only disposition that does not redeliver it forever.
        let Some(token) = envelope.push_token.as_deref().filter(|t| !t.is_empty()) else {
            info!(request_id = %envelope.request_id, "No push token on envelope, skipping send");
            return Ok(Outcome::Skipped);
        };

        let rendered =
            TemplateKind::from_code(&envelope.template_code).render_push(&envelope.variables);

        let data = metadata_strings(&envelope.metadata);

        self.fcm
            .send_notification(
                token,
                &rendered.title,
                &rendered.body,
                &envelope.request_id,
                Some(data),
            )
            .await
            .map_err(DeliveryError::Send)?;

        Ok(Outcome::Delivered)
    }
}

/// FCM data payloads are string-to-string; non-string metadata values pass
/// through as their JSON text.
fn metadata_strings(metadata: &HashMap<String, Value>) -> HashMap<String, String> {
    metadata
        .iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), text)
        })
        .collect()
}
