use std::sync::Arc;

use anyhow::Error;
use async_trait::async_trait;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    clients::profile::ProfileClient,
    config::Config,
    error::DispatchError,
    models::{
        envelope::{DispatchEnvelope, EmailEnvelope, PushEnvelope},
        request::{Channel, NotificationRequest},
    },
};

/// Publish seam between the gateway and the broker. The production
/// implementation is `RabbitMqClient`, injected at startup.
#[async_trait]
pub trait EnvelopePublisher: Send + Sync {
    async fn publish(&self, queue: &str, payload: &[u8]) -> Result<(), Error>;
}

/// Sole owner of envelope construction and the only publisher in the system.
pub struct Dispatcher {
    publisher: Arc<dyn EnvelopePublisher>,
    profiles: ProfileClient,
    email_queue_name: String,
    push_queue_name: String,
}

impl Dispatcher {
    pub fn new(
        publisher: Arc<dyn EnvelopePublisher>,
        profiles: ProfileClient,
        config: &Config,
    ) -> Self {
        Self {
            publisher,
            profiles,
            email_queue_name: config.email_queue_name.clone(),
            push_queue_name: config.push_queue_name.clone(),
        }
    }

    /// Validates the request, resolves the recipient, and durably enqueues
    /// one envelope for the requested channel if the recipient opted in.
    /// Acceptance means "durably queued", not "delivered".
    pub async fn dispatch(
        &self,
        request: NotificationRequest,
    ) -> Result<Vec<DispatchEnvelope>, DispatchError> {
        let request = request.validate()?;

        let profile = match self.profiles.fetch(&request.user_id).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(user_id = %request.user_id, error = %e, "Recipient resolution failed");
                return Err(DispatchError::RecipientNotFound);
            }
        };

        let request_id = request
            .request_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let mut envelopes = Vec::new();

        match request.channel {
            Channel::Email if profile.preferences.email => {
                envelopes.push(DispatchEnvelope::Email(EmailEnvelope {
                    request_id: request_id.clone(),
                    user_id: request.user_id.clone(),
                    template_code: request.template_code.clone(),
                    variables: request.variables.clone(),
                    metadata: request.metadata.clone(),
                    user_email: profile.email.clone(),
                }));
            }
            Channel::Push if profile.preferences.push => {
                envelopes.push(DispatchEnvelope::Push(PushEnvelope {
                    request_id: request_id.clone(),
                    user_id: request.user_id.clone(),
                    template_code: request.template_code.clone(),
                    variables: request.variables.clone(),
                    metadata: request.metadata.clone(),
                    push_token: profile.push_token.clone(),
                }));
            }
            channel => {
                // Opt-out is silent: no envelope, no error.
                info!(
                    user_id = %request.user_id,
                    channel = channel.as_str(),
                    "Recipient opted out, nothing to enqueue"
                );
            }
        }

        for envelope in &envelopes {
            let payload =
                serde_json::to_vec(envelope).map_err(|e| DispatchError::Queue(e.into()))?;

            let queue = self.queue_for(envelope.channel());

            self.publisher.publish(queue, &payload).await.map_err(|e| {
                warn!(queue = %queue, error = %e, "Publish failed, rejecting dispatch");
                DispatchError::Queue(e)
            })?;

            info!(
                request_id = %envelope.request_id(),
                queue = %queue,
                "Envelope durably enqueued"
            );
        }

        Ok(envelopes)
    }

    fn queue_for(&self, channel: Channel) -> &str {
        match channel {
            Channel::Email => &self.email_queue_name,
            Channel::Push => &self.push_queue_name,
        }
    }
}
