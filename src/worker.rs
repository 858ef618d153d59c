use anyhow::{Error, Result};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::{
    clients::rbmq::RabbitMqClient, config::Config, error::DeliveryError,
    models::envelope::FailedDelivery,
};

/// Outcome of a delivery attempt that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Delivered,

    /// Channel precondition not met. There is nothing to send and nothing a
    /// redelivery could fix, so the message is acknowledged untouched.
    Skipped,
}

/// What the worker tells the broker about one consumed message. Exactly one
/// disposition is settled per delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    Ack,

    /// Poison message: rejected without requeue and never dead-lettered.
    Discard { reason: String },

    /// Delivery failed: rejected without requeue, routed through the
    /// worker's failure policy first.
    Fail { reason: String },
}

/// One channel's delivery behavior. The consume protocol around it (decode,
/// disposition, ack/reject bookkeeping) is shared across channels.
#[async_trait]
pub trait ChannelHandler: Send + Sync {
    type Envelope: DeserializeOwned + Send;

    fn channel(&self) -> &'static str;

    async fn deliver(&self, envelope: Self::Envelope) -> Result<Outcome, DeliveryError>;
}

/// Decides the disposition for one raw queue payload.
pub async fn process_payload<H: ChannelHandler>(handler: &H, payload: &[u8]) -> Disposition {
    let envelope: H::Envelope = match serde_json::from_slice(payload) {
        Ok(envelope) => envelope,
        Err(e) => {
            let reason = DeliveryError::Malformed(e).to_string();
            warn!(channel = handler.channel(), reason = %reason, "Discarding poison message");
            return Disposition::Discard { reason };
        }
    };

    match handler.deliver(envelope).await {
        Ok(Outcome::Delivered) => Disposition::Ack,
        Ok(Outcome::Skipped) => {
            info!(channel = handler.channel(), "Nothing to deliver, acknowledging");
            Disposition::Ack
        }
        Err(e) => {
            let reason = e.to_string();
            warn!(channel = handler.channel(), reason = %reason, "Delivery failed");
            Disposition::Fail { reason }
        }
    }
}

/// What happens to a message whose delivery failed. `Drop` replicates the
/// single-attempt-then-drop behavior; `DeadLetter` records the failure on the
/// named queue before the reject.
#[derive(Debug, Clone)]
pub enum FailurePolicy {
    Drop,
    DeadLetter { queue: String },
}

impl FailurePolicy {
    pub fn from_config(config: &Config) -> Self {
        match &config.dead_letter_queue_name {
            Some(queue) => FailurePolicy::DeadLetter {
                queue: queue.clone(),
            },
            None => FailurePolicy::Drop,
        }
    }
}

/// Drains the channel's queue until the consumer stream ends. One message is
/// in flight at a time; the next delivery arrives only after the current one
/// is acknowledged or rejected.
pub async fn run_worker<H: ChannelHandler>(
    broker: &RabbitMqClient,
    queue: &str,
    handler: &H,
    policy: &FailurePolicy,
) -> Result<(), Error> {
    let mut consumer = broker.create_consumer(queue, handler.channel()).await?;

    info!(queue = %queue, channel = handler.channel(), "Worker waiting for messages");

    while let Some(delivery) = consumer.next().await {
        let delivery = delivery?;

        match process_payload(handler, &delivery.data).await {
            Disposition::Ack => broker.acknowledge(delivery.delivery_tag).await?,
            Disposition::Discard { .. } => broker.reject(delivery.delivery_tag, false).await?,
            Disposition::Fail { reason } => {
                if let FailurePolicy::DeadLetter { queue: dead_letter } = policy {
                    let record = FailedDelivery {
                        channel: handler.channel().to_string(),
                        failure_reason: reason,
                        failed_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                        envelope: serde_json::from_slice(&delivery.data)
                            .unwrap_or(serde_json::Value::Null),
                    };

                    if let Err(e) = broker.publish_dead_letter(dead_letter, &record).await {
                        warn!(error = %e, queue = %dead_letter, "Failed to record dead letter");
                    }
                }

                broker.reject(delivery.delivery_tag, false).await?;
            }
        }
    }

    Ok(())
}
