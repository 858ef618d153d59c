use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use lapin::{
    BasicProperties, Channel, Connection, ConnectionProperties, Consumer,
    options::{
        BasicAckOptions, BasicConsumeOptions, BasicPublishOptions, BasicQosOptions,
        BasicRejectOptions, ConfirmSelectOptions, QueueDeclareOptions,
    },
    publisher_confirm::Confirmation,
    types::FieldTable,
};
use tracing::info;

use crate::{dispatch::EnvelopePublisher, models::envelope::FailedDelivery};

/// Broker adapter owning its connection and channel. Every process that
/// talks to the broker holds exactly one of these, injected at startup and
/// released through `close`.
pub struct RabbitMqClient {
    connection: Connection,
    channel: Channel,
}

impl RabbitMqClient {
    pub async fn connect(rabbitmq_url: &str) -> Result<Self, Error> {
        info!("Connecting to RabbitMQ");

        let connection = Connection::connect(rabbitmq_url, ConnectionProperties::default())
            .await
            .map_err(|e| anyhow!("Failed to connect to RabbitMQ: {}", e))?;

        let channel = connection
            .create_channel()
            .await
            .map_err(|e| anyhow!("RabbitMQ channel creation failed: {}", e))?;

        // One unacknowledged delivery per consumer: the broker hands out the
        // next message only after the current one is settled.
        channel
            .basic_qos(1, BasicQosOptions::default())
            .await
            .map_err(|e| anyhow!("Failed to set up QoS: {}", e))?;

        // Publisher confirms: a publish resolves only once the broker has
        // persisted the message.
        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await
            .map_err(|e| anyhow!("Failed to enable publisher confirms: {}", e))?;

        info!("RabbitMQ channel established");

        Ok(Self {
            connection,
            channel,
        })
    }

    /// Durable queue declare. Asserting a queue that already exists is a
    /// no-op.
    pub async fn declare_queue(&self, queue: &str) -> Result<(), Error> {
        self.channel
            .queue_declare(
                queue,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| anyhow!("Failed to declare queue {}: {}", queue, e))?;

        info!(queue = %queue, "Queue declared");

        Ok(())
    }

    pub async fn publish(&self, queue: &str, payload: &[u8]) -> Result<(), Error> {
        let confirmation = self
            .channel
            .basic_publish(
                "",
                queue,
                BasicPublishOptions::default(),
                payload,
                BasicProperties::default().with_delivery_mode(2),
            )
            .await
            .map_err(|e| anyhow!("Failed to publish to queue {}: {}", queue, e))?
            .await
            .map_err(|e| anyhow!("Publish confirmation failed for queue {}: {}", queue, e))?;

        if let Confirmation::Nack(_) = confirmation {
            return Err(anyhow!("Broker refused message for queue {}", queue));
        }

        Ok(())
    }

    pub async fn create_consumer(&self, queue: &str, consumer_tag: &str) -> Result<Consumer, Error> {
        let consumer = self
            .channel
            .basic_consume(
                queue,
                consumer_tag,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| anyhow!("Failed to create consumer for queue {}: {}", queue, e))?;

        info!(queue = %queue, consumer_tag = %consumer_tag, "Consumer created");

        Ok(consumer)
    }

    pub async fn acknowledge(&self, delivery_tag: u64) -> Result<(), Error> {
        self.channel
            .basic_ack(delivery_tag, BasicAckOptions::default())
            .await
            .map_err(|e| anyhow!("Failed to acknowledge message: {}", e))?;

        Ok(())
    }

    pub async fn reject(&self, delivery_tag: u64, requeue: bool) -> Result<(), Error> {
        self.channel
            .basic_reject(delivery_tag, BasicRejectOptions { requeue })
            .await
            .map_err(|e| anyhow!("Failed to reject message: {}", e))?;

        Ok(())
    }

    pub async fn publish_dead_letter(
        &self,
        queue: &str,
        record: &FailedDelivery,
    ) -> Result<(), Error> {
        let payload = serde_json::to_vec(record)?;
        self.publish(queue, &payload).await
    }

    pub async fn close(self) -> Result<(), Error> {
        self.connection
            .close(200, "shutdown")
            .await
            .map_err(|e| anyhow!("Failed to close RabbitMQ connection: {}", e))?;

        Ok(())
    }
}

#[async_trait]
impl EnvelopePublisher for RabbitMqClient {
    async fn publish(&self, queue: &str, payload: &[u8]) -> Result<(), Error> {
        RabbitMqClient::publish(self, queue, payload).await
    }
}
