use anyhow::{Error, Result, anyhow};
use notify_dispatch::{
    api,
    channels::push::PushChannel,
    clients::{fcm::FcmClient, rbmq::RabbitMqClient},
    config::Config,
    init_tracing,
    worker::{self, FailurePolicy},
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let config = Config::load()?;

    let broker = RabbitMqClient::connect(&config.rabbitmq_url).await?;
    broker.declare_queue(&config.push_queue_name).await?;
    if let Some(queue) = &config.dead_letter_queue_name {
        broker.declare_queue(queue).await?;
    }

    let handler = PushChannel::new(FcmClient::new(&config));
    let policy = FailurePolicy::from_config(&config);

    tokio::select! {
        result = worker::run_worker(&broker, &config.push_queue_name, &handler, &policy) => {
            result?;
        }
        result = api::run_health_server(config.push_service_port) => {
            result.map_err(|e| anyhow!("Health server failed: {}", e))?;
        }
    }

    broker.close().await?;

    Ok(())
}
