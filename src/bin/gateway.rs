use std::sync::Arc;

use anyhow::{Error, Result, anyhow};
use notify_dispatch::{
    api::{self, AppState},
    clients::{profile::ProfileClient, rbmq::RabbitMqClient},
    config::Config,
    dispatch::Dispatcher,
    init_tracing,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let config = Config::load()?;

    let broker = RabbitMqClient::connect(&config.rabbitmq_url).await?;
    broker.declare_queue(&config.email_queue_name).await?;
    broker.declare_queue(&config.push_queue_name).await?;
    if let Some(queue) = &config.dead_letter_queue_name {
        broker.declare_queue(queue).await?;
    }

    let profiles = ProfileClient::new(&config)?;
    let dispatcher = Dispatcher::new(Arc::new(broker), profiles, &config);
    let state = Arc::new(AppState { dispatcher });

    api::run_gateway(state, config.gateway_port)
        .await
        .map_err(|e| anyhow!("Gateway server failed: {}", e))?;

    Ok(())
}
