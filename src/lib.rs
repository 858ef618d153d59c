//! Asynchronous notification dispatch pipeline: an HTTP gateway that fans
//! requests out onto durable channel queues, and per-channel workers that
//! render templates and invoke delivery providers.

use tracing_subscriber::EnvFilter;

pub mod api;
pub mod channels;
pub mod clients;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod models;
pub mod templates;
pub mod worker;

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();
}
