use anyhow::{Error, Result, anyhow};
use dotenvy::dotenv;
use serde::Deserialize;

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    pub rabbitmq_url: String,

    #[serde(default = "default_email_queue")]
    pub email_queue_name: String,

    #[serde(default = "default_push_queue")]
    pub push_queue_name: String,

    /// When set, failed deliveries are recorded on this queue before the
    /// reject. Unset means reject-and-drop.
    #[serde(default)]
    pub dead_letter_queue_name: Option<String>,

    pub user_service_url: String,

    #[serde(default = "default_lookup_timeout")]
    pub user_lookup_timeout_seconds: u64,

    pub mail_api_url: String,
    pub mail_from_address: String,

    pub fcm_project_id: String,

    #[serde(default = "default_gateway_port")]
    pub gateway_port: u16,

    #[serde(default = "default_email_service_port")]
    pub email_service_port: u16,

    #[serde(default = "default_push_service_port")]
    pub push_service_port: u16,
}

fn default_email_queue() -> String {
    "email.queue".to_string()
}

fn default_push_queue() -> String {
    "push.queue".to_string()
}

fn default_lookup_timeout() -> u64 {
    5
}

fn default_gateway_port() -> u16 {
    3000
}

fn default_email_service_port() -> u16 {
    3001
}

fn default_push_service_port() -> u16 {
    3002
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        dotenv().ok();

        let config = envy::from_env::<Self>()
            .map_err(|e| anyhow!("Invalid or missing environmental variable: {}", e))?;
        Ok(config)
    }
}
