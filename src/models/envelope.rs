use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::request::Channel;

/// A channel-targeted, fully-addressed notification ready to enqueue. Built
/// only by the gateway; immutable once published. The tag and the variant
/// fields together form the queue wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "notification_type", rename_all = "lowercase")]
pub enum DispatchEnvelope {
    Email(EmailEnvelope),
    Push(PushEnvelope),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailEnvelope {
    pub request_id: String,
    pub user_id: String,
    pub template_code: String,

    #[serde(default)]
    pub variables: HashMap<String, serde_json::Value>,

    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushEnvelope {
    pub request_id: String,
    pub user_id: String,
    pub template_code: String,

    #[serde(default)]
    pub variables: HashMap<String, serde_json::Value>,

    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_token: Option<String>,
}

impl DispatchEnvelope {
    pub fn channel(&self) -> Channel {
        match self {
            DispatchEnvelope::Email(_) => Channel::Email,
            DispatchEnvelope::Push(_) => Channel::Push,
        }
    }

    pub fn request_id(&self) -> &str {
        match self {
            DispatchEnvelope::Email(envelope) => &envelope.request_id,
            DispatchEnvelope::Push(envelope) => &envelope.request_id,
        }
    }
}

/// Record published to the dead-letter queue when a worker runs under the
/// dead-letter failure policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedDelivery {
    pub channel: String,
    pub failure_reason: String,
    pub failed_at: String,
    pub envelope: serde_json::Value,
}
