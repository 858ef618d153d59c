use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;

/// A notification delivery medium with its own queue, worker, and provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Push,
}

impl Channel {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "email" => Some(Channel::Email),
            "push" => Some(Channel::Push),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Push => "push",
        }
    }
}

/// Client-supplied dispatch request. Mandatory fields stay optional at the
/// serde layer so their absence surfaces as a 400, not a body-rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationRequest {
    #[serde(default)]
    pub notification_type: Option<String>,

    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(default)]
    pub template_code: Option<String>,

    #[serde(default)]
    pub variables: HashMap<String, serde_json::Value>,

    #[serde(default)]
    pub request_id: Option<String>,

    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// A request that passed validation: mandatory fields present and non-empty,
/// channel recognized.
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub channel: Channel,
    pub user_id: String,
    pub template_code: String,
    pub variables: HashMap<String, serde_json::Value>,
    pub request_id: Option<String>,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl NotificationRequest {
    pub fn validate(self) -> Result<ValidatedRequest, DispatchError> {
        let notification_type = non_empty(self.notification_type);
        let user_id = non_empty(self.user_id);
        let template_code = non_empty(self.template_code);

        let (Some(notification_type), Some(user_id), Some(template_code)) =
            (notification_type, user_id, template_code)
        else {
            return Err(DispatchError::Validation(
                "missing required fields".to_string(),
            ));
        };

        let channel = Channel::parse(&notification_type).ok_or_else(|| {
            DispatchError::Validation(format!(
                "unknown notification type '{}'",
                notification_type
            ))
        })?;

        Ok(ValidatedRequest {
            channel,
            user_id,
            template_code,
            variables: self.variables,
            request_id: self.request_id,
            metadata: self.metadata,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
