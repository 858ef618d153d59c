use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

use crate::models::response::ApiResponse;

/// Gateway-side failures, surfaced synchronously to the caller.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Client-caused: a mandatory field is missing or the requested channel
    /// is not recognized. Nothing was enqueued.
    #[error("{0}")]
    Validation(String),

    /// The profile service returned no usable recipient. Lookup errors and
    /// genuine absence collapse into the same outcome.
    #[error("user not found")]
    RecipientNotFound,

    /// Broker or serialization failure. Nothing was enqueued.
    #[error("failed to queue message")]
    Queue(anyhow::Error),
}

impl DispatchError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DispatchError::Validation(_) => StatusCode::BAD_REQUEST,
            DispatchError::RecipientNotFound => StatusCode::NOT_FOUND,
            DispatchError::Queue(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ApiResponse::<()>::failure(self.to_string());
        (status, Json(body)).into_response()
    }
}

/// Worker-side failures. Only observable through logs and queue dispositions;
/// the original caller already got its 200.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Poison message: the queue payload does not decode. Retrying can never
    /// succeed, so the message is rejected without requeue.
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The envelope carries no usable delivery address for this channel.
    #[error("missing recipient address")]
    MissingAddress,

    /// The provider send call failed.
    #[error("provider send failed: {0}")]
    Send(anyhow::Error),
}
