//! Event Planner Server
//!
//! Provides the REST API, the MCP JSON-RPC endpoint, health and metrics.

pub mod auth;
pub mod http;
pub mod mcp_server;
pub mod metrics;
pub mod session;
pub mod state;

pub use auth::auth_middleware;
pub use http::create_router;
pub use metrics::init_metrics;
pub use session::start_cleanup_task;
pub use state::AppState;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use event_planner_core::{Error as CoreError, SlotName};

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The session lacks slots needed for the operation
    #[error("{0}")]
    PreconditionNotMet(CoreError),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::PreconditionNotMet(_) => StatusCode::CONFLICT,
            ServerError::Session(_) => StatusCode::CONFLICT,
            ServerError::Search(_) => StatusCode::BAD_GATEWAY,
            ServerError::Configuration(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ServerError::NotFound(_) => "not_found",
            ServerError::InvalidRequest(_) => "invalid_request",
            ServerError::PreconditionNotMet(_) => "precondition_not_met",
            ServerError::Session(_) => "session",
            ServerError::Search(_) => "search",
            ServerError::Configuration(_) => "configuration",
            ServerError::Internal(_) => "internal",
        }
    }

    fn missing_slots(&self) -> Option<&[SlotName]> {
        match self {
            ServerError::PreconditionNotMet(CoreError::PreconditionNotMet { missing }) => {
                Some(missing)
            },
            _ => None,
        }
    }
}

impl From<CoreError> for ServerError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::PreconditionNotMet { .. } => ServerError::PreconditionNotMet(err),
            CoreError::Session(msg) => ServerError::Session(msg),
            CoreError::Search(msg) => ServerError::Search(msg),
            CoreError::Configuration(msg) => ServerError::Configuration(msg),
        }
    }
}

impl From<ServerError> for StatusCode {
    fn from(err: ServerError) -> Self {
        err.status()
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let mut body = serde_json::json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        if let Some(missing) = self.missing_slots() {
            body["missing_slots"] = serde_json::json!(missing);
        }

        (status, Json(body)).into_response()
    }
}
