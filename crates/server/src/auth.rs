//! Authentication Middleware
//!
//! Bearer token gate for the HTTP API and the MCP endpoint.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::state::AppState;

/// Warn about disabled auth once per process
static AUTH_DISABLED_WARNED: AtomicBool = AtomicBool::new(false);

/// What the middleware must do for a request
#[derive(Debug, PartialEq)]
enum AuthCheck {
    Disabled,
    PublicPath,
    ConfigError(&'static str),
    CheckToken(String),
}

/// Decide from the current settings; the config guard never crosses an await
fn check_auth_config(state: &AppState, path: &str) -> AuthCheck {
    let config = state.get_config();
    let auth = &config.server.auth;

    if !auth.enabled {
        if !AUTH_DISABLED_WARNED.swap(true, Ordering::Relaxed) {
            tracing::warn!(
                "API authentication is disabled. Set EVENT_PLANNER__SERVER__AUTH__ENABLED=true for production."
            );
        }
        return AuthCheck::Disabled;
    }

    if auth.public_paths.iter().any(|p| path.starts_with(p.as_str())) {
        return AuthCheck::PublicPath;
    }

    match &auth.token {
        Some(token) if !token.is_empty() => AuthCheck::CheckToken(token.clone()),
        _ => AuthCheck::ConfigError("Auth is enabled but no token is configured"),
    }
}

/// Require `Authorization: Bearer <token>` unless auth is off or the path is public
pub async fn auth_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();

    match check_auth_config(&state, &path) {
        AuthCheck::Disabled | AuthCheck::PublicPath => next.run(request).await,
        AuthCheck::ConfigError(msg) => {
            tracing::error!("{}", msg);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server authentication not configured")
                .into_response()
        },
        AuthCheck::CheckToken(expected) => {
            let provided = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            match provided.as_deref().map(|h| h.strip_prefix("Bearer ")) {
                Some(Some(token)) if constant_time_compare(token.as_bytes(), expected.as_bytes()) => {
                    next.run(request).await
                },
                Some(Some(_)) => {
                    tracing::warn!(path = %path, "Invalid bearer token");
                    (StatusCode::UNAUTHORIZED, "Invalid token").into_response()
                },
                Some(None) => (
                    StatusCode::BAD_REQUEST,
                    "Invalid Authorization header format. Expected: Bearer <token>",
                )
                    .into_response(),
                None => (StatusCode::UNAUTHORIZED, "Missing Authorization header").into_response(),
            }
        },
    }
}

/// Compare without an early exit on the first differing byte
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
