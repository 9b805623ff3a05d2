//! HTTP Endpoints
//!
//! REST API for the event planner.

use axum::{
    extract::{Json, Path, State},
    http::{HeaderValue, Method, StatusCode},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use event_planner_agent::{prompts, SessionSnapshot};
use event_planner_core::{BudgetTier, EventRequest, Plan};
use event_planner_tools::{search_vendors, ToolExecutor};

use crate::auth::auth_middleware;
use crate::mcp_server::handle_mcp_request;
use crate::metrics::metrics_handler;
use crate::state::AppState;
use crate::ServerError;

const DEV_ORIGIN: &str = "http://localhost:3000";

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let (cors_layer, timeout) = {
        let config = state.get_config();
        (
            build_cors_layer(&config.server.cors_origins, config.server.cors_enabled),
            Duration::from_secs(config.server.timeout_seconds),
        )
    };

    Router::new()
        // Conversation
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:key", get(get_session).delete(delete_session))
        .route("/api/sessions/:key/messages", post(post_message))
        .route("/api/sessions/:key/plan", post(finalize_plan))
        .route("/api/sessions/:key/vendors", post(find_vendors))
        // Stateless planning
        .route("/api/plan", post(generate_plan))
        // Tool endpoints
        .route("/api/tools", get(list_tools))
        .route("/api/tools/:name", post(call_tool))
        // MCP JSON-RPC endpoint
        .route("/mcp", post(handle_mcp_request))
        // Health and metrics
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .layer(CompressionLayer::new())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - Disabled: permissive (development only)
/// - No valid origins: localhost:3000
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    let methods = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];

    if parsed_origins.is_empty() {
        tracing::info!("No valid CORS origins configured, defaulting to {}", DEV_ORIGIN);
        return CorsLayer::new()
            .allow_origin(HeaderValue::from_static(DEV_ORIGIN))
            .allow_methods(methods)
            .allow_headers(Any);
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods(methods)
        .allow_headers(Any)
}

/// Open a conversation with a fresh session key
async fn create_session() -> (StatusCode, Json<serde_json::Value>) {
    let key = uuid::Uuid::new_v4().to_string();
    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "session_key": key,
            "message": prompts::greeting(),
        })),
    )
}

async fn get_session(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<SessionSnapshot>, ServerError> {
    state
        .accumulator
        .snapshot(&key)
        .map(Json)
        .ok_or_else(|| ServerError::NotFound(format!("Unknown session: {}", key)))
}

async fn delete_session(State(state): State<AppState>, Path(key): Path<String>) -> StatusCode {
    state.accumulator.reset(&key);
    StatusCode::NO_CONTENT
}

#[derive(Debug, Deserialize)]
struct MessageRequest {
    message: String,
}

/// Process one user message
async fn post_message(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let outcome = state.accumulator.advance(&key, &request.message)?;
    let next_question = prompts::next_question(&outcome);

    Ok(Json(serde_json::json!({
        "session_key": outcome.session_key,
        "turn": outcome.turn,
        "updated_request": outcome.updated_request,
        "missing_slots": outcome.missing_slots,
        "is_complete": outcome.is_complete,
        "state": outcome.state,
        "newly_filled": outcome.newly_filled,
        "next_question": next_question,
    })))
}

/// Plan for a complete session; the session is retired afterwards
async fn finalize_plan(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Plan>, ServerError> {
    if state.accumulator.snapshot(&key).is_none() {
        return Err(ServerError::NotFound(format!("Unknown session: {}", key)));
    }
    Ok(Json(state.accumulator.finalize(&key)?))
}

#[derive(Debug, Deserialize)]
struct VendorSearchRequest {
    category: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    budget: Option<String>,
}

/// Vendor search scoped by the session
async fn find_vendors(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(request): Json<VendorSearchRequest>,
) -> Result<Json<serde_json::Value>, ServerError> {
    if request.category.trim().is_empty() {
        return Err(ServerError::InvalidRequest("category is required".to_string()));
    }

    let mut query = state.accumulator.vendor_query(&key, &request.category);
    if let Some(location) = request.location.filter(|l| !l.trim().is_empty()) {
        query.location = Some(location.trim().to_string());
    }
    if let Some(budget) = request.budget {
        let tier = BudgetTier::parse(&budget).ok_or_else(|| {
            ServerError::InvalidRequest("budget must be one of: low, moderate, high".to_string())
        })?;
        query.budget_hint = Some(tier.vendor_hint().to_string());
    }

    let vendors = search_vendors(state.search.as_ref(), &query)
        .await
        .map_err(|e| ServerError::Search(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "query": query.search_text(),
        "category": query.category,
        "location": query.location,
        "budget_hint": query.budget_hint,
        "vendors": vendors,
    })))
}

/// Plan from a complete request without a session
async fn generate_plan(
    State(state): State<AppState>,
    Json(request): Json<EventRequest>,
) -> Result<Json<Plan>, ServerError> {
    let request = state
        .accumulator
        .extractor()
        .catalogs()
        .canonicalize(&request)
        .map_err(ServerError::InvalidRequest)?;
    Ok(Json(state.accumulator.planner().generate_plan(&request)?))
}

/// List tools
async fn list_tools(State(state): State<AppState>) -> Json<serde_json::Value> {
    let tools: Vec<serde_json::Value> = state
        .tools
        .list_tools()
        .into_iter()
        .map(|t| {
            serde_json::json!({
                "name": t.name,
                "description": t.description,
                "input_schema": t.input_schema,
            })
        })
        .collect();

    Json(serde_json::json!({
        "tools": tools,
    }))
}

#[derive(Debug, Deserialize)]
struct ToolCallRequest {
    #[serde(default)]
    arguments: serde_json::Value,
}

/// Call tool
async fn call_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<ToolCallRequest>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    if state.tools.get_tool(&name).is_none() {
        return Err(StatusCode::NOT_FOUND);
    }

    match state.tools.execute(&name, request.arguments).await {
        Ok(output) => Ok(Json(serde_json::json!({
            "content": output.content,
            "structured": output.structured,
            "is_error": output.is_error,
        }))),
        Err(e) => {
            tracing::warn!(tool = %name, error = %e, "Tool error");
            Ok(Json(serde_json::json!({
                "content": [{ "type": "text", "text": e.message }],
                "error_code": e.code.code(),
                "data": e.data,
                "is_error": true,
            })))
        },
    }
}

/// Liveness with a summary of loaded state
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let catalogs = state.accumulator.extractor().catalogs();
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "checks": {
            "sessions": { "status": "ok", "count": state.sessions().count() },
            "tools": { "status": "ok", "count": state.tools.len() },
            "catalogs": {
                "status": "ok",
                "events": catalogs.events.len(),
                "locations": catalogs.locations.len(),
            },
            "search": { "status": "ok", "provider": state.search.provider() },
        }
    }))
}
