//! MCP JSON-RPC endpoint
//!
//! Serves `initialize`, `ping`, `tools/list` and `tools/call` over a single
//! POST route. Notifications are acknowledged with 202 and no body.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use event_planner_tools::{
    methods, ErrorCode, InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
    ToolCallParams, ToolExecutor,
};

use crate::state::AppState;

/// Handle one JSON-RPC message
pub async fn handle_mcp_request(State(state): State<AppState>, body: Bytes) -> Response {
    let value: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            return Json(JsonRpcResponse::error(
                None,
                JsonRpcError::new(ErrorCode::ParseError, format!("Parse error: {}", e)),
            ))
            .into_response()
        },
    };

    let request: JsonRpcRequest = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(e) => {
            return Json(JsonRpcResponse::error(
                None,
                JsonRpcError::new(ErrorCode::InvalidRequest, format!("Invalid request: {}", e)),
            ))
            .into_response()
        },
    };

    if request.jsonrpc != "2.0" {
        return Json(JsonRpcResponse::error(
            request.id,
            JsonRpcError::new(ErrorCode::InvalidRequest, "jsonrpc must be \"2.0\""),
        ))
        .into_response();
    }

    if request.is_notification() {
        tracing::debug!(method = %request.method, "MCP notification");
        return StatusCode::ACCEPTED.into_response();
    }

    tracing::debug!(method = %request.method, "MCP request");
    let id = request.id.clone();
    let response = match dispatch(&state, request).await {
        Ok(result) => JsonRpcResponse::success(id, result),
        Err(error) => JsonRpcResponse::error(id, error),
    };

    Json(response).into_response()
}

async fn dispatch(state: &AppState, request: JsonRpcRequest) -> Result<Value, JsonRpcError> {
    match request.method.as_str() {
        methods::INITIALIZE => {
            let identity = state.get_config().identity.clone();
            let result = InitializeResult::new(identity.name, Some(identity.description));
            to_value(&result)
        },
        methods::PING => Ok(json!({})),
        methods::TOOLS_LIST => Ok(json!({ "tools": state.tools.list_tools() })),
        methods::TOOLS_CALL => {
            let params: ToolCallParams = request
                .params
                .ok_or_else(|| JsonRpcError::new(ErrorCode::InvalidParams, "params are required"))
                .and_then(|params| {
                    serde_json::from_value(params).map_err(|e| {
                        JsonRpcError::new(ErrorCode::InvalidParams, format!("Invalid params: {}", e))
                    })
                })?;

            let output = state.tools.execute(&params.name, params.arguments).await?;
            to_value(&output)
        },
        other => Err(JsonRpcError::new(
            ErrorCode::MethodNotFound,
            format!("Unknown method: {}", other),
        )),
    }
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, JsonRpcError> {
    serde_json::to_value(value)
        .map_err(|e| JsonRpcError::new(ErrorCode::InternalError, e.to_string()))
}
