//! MCP Tools for the event planner
//!
//! Implements an MCP (Model Context Protocol) compatible tool interface over
//! the session accumulator, the plan generator and the vendor search
//! collaborator.

pub mod integrations;
pub mod mcp;
pub mod planner_tools;
pub mod registry;

pub use integrations::{
    create_vendor_search, parse_search_results, search_vendors, IntegrationError, SerpApiSearch,
    StubVendorSearch, VendorSearch,
};
pub use mcp::{
    methods, ContentBlock, ErrorCode, InitializeResult, InputSchema, JsonRpcError,
    JsonRpcRequest, JsonRpcResponse, PropertySchema, RequestId, ServerCapabilities, ServerInfo,
    Tool, ToolCallParams, ToolCapabilities, ToolError, ToolOutput, ToolSchema, PROTOCOL_VERSION,
};
pub use planner_tools::{
    AboutTool, AskForDetailsTool, FindVendorsTool, PlanEventTool, PlannerContext,
    StartEventPlanningTool, ValidateTool,
};
pub use registry::{create_planner_registry, ToolExecutor, ToolRegistry};
