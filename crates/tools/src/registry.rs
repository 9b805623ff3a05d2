//! Tool Registry
//!
//! Manages tool registration, discovery, and execution.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::mcp::{Tool, ToolError, ToolOutput, ToolSchema};
use crate::planner_tools::{
    AboutTool, AskForDetailsTool, FindVendorsTool, PlanEventTool, PlannerContext,
    StartEventPlanningTool, ValidateTool,
};

/// Tool executor trait
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Execute a tool by name
    async fn execute(&self, name: &str, arguments: Value) -> Result<ToolOutput, ToolError>;

    /// List available tools, sorted by name
    fn list_tools(&self) -> Vec<ToolSchema>;

    /// Get tool schema by name
    fn get_tool(&self, name: &str) -> Option<ToolSchema>;
}

/// Tool registry
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let name = tool.name().to_string();
        self.tools.insert(name, Arc::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tool names, sorted
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolExecutor for ToolRegistry {
    /// Validate arguments, then run the tool under its own timeout
    async fn execute(&self, name: &str, arguments: Value) -> Result<ToolOutput, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::not_found(format!("Tool not found: {}", name)))?;

        tool.validate(&arguments)?;

        let timeout_secs = tool.timeout_secs();
        let start = Instant::now();

        tracing::trace!(tool = name, timeout_secs, "Executing tool with timeout");

        let result = match tokio::time::timeout(
            Duration::from_secs(timeout_secs),
            tool.execute(arguments),
        )
        .await
        {
            Ok(result) => result,
            Err(_elapsed) => Err(ToolError::timeout(name, timeout_secs)),
        };

        match &result {
            Ok(_) => tracing::debug!(
                tool = name,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Tool call completed"
            ),
            Err(e) => tracing::warn!(
                tool = name,
                code = e.code.code(),
                error = %e.message,
                "Tool call failed"
            ),
        }

        result
    }

    fn list_tools(&self) -> Vec<ToolSchema> {
        let mut tools: Vec<ToolSchema> = self.tools.values().map(|t| t.schema()).collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    fn get_tool(&self, name: &str) -> Option<ToolSchema> {
        self.tools.get(name).map(|t| t.schema())
    }
}

/// Registry with every event planner tool
pub fn create_planner_registry(ctx: Arc<PlannerContext>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register(AboutTool::new(Arc::clone(&ctx)));
    registry.register(ValidateTool::new(Arc::clone(&ctx)));
    registry.register(StartEventPlanningTool::new(Arc::clone(&ctx)));
    registry.register(AskForDetailsTool::new(Arc::clone(&ctx)));
    registry.register(PlanEventTool::new(Arc::clone(&ctx)));
    registry.register(FindVendorsTool::new(ctx));

    tracing::info!(tool_count = registry.len(), "Created planner tool registry");

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::StubVendorSearch;
    use crate::mcp::{ErrorCode, InputSchema};
    use event_planner_agent::{InMemorySessionStore, PlanGenerator, SessionAccumulator};
    use event_planner_config::{IdentityConfig, ReferenceCatalogs};
    use event_planner_text_processing::SlotExtractor;
    use serde_json::json;

    fn registry() -> ToolRegistry {
        let extractor = SlotExtractor::new(Arc::new(ReferenceCatalogs::builtin().unwrap()));
        let accumulator = SessionAccumulator::new(
            extractor,
            PlanGenerator::builtin().unwrap(),
            Arc::new(InMemorySessionStore::new(10)),
        );
        let ctx = PlannerContext::new(
            Arc::new(accumulator),
            Arc::new(StubVendorSearch::new()),
            IdentityConfig::default(),
        );
        create_planner_registry(Arc::new(ctx))
    }

    struct SlowTool;

    #[async_trait]
    impl Tool for SlowTool {
        fn name(&self) -> &str {
            "slow"
        }

        fn description(&self) -> &str {
            "Sleeps past its timeout"
        }

        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: self.name().to_string(),
                description: self.description().to_string(),
                input_schema: InputSchema::object(),
            }
        }

        async fn execute(&self, _input: Value) -> Result<ToolOutput, ToolError> {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(ToolOutput::text("done"))
        }

        fn timeout_secs(&self) -> u64 {
            1
        }
    }

    #[test]
    fn test_planner_registry_lists_tools_sorted() {
        let registry = registry();
        let names: Vec<String> = registry.list_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "about",
                "ask_for_details",
                "find_vendors",
                "plan_event",
                "start_event_planning",
                "validate"
            ]
        );
        assert_eq!(registry.tool_names(), names);
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let err = registry().execute("book_venue", json!({})).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::MethodNotFound);
    }

    #[tokio::test]
    async fn test_arguments_validated_before_execution() {
        let err = registry()
            .execute("ask_for_details", json!({"session_id": "s1"}))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParams);
        assert_eq!(err.message, "user_input is required");
    }

    #[tokio::test]
    async fn test_validate_without_owner_number_fails() {
        let err = registry().execute("validate", json!({})).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InternalError);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tool_timeout() {
        let mut registry = ToolRegistry::new();
        registry.register(SlowTool);
        let err = registry.execute("slow", json!({})).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Timeout);
        assert_eq!(err.message, "Tool 'slow' timed out after 1s");
    }
}
