//! Event planner tools
//!
//! The conversation surface exposed over MCP: identity, session-driven slot
//! collection, plan generation and vendor search.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use event_planner_agent::{prompts, SessionAccumulator};
use event_planner_config::IdentityConfig;
use event_planner_core::{BudgetTier, EventRequest};

use crate::integrations::{search_vendors, VendorSearch};
use crate::mcp::{InputSchema, PropertySchema, Tool, ToolError, ToolOutput, ToolSchema};

/// Shared collaborators of the planner tools
pub struct PlannerContext {
    pub accumulator: Arc<SessionAccumulator>,
    pub search: Arc<dyn VendorSearch>,
    pub identity: IdentityConfig,
}

impl PlannerContext {
    pub fn new(
        accumulator: Arc<SessionAccumulator>,
        search: Arc<dyn VendorSearch>,
        identity: IdentityConfig,
    ) -> Self {
        Self {
            accumulator,
            search,
            identity,
        }
    }
}

fn str_arg<'a>(input: &'a Value, name: &str) -> Option<&'a str> {
    input
        .get(name)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn required_str<'a>(input: &'a Value, name: &str) -> Result<&'a str, ToolError> {
    str_arg(input, name).ok_or_else(|| ToolError::invalid_params(format!("{} is required", name)))
}

// ============================================================================
// about / validate
// ============================================================================

/// Service name and description
pub struct AboutTool {
    ctx: Arc<PlannerContext>,
}

impl AboutTool {
    pub fn new(ctx: Arc<PlannerContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for AboutTool {
    fn name(&self) -> &str {
        "about"
    }

    fn description(&self) -> &str {
        "Describe this event planning assistant"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: InputSchema::object(),
        }
    }

    async fn execute(&self, _input: Value) -> Result<ToolOutput, ToolError> {
        Ok(ToolOutput::json(json!({
            "name": self.ctx.identity.name,
            "description": self.ctx.identity.description,
        })))
    }

    fn timeout_secs(&self) -> u64 {
        5
    }
}

/// Owner phone number used by the hosting platform to verify the server
pub struct ValidateTool {
    ctx: Arc<PlannerContext>,
}

impl ValidateTool {
    pub fn new(ctx: Arc<PlannerContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for ValidateTool {
    fn name(&self) -> &str {
        "validate"
    }

    fn description(&self) -> &str {
        "Return the owner phone number of this server"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: InputSchema::object(),
        }
    }

    async fn execute(&self, _input: Value) -> Result<ToolOutput, ToolError> {
        let number = self
            .ctx
            .identity
            .owner_number
            .as_deref()
            .ok_or_else(|| ToolError::internal("Owner number is not configured"))?;
        Ok(ToolOutput::text(number))
    }

    fn timeout_secs(&self) -> u64 {
        5
    }
}

// ============================================================================
// Conversation
// ============================================================================

/// Open a conversation with the greeting
///
/// With a `session_id`, any earlier state of that session is discarded.
pub struct StartEventPlanningTool {
    ctx: Arc<PlannerContext>,
}

impl StartEventPlanningTool {
    pub fn new(ctx: Arc<PlannerContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for StartEventPlanningTool {
    fn name(&self) -> &str {
        "start_event_planning"
    }

    fn description(&self) -> &str {
        "Start planning a new event. Returns the opening question to show the user."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: InputSchema::object().property(
                "session_id",
                PropertySchema::string("Conversation id; an existing session with this id is reset"),
                false,
            ),
        }
    }

    async fn execute(&self, input: Value) -> Result<ToolOutput, ToolError> {
        if let Some(session_id) = str_arg(&input, "session_id") {
            if self.ctx.accumulator.reset(session_id) {
                tracing::debug!(session = %session_id, "Restarted event planning");
            }
        }
        Ok(ToolOutput::text(prompts::greeting()))
    }
}

/// Feed one user message into the session and ask for what is still missing
pub struct AskForDetailsTool {
    ctx: Arc<PlannerContext>,
}

impl AskForDetailsTool {
    pub fn new(ctx: Arc<PlannerContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for AskForDetailsTool {
    fn name(&self) -> &str {
        "ask_for_details"
    }

    fn description(&self) -> &str {
        "Process the user's latest message, update the event details of the session and return the next question"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: InputSchema::object()
                .property("session_id", PropertySchema::string("Conversation id"), true)
                .property(
                    "user_input",
                    PropertySchema::string("The user's latest message to process"),
                    true,
                ),
        }
    }

    async fn execute(&self, input: Value) -> Result<ToolOutput, ToolError> {
        let session_id = required_str(&input, "session_id")?;
        // An empty message is a valid turn with nothing to extract
        let user_input = input
            .get("user_input")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::invalid_params("user_input is required"))?;

        let outcome = self.ctx.accumulator.advance(session_id, user_input)?;
        let next_question = prompts::next_question(&outcome);

        Ok(ToolOutput::json(json!({
            "session_id": outcome.session_key,
            "turn": outcome.turn,
            "event_details": outcome.updated_request,
            "missing_slots": outcome.missing_slots,
            "is_complete": outcome.is_complete,
            "next_question": next_question,
        })))
    }
}

/// Produce the checklist plan for a complete session
pub struct PlanEventTool {
    ctx: Arc<PlannerContext>,
}

impl PlanEventTool {
    pub fn new(ctx: Arc<PlannerContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for PlanEventTool {
    fn name(&self) -> &str {
        "plan_event"
    }

    fn description(&self) -> &str {
        "Create a personalized checklist plan once all event details are known. \
         Pass session_id, or event_details for a one-off plan."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: InputSchema::object()
                .property("session_id", PropertySchema::string("Conversation id"), false)
                .property(
                    "event_details",
                    PropertySchema::object(
                        "Complete event details: event_type, location, guest_count, budget_amount",
                    ),
                    false,
                ),
        }
    }

    async fn execute(&self, input: Value) -> Result<ToolOutput, ToolError> {
        let plan = match (str_arg(&input, "session_id"), input.get("event_details")) {
            (Some(session_id), _) => self.ctx.accumulator.finalize(session_id)?,
            (None, Some(details)) if !details.is_null() => {
                let request: EventRequest = serde_json::from_value(details.clone())
                    .map_err(|e| ToolError::invalid_params(format!("Invalid event_details: {}", e)))?;
                let request = self
                    .ctx
                    .accumulator
                    .extractor()
                    .catalogs()
                    .canonicalize(&request)
                    .map_err(ToolError::invalid_params)?;
                self.ctx.accumulator.planner().generate_plan(&request)?
            },
            _ => {
                return Err(ToolError::invalid_params(
                    "session_id or event_details is required",
                ))
            },
        };

        let value = serde_json::to_value(&plan)
            .map_err(|e| ToolError::internal(format!("Failed to serialize plan: {}", e)))?;
        Ok(ToolOutput::json(value))
    }
}

/// Search vendors for one category of the plan
pub struct FindVendorsTool {
    ctx: Arc<PlannerContext>,
}

impl FindVendorsTool {
    pub fn new(ctx: Arc<PlannerContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for FindVendorsTool {
    fn name(&self) -> &str {
        "find_vendors"
    }

    fn description(&self) -> &str {
        "Search for and recommend vendors for a category, scoped by the session's location and budget"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: InputSchema::object()
                .property(
                    "category",
                    PropertySchema::string("Vendor category, e.g. 'Wedding Photographer'"),
                    true,
                )
                .property(
                    "session_id",
                    PropertySchema::string("Conversation id to take location and budget from"),
                    false,
                )
                .property(
                    "location",
                    PropertySchema::string("Location for the search, e.g. 'Tiruchirappalli, Tamil Nadu'"),
                    false,
                )
                .property(
                    "budget",
                    PropertySchema::enum_type(
                        "Budget range for vendors",
                        vec!["low".into(), "moderate".into(), "high".into()],
                    ),
                    false,
                ),
        }
    }

    async fn execute(&self, input: Value) -> Result<ToolOutput, ToolError> {
        let category = required_str(&input, "category")?;

        let mut query = match str_arg(&input, "session_id") {
            Some(session_id) => self.ctx.accumulator.vendor_query(session_id, category),
            None => self
                .ctx
                .accumulator
                .query_builder()
                .build_query(category, &EventRequest::new()),
        };

        // Explicit arguments override what the session knows
        if let Some(location) = str_arg(&input, "location") {
            query.location = Some(location.to_string());
        }
        if let Some(budget) = str_arg(&input, "budget") {
            let tier = BudgetTier::parse(budget).ok_or_else(|| {
                ToolError::invalid_params("budget must be one of: low, moderate, high")
            })?;
            query.budget_hint = Some(tier.vendor_hint().to_string());
        }

        let vendors = search_vendors(self.ctx.search.as_ref(), &query).await?;

        Ok(ToolOutput::json(json!({
            "query": query.search_text(),
            "category": query.category,
            "location": query.location,
            "vendors": vendors,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::StubVendorSearch;
    use crate::mcp::ErrorCode;
    use event_planner_agent::{InMemorySessionStore, PlanGenerator};
    use event_planner_config::ReferenceCatalogs;
    use event_planner_text_processing::SlotExtractor;

    fn context_with(search: Arc<dyn VendorSearch>) -> Arc<PlannerContext> {
        let extractor = SlotExtractor::new(Arc::new(ReferenceCatalogs::builtin().unwrap()));
        let accumulator = SessionAccumulator::new(
            extractor,
            PlanGenerator::builtin().unwrap(),
            Arc::new(InMemorySessionStore::new(100)),
        );
        let identity = IdentityConfig {
            owner_number: Some("919876543210".into()),
            ..IdentityConfig::default()
        };
        Arc::new(PlannerContext::new(Arc::new(accumulator), search, identity))
    }

    fn context() -> Arc<PlannerContext> {
        context_with(Arc::new(StubVendorSearch::new()))
    }

    fn structured(output: &ToolOutput) -> &Value {
        output.structured.as_ref().unwrap()
    }

    #[tokio::test]
    async fn test_validate_returns_owner_number() {
        let output = ValidateTool::new(context()).execute(json!({})).await.unwrap();
        assert_eq!(output.first_text(), Some("919876543210"));
    }

    #[tokio::test]
    async fn test_start_returns_greeting() {
        let tool = StartEventPlanningTool::new(context());
        let output = tool.execute(json!({})).await.unwrap();
        assert_eq!(output.first_text(), Some(prompts::GREETING));
    }

    #[tokio::test]
    async fn test_ask_for_details_tracks_session() {
        let ctx = context();
        let tool = AskForDetailsTool::new(Arc::clone(&ctx));

        let first = tool
            .execute(json!({"session_id": "s1", "user_input": "I want to plan a wedding in Chennai"}))
            .await
            .unwrap();
        let first = structured(&first);
        assert_eq!(first["event_details"]["event_type"], "Wedding");
        assert_eq!(first["missing_slots"], json!(["guest_count", "budget_amount"]));
        assert_eq!(
            first["next_question"],
            "And about how many guests will be attending? Please provide a number."
        );

        let second = tool
            .execute(json!({"session_id": "s1", "user_input": "200 guests, budget 1 lakh"}))
            .await
            .unwrap();
        let second = structured(&second);
        assert_eq!(second["is_complete"], true);
        assert_eq!(second["next_question"], prompts::COMPLETE);
    }

    #[tokio::test]
    async fn test_start_resets_session() {
        let ctx = context();
        let ask = AskForDetailsTool::new(Arc::clone(&ctx));
        ask.execute(json!({"session_id": "s1", "user_input": "wedding"}))
            .await
            .unwrap();

        StartEventPlanningTool::new(Arc::clone(&ctx))
            .execute(json!({"session_id": "s1"}))
            .await
            .unwrap();
        assert!(ctx.accumulator.snapshot("s1").is_none());
    }

    #[tokio::test]
    async fn test_plan_event_needs_complete_session() {
        let ctx = context();
        AskForDetailsTool::new(Arc::clone(&ctx))
            .execute(json!({"session_id": "s1", "user_input": "birthday in Pune"}))
            .await
            .unwrap();

        let err = PlanEventTool::new(Arc::clone(&ctx))
            .execute(json!({"session_id": "s1"}))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PreconditionFailed);
        assert_eq!(
            err.data.unwrap()["missing_slots"],
            json!(["guest_count", "budget_amount"])
        );
    }

    #[tokio::test]
    async fn test_plan_event_from_details() {
        let output = PlanEventTool::new(context())
            .execute(json!({"event_details": {
                "event_type": "Birthday Party",
                "location": "Pune, Maharashtra",
                "guest_count": 40,
                "budget_amount": 60000.0
            }}))
            .await
            .unwrap();
        let plan = structured(&output);
        assert_eq!(plan["event_type"], "Birthday Party");
        assert_eq!(plan["checklist"][0], "Venue & Decor: Booking a party hall and setting up theme-based decorations.");
    }

    #[tokio::test]
    async fn test_plan_event_rejects_unknown_event_type() {
        let err = PlanEventTool::new(context())
            .execute(json!({"event_details": {
                "event_type": "Moon Landing",
                "location": "Pune, Maharashtra",
                "guest_count": 40,
                "budget_amount": 60000.0
            }}))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParams);
        assert!(err.message.contains("Moon Landing"));
    }

    #[tokio::test]
    async fn test_plan_event_without_arguments() {
        let err = PlanEventTool::new(context()).execute(json!({})).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParams);
    }

    #[tokio::test]
    async fn test_find_vendors_uses_session_scope() {
        let ctx = context();
        AskForDetailsTool::new(Arc::clone(&ctx))
            .execute(json!({"session_id": "s1", "user_input": "wedding in Trichy with a budget of 30k"}))
            .await
            .unwrap();

        let output = FindVendorsTool::new(Arc::clone(&ctx))
            .execute(json!({"category": "Wedding Photographer", "session_id": "s1"}))
            .await
            .unwrap();
        let result = structured(&output);
        assert_eq!(
            result["query"],
            "affordable Wedding Photographer in Tiruchirappalli, Tamil Nadu reviews"
        );
        assert_eq!(result["vendors"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_find_vendors_explicit_arguments() {
        let output = FindVendorsTool::new(context())
            .execute(json!({"category": "Caterer", "location": "Goa", "budget": "high"}))
            .await
            .unwrap();
        assert_eq!(structured(&output)["query"], "luxury Caterer in Goa reviews");
    }

    #[tokio::test]
    async fn test_find_vendors_reports_search_failure() {
        let ctx = context_with(Arc::new(StubVendorSearch::failing("connection refused")));
        let err = FindVendorsTool::new(ctx)
            .execute(json!({"category": "Caterer"}))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InternalError);
        assert!(err.message.contains("connection refused"));
    }
}
