//! Session Accumulator
//!
//! Holds the in-progress `EventRequest` of every session across turns. It is
//! the only component that mutates session state.
//!
//! States: `Collecting` → `Complete` → `Finalized`. `advance` moves between the
//! first two as slots fill; `finalize` produces the plan and retires the session.

use serde::Serialize;
use std::sync::Arc;

use event_planner_core::{
    CollectionState, Error, EventRequest, Plan, Result, SlotName, VendorQuery,
};
use event_planner_text_processing::SlotExtractor;

use crate::plan::PlanGenerator;
use crate::session::{SessionSnapshot, SessionStore};
use crate::vendor_query::VendorQueryBuilder;

/// Result of one `advance` call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvanceOutcome {
    pub session_key: String,
    pub turn: u64,
    pub updated_request: EventRequest,
    /// Absent slots in priority order
    pub missing_slots: Vec<SlotName>,
    pub is_complete: bool,
    pub state: CollectionState,
    /// Slots filled by this turn
    pub newly_filled: Vec<SlotName>,
}

/// Multi-turn slot accumulator
pub struct SessionAccumulator {
    extractor: SlotExtractor,
    planner: PlanGenerator,
    queries: VendorQueryBuilder,
    store: Arc<dyn SessionStore>,
}

impl SessionAccumulator {
    pub fn new(extractor: SlotExtractor, planner: PlanGenerator, store: Arc<dyn SessionStore>) -> Self {
        let queries = VendorQueryBuilder::new(*planner.tiers());
        Self {
            extractor,
            planner,
            queries,
            store,
        }
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn planner(&self) -> &PlanGenerator {
        &self.planner
    }

    pub fn extractor(&self) -> &SlotExtractor {
        &self.extractor
    }

    /// Process one user utterance for `session_key`
    ///
    /// Creates the session on first use. Utterances with no new information
    /// leave the request unchanged but still count as a turn.
    pub fn advance(&self, session_key: &str, utterance: &str) -> Result<AdvanceOutcome> {
        let handle = self.store.get_or_create(session_key)?;
        let mut record = handle.lock();

        if record.state.is_terminal() {
            return Err(Error::Session(format!(
                "Session {} is already finalized",
                session_key
            )));
        }

        let report = self.extractor.extract_with_report(utterance, &record.request);

        record.request = report.request;
        record.turn += 1;
        record.state = record.request.state();
        record.touch();

        let missing_slots = record.request.missing_slots();
        let outcome = AdvanceOutcome {
            session_key: session_key.to_string(),
            turn: record.turn,
            updated_request: record.request.clone(),
            is_complete: missing_slots.is_empty(),
            missing_slots,
            state: record.state,
            newly_filled: report.newly_filled,
        };
        drop(record);

        metrics::counter!("event_planner_turns_total").increment(1);
        for slot in &outcome.newly_filled {
            metrics::counter!("event_planner_slots_filled_total", "slot" => slot.as_str())
                .increment(1);
        }

        tracing::info!(
            session = %session_key,
            turn = outcome.turn,
            state = outcome.state.as_str(),
            filled = ?outcome.newly_filled,
            missing = ?outcome.missing_slots,
            "Advanced session"
        );

        Ok(outcome)
    }

    /// Current state of a session, if it exists
    pub fn snapshot(&self, session_key: &str) -> Option<SessionSnapshot> {
        self.store
            .get(session_key)
            .map(|handle| handle.lock().snapshot())
    }

    /// Discard a session; the next `advance` starts over
    pub fn reset(&self, session_key: &str) -> bool {
        self.store.remove(session_key)
    }

    /// Generate the plan for a complete session and retire it
    ///
    /// An incomplete session is left untouched and `PreconditionNotMet` is returned.
    pub fn finalize(&self, session_key: &str) -> Result<Plan> {
        let handle = self
            .store
            .get(session_key)
            .ok_or_else(|| Error::Session(format!("Unknown session: {}", session_key)))?;

        let plan = {
            let mut record = handle.lock();
            if record.state.is_terminal() {
                return Err(Error::Session(format!(
                    "Session {} is already finalized",
                    session_key
                )));
            }
            let plan = self.planner.generate_plan(&record.request)?;
            record.state = CollectionState::Finalized;
            record.touch();
            plan
        };

        self.store.remove(session_key);

        metrics::counter!("event_planner_plans_total", "event_type" => plan.event_type.clone())
            .increment(1);
        tracing::info!(
            session = %session_key,
            event_type = %plan.event_type,
            items = plan.items.len(),
            "Finalized session"
        );

        Ok(plan)
    }

    /// Vendor query for `category` scoped by what the session knows so far
    ///
    /// Unknown sessions give an unscoped query.
    pub fn vendor_query(&self, session_key: &str, category: &str) -> VendorQuery {
        match self.store.get(session_key) {
            Some(handle) => {
                let request = handle.lock().request.clone();
                self.queries.build_query(category, &request)
            }
            None => self.queries.build_query(category, &EventRequest::new()),
        }
    }

    pub fn query_builder(&self) -> &VendorQueryBuilder {
        &self.queries
    }
}
