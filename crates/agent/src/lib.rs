//! Conversational core of the event planner
//!
//! - `session`: session store trait and in-memory implementation
//! - `accumulator`: multi-turn slot accumulation (`advance`, `finalize`)
//! - `plan`: template-driven plan generation
//! - `vendor_query`: vendor search queries from session state
//! - `prompts`: greeting and next-question wording

pub mod accumulator;
pub mod plan;
pub mod prompts;
pub mod session;
pub mod vendor_query;

pub use accumulator::{AdvanceOutcome, SessionAccumulator};
pub use plan::PlanGenerator;
pub use prompts::{greeting, next_question, question_for};
pub use session::{
    InMemorySessionStore, SessionHandle, SessionRecord, SessionSnapshot, SessionStore,
};
pub use vendor_query::{build_query, VendorQueryBuilder};
