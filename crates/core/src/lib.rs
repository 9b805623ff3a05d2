//! Core types for the event planner assistant
//!
//! This crate provides the types shared by every other crate:
//! - The per-session event request and its slots
//! - Plans and checklist items
//! - Vendor queries and results
//! - Amount handling (range policy, INR formatting)
//! - Error types

pub mod amount;
pub mod error;
pub mod event;
pub mod plan;
pub mod vendor;

pub use amount::{format_inr, RangePolicy};
pub use error::{Error, Result};
pub use event::{BudgetTier, BudgetTiers, CollectionState, EventRequest, SlotName, BUDGET_CURRENCY};
pub use plan::{Plan, PlanItem};
pub use vendor::{VendorQuery, VendorResult};
