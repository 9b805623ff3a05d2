//! Plan output types

use serde::{Deserialize, Serialize};

use crate::event::BudgetTier;

/// One checklist entry of a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanItem {
    pub category: String,
    pub description: String,
}

impl PlanItem {
    pub fn new(category: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            description: description.into(),
        }
    }

    /// Single-line checklist rendering
    pub fn to_checklist_line(&self) -> String {
        format!("{}: {}", self.category, self.description)
    }
}

/// Event plan generated from a complete request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub event_type: String,
    pub location: String,
    pub guest_count: u32,
    pub budget_amount: f64,
    pub budget_tier: BudgetTier,
    /// Whole rupees available per guest
    pub budget_per_guest: u64,
    pub summary: String,
    pub items: Vec<PlanItem>,
    /// `items` rendered one line each, same order
    pub checklist: Vec<String>,
}
