//! Vendor Query Builder
//!
//! Translates a vendor category plus an event-request snapshot into a
//! `VendorQuery`. Pure and total: absent request fields give an unscoped query.

use event_planner_core::{BudgetTiers, EventRequest, VendorQuery};

#[derive(Debug, Clone, Copy, Default)]
pub struct VendorQueryBuilder {
    tiers: BudgetTiers,
}

impl VendorQueryBuilder {
    pub fn new(tiers: BudgetTiers) -> Self {
        Self { tiers }
    }

    pub fn build_query(&self, category: &str, request: &EventRequest) -> VendorQuery {
        VendorQuery {
            category: category.trim().to_string(),
            location: request.location.clone(),
            budget_hint: request
                .budget_tier(&self.tiers)
                .map(|tier| tier.vendor_hint().to_string()),
        }
    }
}

/// Build a query with the default budget tiers
pub fn build_query(category: &str, request: &EventRequest) -> VendorQuery {
    VendorQueryBuilder::default().build_query(category, request)
}
