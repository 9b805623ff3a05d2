//! Plan Generator
//!
//! Turns a complete `EventRequest` into a `Plan`. Checklists come from the
//! plan templates keyed by event type; output is deterministic for identical
//! input.

use event_planner_config::PlanTemplatesConfig;
use event_planner_core::{format_inr, BudgetTiers, Error, EventRequest, Plan, PlanItem, Result};

/// Template-driven plan generator
#[derive(Debug, Clone)]
pub struct PlanGenerator {
    templates: PlanTemplatesConfig,
    tiers: BudgetTiers,
}

impl PlanGenerator {
    pub fn new(templates: PlanTemplatesConfig, tiers: BudgetTiers) -> Self {
        Self { templates, tiers }
    }

    /// Generator using the built-in templates and default tiers
    pub fn builtin() -> Result<Self> {
        Ok(Self::new(PlanTemplatesConfig::builtin()?, BudgetTiers::default()))
    }

    pub fn tiers(&self) -> &BudgetTiers {
        &self.tiers
    }

    /// Generate a plan for a complete request
    ///
    /// Returns `PreconditionNotMet` listing the absent slots when the request is incomplete.
    pub fn generate_plan(&self, request: &EventRequest) -> Result<Plan> {
        let (Some(event_type), Some(location), Some(guest_count), Some(budget_amount)) = (
            request.event_type.as_deref(),
            request.location.as_deref(),
            request.guest_count,
            request.budget_amount,
        ) else {
            return Err(Error::PreconditionNotMet {
                missing: request.missing_slots(),
            });
        };

        let template = self.templates.template_for(event_type);
        let items: Vec<PlanItem> = template
            .items_for(guest_count)
            .map(|item| PlanItem::new(&item.category, &item.description))
            .collect();
        let checklist = items.iter().map(PlanItem::to_checklist_line).collect();

        let budget_tier = self.tiers.tier_for(budget_amount);
        // guest_count > 0 is an EventRequest invariant
        let budget_per_guest = (budget_amount / f64::from(guest_count)).floor() as u64;

        let summary = format!(
            "{} in {} for {} guests with a {} budget of {} (about {} per guest).",
            event_type,
            location,
            guest_count,
            budget_tier,
            format_inr(budget_amount),
            format_inr(budget_per_guest as f64),
        );

        tracing::debug!(
            event_type,
            template = %template.name,
            items = items.len(),
            "Generated plan"
        );

        Ok(Plan {
            event_type: event_type.to_string(),
            location: location.to_string(),
            guest_count,
            budget_amount,
            budget_tier,
            budget_per_guest,
            summary,
            items,
            checklist,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use event_planner_core::{BudgetTier, SlotName};

    fn complete(event_type: &str, guests: u32, budget: f64) -> EventRequest {
        EventRequest {
            event_type: Some(event_type.into()),
            location: Some("Chennai, Tamil Nadu".into()),
            guest_count: Some(guests),
            budget_amount: Some(budget),
        }
    }

    #[test]
    fn test_wedding_plan() {
        let generator = PlanGenerator::builtin().unwrap();
        let plan = generator
            .generate_plan(&complete("Wedding", 200, 100_000.0))
            .unwrap();

        assert_eq!(plan.items.len(), 8);
        assert_eq!(plan.items[0].category, "Venue & Catering");
        assert_eq!(plan.budget_tier, BudgetTier::Moderate);
        assert_eq!(plan.budget_per_guest, 500);
        assert_eq!(
            plan.summary,
            "Wedding in Chennai, Tamil Nadu for 200 guests with a moderate budget of ₹1,00,000 (about ₹500 per guest)."
        );
        assert_eq!(
            plan.checklist[0],
            "Venue & Catering: Booking a suitable venue and caterer for the ceremony and reception."
        );
    }

    #[test]
    fn test_checklist_mirrors_items() {
        let generator = PlanGenerator::builtin().unwrap();
        let plan = generator
            .generate_plan(&complete("Birthday Party", 30, 20_000.0))
            .unwrap();
        assert_eq!(plan.items.len(), plan.checklist.len());
        for (item, line) in plan.items.iter().zip(&plan.checklist) {
            assert_eq!(line, &format!("{}: {}", item.category, item.description));
        }
        assert_eq!(plan.budget_tier, BudgetTier::Low);
    }

    #[test]
    fn test_unknown_event_type_uses_fallback() {
        let generator = PlanGenerator::builtin().unwrap();
        let plan = generator
            .generate_plan(&complete("Corporate Event", 80, 900_000.0))
            .unwrap();
        assert_eq!(plan.items[0].category, "General");
        assert_eq!(plan.budget_tier, BudgetTier::High);
    }

    #[test]
    fn test_incomplete_request_is_rejected() {
        let generator = PlanGenerator::builtin().unwrap();
        let request = EventRequest {
            event_type: Some("Wedding".into()),
            location: Some("Chennai, Tamil Nadu".into()),
            ..EventRequest::default()
        };
        let err = generator.generate_plan(&request).unwrap_err();
        assert_eq!(
            err,
            Error::PreconditionNotMet {
                missing: vec![SlotName::GuestCount, SlotName::BudgetAmount]
            }
        );
    }

    #[test]
    fn test_identical_requests_give_identical_checklists() {
        let generator = PlanGenerator::builtin().unwrap();
        let request = complete("Wedding", 450, 2_500_000.0);
        let first = generator.generate_plan(&request).unwrap();
        let second = generator.generate_plan(&request).unwrap();
        assert_eq!(first.checklist, second.checklist);
        assert_eq!(first, second);
    }

    #[test]
    fn test_large_guest_count_adds_gated_items() {
        let generator = PlanGenerator::builtin().unwrap();
        let small = generator.generate_plan(&complete("Wedding", 100, 1_000_000.0)).unwrap();
        let large = generator.generate_plan(&complete("Wedding", 400, 1_000_000.0)).unwrap();
        assert_eq!(small.items.len(), 7);
        assert_eq!(large.items.len(), 9);
        assert_eq!(large.items.last().unwrap().category, "Crowd Management");
    }
}
