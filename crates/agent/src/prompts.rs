//! Conversation prompts
//!
//! Fixed wording for the greeting and for the question asked about the first
//! missing slot.

use event_planner_core::{EventRequest, SlotName};

use crate::accumulator::AdvanceOutcome;

pub const GREETING: &str = "👋 Namaste! I am your personal Event Planner AI. Let's plan your perfect event! \
First, what kind of event are you planning? (e.g., Wedding, Birthday, Festival Party)";

pub const COMPLETE: &str =
    "Thank you! I have all the details. I will now create a personalized plan for you.";

/// Opening message of a conversation
pub fn greeting() -> &'static str {
    GREETING
}

/// Question for `slot`, phrased with what is already known
pub fn question_for(slot: SlotName, request: &EventRequest) -> String {
    match slot {
        SlotName::EventType => {
            "What kind of event are you planning? (e.g., Wedding, Birthday, or a Festival like Diwali)"
                .to_string()
        }
        SlotName::Location => match request.event_type.as_deref() {
            Some(event_type) => format!("Got it, a {}. Where will this event be held?", event_type),
            None => "Where will this event be held?".to_string(),
        },
        SlotName::GuestCount => {
            "And about how many guests will be attending? Please provide a number.".to_string()
        }
        SlotName::BudgetAmount => {
            "To help me plan, what's your budget like? (e.g., a specific amount like 50k, 1 lakh or 2.5 crore)"
                .to_string()
        }
    }
}

/// Next message after a turn: the question for the first missing slot, or the completion notice
pub fn next_question(outcome: &AdvanceOutcome) -> String {
    match outcome.missing_slots.first() {
        Some(slot) => question_for(*slot, &outcome.updated_request),
        None => COMPLETE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_question_mentions_event() {
        let request = EventRequest {
            event_type: Some("Wedding".into()),
            ..EventRequest::default()
        };
        assert_eq!(
            question_for(SlotName::Location, &request),
            "Got it, a Wedding. Where will this event be held?"
        );
        assert_eq!(
            question_for(SlotName::Location, &EventRequest::new()),
            "Where will this event be held?"
        );
    }

    #[test]
    fn test_greeting_asks_for_event_type() {
        assert!(greeting().starts_with("👋 Namaste!"));
        assert!(greeting().contains("what kind of event"));
    }
}
