//! Slot Extractor
//!
//! Scans a free-form utterance against the reference catalogs and the phrase
//! normalizer and merges what it finds into an `EventRequest`.
//!
//! Extraction is a pure transform: a slot is only written when it is absent in
//! the input request, so the first mention across turns wins.
//!
//! ## Number disambiguation
//!
//! Each numeric mention is classified by the words around it:
//! - guest cues ("200 guests", "headcount 150") mark a guest count
//! - budget cues ("budget 50000", "30000 rupees"), a currency marker or a
//!   magnitude word ("1 lakh") mark a budget
//! - numbers followed by a non-slot unit ("3 days", "10 pm") are ignored
//!
//! Cued mentions are assigned first. Remaining bare numbers fill the earliest
//! still-missing numeric slot in priority order.

use std::sync::Arc;

use event_planner_config::{ExtractionConfig, ReferenceCatalogs};
use event_planner_core::{EventRequest, SlotName};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::amount::{AmountMention, AmountNormalizer};

// =============================================================================
// STATIC REGEX PATTERNS - Compiled once at program start
// =============================================================================

static GUEST_CUE_AFTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:guests?|people|persons?|pax|attendees?|members?|log|invitees?|heads?)\b")
        .unwrap()
});

static GUEST_CUE_BEFORE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:guest\s+count|guests?|head\s*count|number\s+of\s+people)(?:\s*(?:is|are|of|will\s+be|would\s+be|around|about|approx(?:imately)?|:|=|-))*\s*$",
    )
    .unwrap()
});

static BUDGET_CUE_AFTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:rupees?|rupaye|rs\b\.?|inr\b|budget\b)").unwrap()
});

static BUDGET_CUE_BEFORE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:budget|rupees|spend|spending|cost|costs|afford)(?:\s*(?:is|of|will\s+be|would\s+be|around|about|approx(?:imately)?|upto|up\s+to|under|below|within|max(?:imum)?|:|=|-))*\s*$",
    )
    .unwrap()
});

const MONTHS: &str = "jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";

static NON_SLOT_UNIT_AFTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^\s*-?\s*(?:%|percent\b|days?\b|nights?\b|weeks?\b|months?\b|years?\b|yrs?\b|hours?\b|hrs?\b|minutes?\b|mins?\b|am\b|pm\b|a\.m\.|p\.m\.|o'?clock\b|st\b|nd\b|rd\b|th\b|kg\b|kgs\b|km\b|dates?\b|(?:{months})\b)",
        months = MONTHS,
    ))
    .unwrap()
});

/// Month name, optionally followed by a day of month ("March", "Dec 5,")
static MONTH_BEFORE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:{months})\.?\s*(?:\d{{1,2}}(?:st|nd|rd|th)?\s*,?\s*)?$",
        months = MONTHS,
    ))
    .unwrap()
});

/// How a numeric mention was classified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberCue {
    Guests,
    Budget,
    /// No adjacent cue; assigned by slot priority
    Bare,
}

/// Bounds applied to extracted numbers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractionLimits {
    pub max_guest_count: u32,
    pub max_budget: f64,
}

impl Default for ExtractionLimits {
    fn default() -> Self {
        let config = ExtractionConfig::default();
        Self {
            max_guest_count: config.max_guest_count,
            max_budget: config.max_budget,
        }
    }
}

/// Result of one extraction pass
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionReport {
    /// Input request merged with the new values
    pub request: EventRequest,
    /// Slots written by this pass, in priority order
    pub newly_filled: Vec<SlotName>,
}

/// Slot extractor for event-planning utterances
///
/// Catalogs are shared read-only; the extractor itself holds no per-session state.
#[derive(Debug, Clone)]
pub struct SlotExtractor {
    catalogs: Arc<ReferenceCatalogs>,
    normalizer: AmountNormalizer,
    limits: ExtractionLimits,
}

impl SlotExtractor {
    /// Create an extractor with default limits and range policy
    pub fn new(catalogs: Arc<ReferenceCatalogs>) -> Self {
        Self {
            catalogs,
            normalizer: AmountNormalizer::default(),
            limits: ExtractionLimits::default(),
        }
    }

    /// Create an extractor from the `extraction` settings section
    pub fn from_config(catalogs: Arc<ReferenceCatalogs>, config: &ExtractionConfig) -> Self {
        Self {
            catalogs,
            normalizer: AmountNormalizer::new(config.range_policy),
            limits: ExtractionLimits {
                max_guest_count: config.max_guest_count,
                max_budget: config.max_budget,
            },
        }
    }

    pub fn catalogs(&self) -> &ReferenceCatalogs {
        &self.catalogs
    }

    pub fn normalizer(&self) -> &AmountNormalizer {
        &self.normalizer
    }

    /// Merge slots found in `utterance` into a copy of `request`
    pub fn extract(&self, utterance: &str, request: &EventRequest) -> EventRequest {
        self.extract_with_report(utterance, request).request
    }

    /// Like `extract`, also reporting which slots were newly filled
    pub fn extract_with_report(&self, utterance: &str, request: &EventRequest) -> ExtractionReport {
        let mut merged = request.clone();

        if utterance.trim().is_empty() {
            return ExtractionReport {
                request: merged,
                newly_filled: Vec::new(),
            };
        }

        if merged.event_type.is_none() {
            if let Some(found) = self.catalogs.events.find(utterance) {
                merged.fill_event_type(found.canonical_name);
                tracing::debug!(event_type = found.canonical_name, keyword = found.keyword, "Matched event type");
            }
        }

        if merged.location.is_none() {
            if let Some(found) = self.catalogs.locations.find(utterance) {
                merged.fill_location(found.canonical_name);
                tracing::debug!(location = found.canonical_name, keyword = found.keyword, "Matched location");
            }
        }

        if merged.guest_count.is_none() || merged.budget_amount.is_none() {
            self.extract_numbers(utterance, &mut merged);
        }

        let newly_filled = SlotName::ALL
            .iter()
            .copied()
            .filter(|slot| !request.is_filled(*slot) && merged.is_filled(*slot))
            .collect();

        ExtractionReport {
            request: merged,
            newly_filled,
        }
    }

    fn extract_numbers(&self, utterance: &str, request: &mut EventRequest) {
        let classified: Vec<(AmountMention, NumberCue)> = self
            .normalizer
            .scan(utterance)
            .into_iter()
            .filter(|m| !NON_SLOT_UNIT_AFTER.is_match(&utterance[m.end..]))
            .filter(|m| !is_date_after_month(utterance, m))
            .map(|m| {
                let cue = classify(utterance, &m);
                (m, cue)
            })
            .collect();

        for (mention, cue) in &classified {
            match cue {
                NumberCue::Guests => {
                    self.try_fill(request, SlotName::GuestCount, mention);
                }
                NumberCue::Budget => {
                    self.try_fill(request, SlotName::BudgetAmount, mention);
                }
                NumberCue::Bare => {}
            }
        }

        for (mention, _) in classified.iter().filter(|(_, cue)| *cue == NumberCue::Bare) {
            for slot in [SlotName::GuestCount, SlotName::BudgetAmount] {
                if self.try_fill(request, slot, mention) {
                    break;
                }
            }
        }
    }

    /// Write `mention` into `slot` if absent and within limits
    fn try_fill(&self, request: &mut EventRequest, slot: SlotName, mention: &AmountMention) -> bool {
        if request.is_filled(slot) {
            return false;
        }

        match slot {
            SlotName::GuestCount => match self.guest_count(mention) {
                Some(count) => request.fill_guest_count(count),
                None => false,
            },
            SlotName::BudgetAmount => {
                let amount = mention.value;
                if !amount.is_finite() || amount < 0.0 || amount > self.limits.max_budget {
                    tracing::debug!(amount, "Dropping out-of-range budget");
                    return false;
                }
                request.fill_budget_amount(amount)
            }
            SlotName::EventType | SlotName::Location => false,
        }
    }

    fn guest_count(&self, mention: &AmountMention) -> Option<u32> {
        let value = if mention.is_range {
            mention.value.floor()
        } else {
            mention.value
        };

        if value.fract() != 0.0 || value < 1.0 || value > f64::from(self.limits.max_guest_count) {
            tracing::debug!(value, "Dropping out-of-range guest count");
            return None;
        }
        Some(value as u32)
    }
}

/// A day of month or a year written after a month name ("March 15", "March 2026")
fn is_date_after_month(utterance: &str, mention: &AmountMention) -> bool {
    if mention.is_range || mention.has_magnitude || mention.has_currency || !mention.is_whole() {
        return false;
    }
    let after = &utterance[mention.end..];
    if GUEST_CUE_AFTER.is_match(after) || BUDGET_CUE_AFTER.is_match(after) {
        return false;
    }
    let is_day = (1.0..=31.0).contains(&mention.value);
    let is_year = (1900.0..=2099.0).contains(&mention.value);
    (is_day || is_year) && MONTH_BEFORE.is_match(&utterance[..mention.start])
}

fn classify(utterance: &str, mention: &AmountMention) -> NumberCue {
    let before = &utterance[..mention.start];
    let after = &utterance[mention.end..];

    if GUEST_CUE_AFTER.is_match(after) {
        return NumberCue::Guests;
    }
    if BUDGET_CUE_AFTER.is_match(after) || BUDGET_CUE_BEFORE.is_match(before) {
        return NumberCue::Budget;
    }
    if GUEST_CUE_BEFORE.is_match(before) {
        return NumberCue::Guests;
    }
    if mention.has_magnitude || mention.has_currency {
        return NumberCue::Budget;
    }
    NumberCue::Bare
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> SlotExtractor {
        SlotExtractor::new(Arc::new(ReferenceCatalogs::builtin().unwrap()))
    }

    fn extract(utterance: &str) -> EventRequest {
        extractor().extract(utterance, &EventRequest::new())
    }

    #[test]
    fn test_event_type_from_keyword() {
        assert_eq!(extract("planning a shaadi").event_type.as_deref(), Some("Wedding"));
        assert_eq!(
            extract("a small bday party").event_type.as_deref(),
            Some("Birthday Party")
        );
    }

    #[test]
    fn test_event_and_location_together() {
        let request = extract("I want to plan a wedding in Chennai");
        assert_eq!(request.event_type.as_deref(), Some("Wedding"));
        assert_eq!(request.location.as_deref(), Some("Chennai, Tamil Nadu"));
        assert_eq!(request.guest_count, None);
        assert_eq!(request.budget_amount, None);
    }

    #[test]
    fn test_cued_numbers() {
        let request = extract("about 200 guests and the budget is 1 lakh");
        assert_eq!(request.guest_count, Some(200));
        assert_eq!(request.budget_amount, Some(100_000.0));

        // Cue order does not matter
        let request = extract("budget 75000 for 120 people");
        assert_eq!(request.guest_count, Some(120));
        assert_eq!(request.budget_amount, Some(75_000.0));

        let request = extract("guest count is 350");
        assert_eq!(request.guest_count, Some(350));
        assert_eq!(request.budget_amount, None);
    }

    #[test]
    fn test_magnitude_marks_budget() {
        let request = extract("around 5 lakh");
        assert_eq!(request.budget_amount, Some(500_000.0));
        assert_eq!(request.guest_count, None);

        let request = extract("₹80,000");
        assert_eq!(request.budget_amount, Some(80_000.0));
    }

    #[test]
    fn test_bare_number_fills_by_priority() {
        let request = extract("200");
        assert_eq!(request.guest_count, Some(200));
        assert_eq!(request.budget_amount, None);

        let with_guests = EventRequest {
            guest_count: Some(200),
            ..EventRequest::default()
        };
        let request = extractor().extract("60000", &with_guests);
        assert_eq!(request.guest_count, Some(200));
        assert_eq!(request.budget_amount, Some(60_000.0));
    }

    #[test]
    fn test_fractional_bare_number_skips_guests() {
        let request = extract("2.5");
        assert_eq!(request.guest_count, None);
        assert_eq!(request.budget_amount, Some(2.5));
    }

    #[test]
    fn test_non_slot_units_ignored() {
        let request = extract("a 3 day wedding starting at 10 pm");
        assert_eq!(request.event_type.as_deref(), Some("Wedding"));
        assert_eq!(request.guest_count, None);
        assert_eq!(request.budget_amount, None);

        let request = extract("a 2-day function");
        assert_eq!(request.guest_count, None);
    }

    #[test]
    fn test_dates_are_not_slot_values() {
        let request = extract("wedding in Chennai on 15 March 2026");
        assert_eq!(request.event_type.as_deref(), Some("Wedding"));
        assert_eq!(request.location.as_deref(), Some("Chennai, Tamil Nadu"));
        assert_eq!(request.guest_count, None);
        assert_eq!(request.budget_amount, None);
        assert!(!request.is_complete());

        let request = extract("wedding on March 15, 2026 for 300 guests");
        assert_eq!(request.guest_count, Some(300));
        assert_eq!(request.budget_amount, None);

        let request = extract("sometime in Dec 2025, the date is 12 dec");
        assert_eq!(request.guest_count, None);
        assert_eq!(request.budget_amount, None);
    }

    #[test]
    fn test_cued_number_after_month_is_kept() {
        let request = extract("in march 2000 guests, budget 10 lakh");
        assert_eq!(request.guest_count, Some(2000));
        assert_eq!(request.budget_amount, Some(1_000_000.0));
    }

    #[test]
    fn test_out_of_range_values_dropped() {
        let request = extract("500000 guests");
        assert_eq!(request.guest_count, None);

        let request = extract("budget 5000 crore");
        assert_eq!(request.budget_amount, None);
    }

    #[test]
    fn test_first_mention_wins() {
        let existing = EventRequest {
            location: Some("Chennai, Tamil Nadu".into()),
            guest_count: Some(100),
            ..EventRequest::default()
        };
        let request = extractor().extract("actually Mumbai with 300 guests", &existing);
        assert_eq!(request.location.as_deref(), Some("Chennai, Tamil Nadu"));
        assert_eq!(request.guest_count, Some(100));
    }

    #[test]
    fn test_empty_utterance_is_noop() {
        let existing = EventRequest {
            event_type: Some("Wedding".into()),
            ..EventRequest::default()
        };
        let report = extractor().extract_with_report("   ", &existing);
        assert_eq!(report.request, existing);
        assert!(report.newly_filled.is_empty());
    }

    #[test]
    fn test_report_lists_new_slots() {
        let report = extractor().extract_with_report(
            "birthday in Pune for 40 people, budget 30k",
            &EventRequest::new(),
        );
        assert_eq!(report.newly_filled, SlotName::ALL.to_vec());
        assert!(report.request.is_complete());
    }

    #[test]
    fn test_range_policy_from_config() {
        let config = ExtractionConfig {
            range_policy: event_planner_core::RangePolicy::Midpoint,
            ..ExtractionConfig::default()
        };
        let extractor =
            SlotExtractor::from_config(Arc::new(ReferenceCatalogs::builtin().unwrap()), &config);
        let request = extractor.extract("budget 1-2 lakh", &EventRequest::new());
        assert_eq!(request.budget_amount, Some(150_000.0));
    }
}
