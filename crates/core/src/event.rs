//! Event request and slot types
//!
//! An `EventRequest` accumulates the four required slots across a
//! conversation. A slot is either absent or holds a validated canonical value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Budget amounts are always Indian rupees
pub const BUDGET_CURRENCY: &str = "INR";

/// Required slots, declared in fixed priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotName {
    EventType,
    Location,
    GuestCount,
    BudgetAmount,
}

impl SlotName {
    /// All slots in priority order
    pub const ALL: [SlotName; 4] = [
        SlotName::EventType,
        SlotName::Location,
        SlotName::GuestCount,
        SlotName::BudgetAmount,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SlotName::EventType => "event_type",
            SlotName::Location => "location",
            SlotName::GuestCount => "guest_count",
            SlotName::BudgetAmount => "budget_amount",
        }
    }

    /// Human-readable label
    pub fn display_name(&self) -> &'static str {
        match self {
            SlotName::EventType => "event type",
            SlotName::Location => "location",
            SlotName::GuestCount => "guest count",
            SlotName::BudgetAmount => "budget",
        }
    }
}

impl fmt::Display for SlotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collection state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CollectionState {
    /// At least one required slot is absent
    #[default]
    Collecting,
    /// All required slots are present
    Complete,
    /// Plan produced; terminal
    Finalized,
}

impl CollectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionState::Collecting => "collecting",
            CollectionState::Complete => "complete",
            CollectionState::Finalized => "finalized",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CollectionState::Finalized)
    }
}

/// Coarse budget band used for plan summaries and vendor search hints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetTier {
    Low,
    Moderate,
    High,
}

impl BudgetTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetTier::Low => "low",
            BudgetTier::Moderate => "moderate",
            BudgetTier::High => "high",
        }
    }

    /// Qualifier prepended to vendor searches
    pub fn vendor_hint(&self) -> &'static str {
        match self {
            BudgetTier::Low => "affordable",
            BudgetTier::Moderate => "best",
            BudgetTier::High => "luxury",
        }
    }

    /// Parse a tier name ("low", "moderate", "high"); also accepts the vendor hints
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" | "affordable" | "budget" => Some(BudgetTier::Low),
            "moderate" | "medium" | "best" => Some(BudgetTier::Moderate),
            "high" | "luxury" | "lavish" => Some(BudgetTier::High),
            _ => None,
        }
    }
}

impl fmt::Display for BudgetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Thresholds separating budget tiers (amounts in INR)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetTiers {
    /// Amounts strictly below this are `Low`
    #[serde(default = "default_low_below")]
    pub low_below: f64,
    /// Amounts strictly below this (and not low) are `Moderate`
    #[serde(default = "default_moderate_below")]
    pub moderate_below: f64,
}

fn default_low_below() -> f64 {
    50_000.0
}

fn default_moderate_below() -> f64 {
    500_000.0
}

impl Default for BudgetTiers {
    fn default() -> Self {
        Self {
            low_below: default_low_below(),
            moderate_below: default_moderate_below(),
        }
    }
}

impl BudgetTiers {
    pub fn tier_for(&self, amount: f64) -> BudgetTier {
        if amount < self.low_below {
            BudgetTier::Low
        } else if amount < self.moderate_below {
            BudgetTier::Moderate
        } else {
            BudgetTier::High
        }
    }
}

/// Event-planning parameters collected for one session
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventRequest {
    /// Canonical event type from the events catalog
    #[serde(default)]
    pub event_type: Option<String>,
    /// Canonical location from the locations catalog
    #[serde(default)]
    pub location: Option<String>,
    /// Number of guests, always > 0
    #[serde(default)]
    pub guest_count: Option<u32>,
    /// Budget in INR, always finite and >= 0
    #[serde(default)]
    pub budget_amount: Option<f64>,
}

impl EventRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a slot holds a value
    pub fn is_filled(&self, slot: SlotName) -> bool {
        match slot {
            SlotName::EventType => self.event_type.is_some(),
            SlotName::Location => self.location.is_some(),
            SlotName::GuestCount => self.guest_count.is_some(),
            SlotName::BudgetAmount => self.budget_amount.is_some(),
        }
    }

    /// Absent slots in priority order
    pub fn missing_slots(&self) -> Vec<SlotName> {
        SlotName::ALL
            .iter()
            .copied()
            .filter(|slot| !self.is_filled(*slot))
            .collect()
    }

    /// First absent slot in priority order
    pub fn next_missing(&self) -> Option<SlotName> {
        SlotName::ALL.iter().copied().find(|slot| !self.is_filled(*slot))
    }

    pub fn is_complete(&self) -> bool {
        self.next_missing().is_none()
    }

    /// Collection state implied by the filled slots
    pub fn state(&self) -> CollectionState {
        if self.is_complete() {
            CollectionState::Complete
        } else {
            CollectionState::Collecting
        }
    }

    pub fn currency(&self) -> &'static str {
        BUDGET_CURRENCY
    }

    pub fn budget_tier(&self, tiers: &BudgetTiers) -> Option<BudgetTier> {
        self.budget_amount.map(|amount| tiers.tier_for(amount))
    }

    // Fill operations write only into absent slots and reject invalid values.
    // Each returns true when the slot was written.

    pub fn fill_event_type(&mut self, value: &str) -> bool {
        fill_text(&mut self.event_type, value)
    }

    pub fn fill_location(&mut self, value: &str) -> bool {
        fill_text(&mut self.location, value)
    }

    pub fn fill_guest_count(&mut self, value: u32) -> bool {
        if self.guest_count.is_some() || value == 0 {
            return false;
        }
        self.guest_count = Some(value);
        true
    }

    pub fn fill_budget_amount(&mut self, value: f64) -> bool {
        if self.budget_amount.is_some() || !value.is_finite() || value < 0.0 {
            return false;
        }
        self.budget_amount = Some(value);
        true
    }

    /// Check the slot invariants on a request received from outside (e.g. JSON)
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref event_type) = self.event_type {
            if event_type.trim().is_empty() {
                return Err("event_type must not be empty".to_string());
            }
        }
        if let Some(ref location) = self.location {
            if location.trim().is_empty() {
                return Err("location must not be empty".to_string());
            }
        }
        if self.guest_count == Some(0) {
            return Err("guest_count must be greater than 0".to_string());
        }
        if let Some(amount) = self.budget_amount {
            if !amount.is_finite() || amount < 0.0 {
                return Err(format!("budget_amount must be a non-negative number, got {}", amount));
            }
        }
        Ok(())
    }
}

fn fill_text(slot: &mut Option<String>, value: &str) -> bool {
    let value = value.trim();
    if slot.is_some() || value.is_empty() {
        return false;
    }
    *slot = Some(value.to_string());
    true
}
