//! Vendor search query and result types

use serde::{Deserialize, Serialize};

/// Search request handed to the vendor search collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorQuery {
    /// Vendor category, e.g. "Wedding Photographer"
    pub category: String,
    #[serde(default)]
    pub location: Option<String>,
    /// Budget qualifier ("affordable", "best", "luxury")
    #[serde(default)]
    pub budget_hint: Option<String>,
}

impl VendorQuery {
    /// Free-text query for a web search provider
    ///
    /// `"{budget_hint} {category} in {location} reviews"`, absent parts omitted.
    pub fn search_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(5);
        if let Some(ref hint) = self.budget_hint {
            parts.push(hint);
        }
        parts.push(&self.category);
        if let Some(ref location) = self.location {
            parts.push("in");
            parts.push(location);
        }
        parts.push("reviews");
        parts.join(" ")
    }

    pub fn is_scoped(&self) -> bool {
        self.location.is_some() || self.budget_hint.is_some()
    }
}

/// A vendor returned by the search collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorResult {
    pub name: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub reviews: Option<u64>,
    #[serde(default)]
    pub snippet: Option<String>,
}
