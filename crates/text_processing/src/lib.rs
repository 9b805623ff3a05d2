//! Text processing for the event planner
//!
//! This crate turns free-form chat text into structured slot values:
//! - **Phrase Normalizer**: "50k", "1.5 lakh", "₹2 crore", "1-2 lakh" → amounts in INR
//! - **Slot Extractor**: event type and location via the reference catalogs,
//!   guest count and budget via the normalizer and adjacent cue words
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use event_planner_config::ReferenceCatalogs;
//! use event_planner_core::EventRequest;
//! use event_planner_text_processing::SlotExtractor;
//!
//! let extractor = SlotExtractor::new(Arc::new(ReferenceCatalogs::builtin()?));
//! let request = extractor.extract("shaadi in Chennai for 200 guests", &EventRequest::new());
//! assert_eq!(request.event_type.as_deref(), Some("Wedding"));
//! ```

pub mod amount;
pub mod slot_extraction;

pub use amount::{normalize_amount, AmountMention, AmountNormalizer};
pub use slot_extraction::{ExtractionLimits, ExtractionReport, SlotExtractor};
