//! Error types shared across the event planner crates

use thiserror::Error;

use crate::event::SlotName;

/// Result alias using the core error
pub type Result<T> = std::result::Result<T, Error>;

/// Core errors
///
/// Unparseable user text is never an error: extraction reports absence and the
/// slot stays missing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed catalogs, templates or settings. Fatal at startup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A plan was requested before every required slot was filled
    #[error("Precondition not met: missing {}", format_missing(.missing))]
    PreconditionNotMet { missing: Vec<SlotName> },

    #[error("Session error: {0}")]
    Session(String),

    /// Search collaborator failure, passed through unchanged
    #[error("Search error: {0}")]
    Search(String),
}

impl Error {
    /// Whether the caller can recover by re-prompting the user
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::PreconditionNotMet { .. } | Error::Search(_))
    }
}

fn format_missing(missing: &[SlotName]) -> String {
    missing
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
