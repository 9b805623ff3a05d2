//! Configuration management for the event planner
//!
//! Supports loading configuration from:
//! - YAML/TOML files (`config/default`, `config/{env}`)
//! - Environment variables (EVENT_PLANNER prefix, `__` separator)
//!
//! # Reference data
//!
//! - `data/indian_events.json` - event type catalog
//! - `data/indian_locations.json` - location catalog
//! - `config/plan_templates.yaml` - checklist templates keyed by event type
//!
//! Each has a built-in copy compiled into the binary, used when the file is absent.

pub mod catalog;
pub mod settings;
pub mod templates;

pub use catalog::{Catalog, CatalogEntry, CatalogKind, CatalogMatch, ReferenceCatalogs};
pub use settings::{
    load_settings, AuthConfig, CatalogSettings, ExtractionConfig, IdentityConfig,
    ObservabilityConfig, RuntimeEnvironment, SearchConfig, ServerConfig, SessionConfig, Settings,
};
pub use templates::{PlanTemplate, PlanTemplatesConfig, TemplateItem};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Invalid {catalog} catalog: {message}")]
    InvalidCatalog { catalog: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<ConfigError> for event_planner_core::Error {
    fn from(err: ConfigError) -> Self {
        event_planner_core::Error::Configuration(err.to_string())
    }
}
