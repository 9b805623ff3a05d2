//! Application State
//!
//! Shared state across all handlers.

use metrics_exporter_prometheus::PrometheusHandle;
use parking_lot::RwLock;
use std::sync::Arc;

use event_planner_agent::{InMemorySessionStore, PlanGenerator, SessionAccumulator, SessionStore};
use event_planner_config::{PlanTemplatesConfig, ReferenceCatalogs, Settings};
use event_planner_text_processing::SlotExtractor;
use event_planner_tools::{
    create_planner_registry, create_vendor_search, PlannerContext, ToolRegistry, VendorSearch,
};

use crate::ServerError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RwLock<Settings>>,
    /// Session-keyed slot accumulation
    pub accumulator: Arc<SessionAccumulator>,
    /// Vendor search collaborator
    pub search: Arc<dyn VendorSearch>,
    /// Tool registry
    pub tools: Arc<ToolRegistry>,
    /// Prometheus handle, absent when metrics are disabled
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Build state from settings with the configured search collaborator
    pub fn new(config: Settings) -> Result<Self, ServerError> {
        let search = create_vendor_search(&config.search)
            .map_err(|e| ServerError::Configuration(e.to_string()))?;
        Self::with_search(config, search)
    }

    /// Build state with a custom search collaborator
    pub fn with_search(config: Settings, search: Arc<dyn VendorSearch>) -> Result<Self, ServerError> {
        let catalogs = ReferenceCatalogs::load(&config.catalogs)
            .map_err(|e| ServerError::Configuration(e.to_string()))?;
        let templates = PlanTemplatesConfig::load_or_builtin(&config.catalogs.plan_templates_path)
            .map_err(|e| ServerError::Configuration(e.to_string()))?;

        tracing::info!(
            events = catalogs.events.len(),
            locations = catalogs.locations.len(),
            templates = templates.templates.len(),
            "Loaded reference data"
        );

        let extractor = SlotExtractor::from_config(Arc::new(catalogs), &config.extraction);
        let planner = PlanGenerator::new(templates, config.budget);
        let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::with_config(
            config.session.max_sessions,
            std::time::Duration::from_secs(config.session.timeout_secs),
        ));
        let accumulator = Arc::new(SessionAccumulator::new(extractor, planner, store));

        let ctx = PlannerContext::new(
            Arc::clone(&accumulator),
            Arc::clone(&search),
            config.identity.clone(),
        );
        let tools = create_planner_registry(Arc::new(ctx));

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            accumulator,
            search,
            tools: Arc::new(tools),
            metrics: None,
        })
    }

    /// Attach the Prometheus handle served at `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Get a read guard to the current configuration
    pub fn get_config(&self) -> parking_lot::RwLockReadGuard<'_, Settings> {
        self.config.read()
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        self.accumulator.store()
    }
}
