//! Main settings module

use config::{Config, Environment, File};
use event_planner_core::{BudgetTiers, RangePolicy};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Environment variable selecting the `config/{env}` overlay
pub const ENV_SELECTOR: &str = "EVENT_PLANNER_ENV";

/// Prefix for structured environment overrides (`EVENT_PLANNER__SERVER__PORT`)
pub const ENV_PREFIX: &str = "EVENT_PLANNER";

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Relaxed validation, warnings only
    #[default]
    Development,
    Staging,
    /// All validations enforced
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub session: SessionConfig,

    /// Slot extraction limits and range policy
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Budget tier thresholds in INR
    #[serde(default)]
    pub budget: BudgetTiers,

    /// Vendor search collaborator
    #[serde(default)]
    pub search: SearchConfig,

    /// Reference data file locations
    #[serde(default)]
    pub catalogs: CatalogSettings,

    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Identity reported by the `about` and `validate` tools
    #[serde(default)]
    pub identity: IdentityConfig,
}

impl Settings {
    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_session()?;
        self.validate_extraction()?;
        self.validate_budget()?;
        self.validate_search()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        let server = &self.server;

        if server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if server.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        if self.environment.is_production()
            && server.auth.enabled
            && server.auth.token.as_deref().map_or(true, |t| t.trim().is_empty())
        {
            return Err(ConfigError::InvalidValue {
                field: "server.auth.token".to_string(),
                message: "Token must be set when auth is enabled in production".to_string(),
            });
        }

        if self.environment.is_production() && server.cors_enabled && server.cors_origins.is_empty()
        {
            tracing::warn!(
                "CORS is enabled in production but no origins are configured. \
                 Only http://localhost:3000 will be allowed."
            );
        }

        Ok(())
    }

    fn validate_session(&self) -> Result<(), ConfigError> {
        let session = &self.session;

        if session.max_sessions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.max_sessions".to_string(),
                message: "Must allow at least 1 session".to_string(),
            });
        }

        if session.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.timeout_secs".to_string(),
                message: "Idle timeout must be at least 1 second".to_string(),
            });
        }

        if session.cleanup_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.cleanup_interval_secs".to_string(),
                message: "Cleanup interval must be at least 1 second".to_string(),
            });
        }

        Ok(())
    }

    fn validate_extraction(&self) -> Result<(), ConfigError> {
        let extraction = &self.extraction;

        if extraction.max_guest_count == 0 {
            return Err(ConfigError::InvalidValue {
                field: "extraction.max_guest_count".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if !extraction.max_budget.is_finite() || extraction.max_budget <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "extraction.max_budget".to_string(),
                message: format!("Must be a positive amount, got {}", extraction.max_budget),
            });
        }

        Ok(())
    }

    fn validate_budget(&self) -> Result<(), ConfigError> {
        let budget = &self.budget;

        if !budget.low_below.is_finite() || budget.low_below < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "budget.low_below".to_string(),
                message: format!("Must be a non-negative amount, got {}", budget.low_below),
            });
        }

        if !budget.moderate_below.is_finite() || budget.moderate_below < budget.low_below {
            return Err(ConfigError::InvalidValue {
                field: "budget.moderate_below".to_string(),
                message: format!(
                    "Must be at least budget.low_below ({}), got {}",
                    budget.low_below, budget.moderate_below
                ),
            });
        }

        Ok(())
    }

    fn validate_search(&self) -> Result<(), ConfigError> {
        let search = &self.search;

        if search.max_results == 0 {
            return Err(ConfigError::InvalidValue {
                field: "search.max_results".to_string(),
                message: "Must return at least 1 result".to_string(),
            });
        }

        if search.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "search.timeout_secs".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        if search.api_key.is_none() {
            if self.environment.is_strict() {
                tracing::warn!("No search API key configured, vendor search will use canned results");
            } else {
                tracing::debug!("No search API key configured");
            }
        }

        Ok(())
    }

    /// Fill unset secrets from the plain `AUTH_TOKEN`, `MY_NUMBER` and `SERPAPI_KEY` variables
    pub fn apply_legacy_env(&mut self) {
        self.apply_legacy_vars(|name| std::env::var(name).ok());
    }

    fn apply_legacy_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if self.server.auth.token.is_none() {
            if let Some(token) = read("AUTH_TOKEN") {
                self.server.auth.token = Some(token);
            }
        }
        if self.identity.owner_number.is_none() {
            if let Some(number) = read("MY_NUMBER") {
                self.identity.owner_number = Some(number);
            }
        }
        if self.search.api_key.is_none() {
            if let Some(key) = read("SERPAPI_KEY") {
                self.search.api_key = Some(key);
            }
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins; empty restricts to http://localhost:3000
    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default)]
    pub auth: AuthConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8086
}
fn default_timeout() -> u64 {
    30
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_seconds: default_timeout(),
            cors_enabled: true,
            cors_origins: Vec::new(),
            auth: AuthConfig::default(),
        }
    }
}

/// Bearer token gate in front of the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Disabled by default for development
    #[serde(default)]
    pub enabled: bool,

    /// Bearer token (EVENT_PLANNER__SERVER__AUTH__TOKEN or AUTH_TOKEN)
    #[serde(default)]
    pub token: Option<String>,

    /// Paths that bypass authentication
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,
}

fn default_public_paths() -> Vec<String> {
    vec!["/health".to_string(), "/metrics".to_string()]
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            token: None,
            public_paths: default_public_paths(),
        }
    }
}

/// Session store limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum concurrent sessions
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Idle time after which a session is evicted
    #[serde(default = "default_session_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,
}

fn default_max_sessions() -> usize {
    10_000
}
fn default_session_timeout() -> u64 {
    3600
}
fn default_cleanup_interval() -> u64 {
    60
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: default_max_sessions(),
            timeout_secs: default_session_timeout(),
            cleanup_interval_secs: default_cleanup_interval(),
        }
    }
}

/// Slot extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// How "50k-1 lakh" collapses to one amount
    #[serde(default)]
    pub range_policy: RangePolicy,

    #[serde(default = "default_max_guest_count")]
    pub max_guest_count: u32,

    /// Largest accepted budget in INR
    #[serde(default = "default_max_budget")]
    pub max_budget: f64,
}

fn default_max_guest_count() -> u32 {
    100_000
}
fn default_max_budget() -> f64 {
    // 1,000 crore
    10_000_000_000.0
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            range_policy: RangePolicy::default(),
            max_guest_count: default_max_guest_count(),
            max_budget: default_max_budget(),
        }
    }
}

/// Vendor search collaborator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    /// SerpAPI key (EVENT_PLANNER__SEARCH__API_KEY or SERPAPI_KEY); canned results when unset
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_search_engine")]
    pub engine: String,

    #[serde(default = "default_search_language")]
    pub language: String,

    #[serde(default = "default_search_country")]
    pub country: String,

    #[serde(default = "default_max_results")]
    pub max_results: usize,

    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,
}

fn default_search_endpoint() -> String {
    "https://serpapi.com/search".to_string()
}
fn default_search_engine() -> String {
    "google".to_string()
}
fn default_search_language() -> String {
    "en".to_string()
}
fn default_search_country() -> String {
    "in".to_string()
}
fn default_max_results() -> usize {
    5
}
fn default_search_timeout() -> u64 {
    10
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            api_key: None,
            engine: default_search_engine(),
            language: default_search_language(),
            country: default_search_country(),
            max_results: default_max_results(),
            timeout_secs: default_search_timeout(),
        }
    }
}

/// Reference data paths
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSettings {
    #[serde(default = "default_events_path")]
    pub events_path: String,

    #[serde(default = "default_locations_path")]
    pub locations_path: String,

    #[serde(default = "default_plan_templates_path")]
    pub plan_templates_path: String,
}

fn default_events_path() -> String {
    "data/indian_events.json".to_string()
}
fn default_locations_path() -> String {
    "data/indian_locations.json".to_string()
}
fn default_plan_templates_path() -> String {
    "config/plan_templates.yaml".to_string()
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            events_path: default_events_path(),
            locations_path: default_locations_path(),
            plan_templates_path: default_plan_templates_path(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_json: bool,

    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Service identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default = "default_identity_name")]
    pub name: String,

    #[serde(default = "default_identity_description")]
    pub description: String,

    /// Owner phone number returned by the `validate` tool (MY_NUMBER)
    #[serde(default)]
    pub owner_number: Option<String>,
}

fn default_identity_name() -> String {
    "Event Planner".to_string()
}
fn default_identity_description() -> String {
    "Personal event planning assistant for Indian weddings, birthdays and festivals. \
     Collects the event details over chat, drafts a checklist and finds local vendors."
        .to_string()
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            name: default_identity_name(),
            description: default_identity_description(),
            owner_number: None,
        }
    }
}

/// Load settings from files and environment
///
/// Layers `config/default`, then `config/{env}`, then `EVENT_PLANNER__*` variables.
/// Unset secrets fall back to the plain `AUTH_TOKEN`, `MY_NUMBER` and `SERPAPI_KEY`.
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let mut settings: Settings = config.try_deserialize()?;

    settings.apply_legacy_env();
    settings.validate()?;

    Ok(settings)
}
