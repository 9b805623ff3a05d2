//! Plan Templates
//!
//! Checklist templates loaded from YAML, keyed by canonical event type.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::ConfigError;

const BUILTIN_TEMPLATES: &str = include_str!("../../../config/plan_templates.yaml");

/// Templates configuration loaded from plan_templates.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanTemplatesConfig {
    /// Templates in lookup order
    #[serde(default)]
    pub templates: Vec<PlanTemplate>,
    /// Used for event types no template lists
    pub fallback: PlanTemplate,
}

/// One checklist template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanTemplate {
    pub name: String,
    /// Canonical event types served by this template
    #[serde(default)]
    pub event_types: Vec<String>,
    pub items: Vec<TemplateItem>,
}

/// Checklist item, optionally gated on guest count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateItem {
    pub category: String,
    pub description: String,
    /// Only included when the guest count is at least this
    #[serde(default)]
    pub min_guests: Option<u32>,
}

impl TemplateItem {
    pub fn applies_to(&self, guest_count: u32) -> bool {
        self.min_guests.map_or(true, |min| guest_count >= min)
    }
}

impl PlanTemplate {
    /// Items applicable to `guest_count`, in declaration order
    pub fn items_for(&self, guest_count: u32) -> impl Iterator<Item = &TemplateItem> {
        self.items.iter().filter(move |item| item.applies_to(guest_count))
    }

    pub fn serves(&self, event_type: &str) -> bool {
        let event_type = event_type.trim();
        self.event_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(event_type))
    }
}

impl PlanTemplatesConfig {
    /// Load from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileNotFound(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Templates compiled into the binary
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_yaml_str(BUILTIN_TEMPLATES)
    }

    /// Load from `path`, falling back to the built-in templates when the file is absent
    pub fn load_or_builtin<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            let config = Self::load(path)?;
            tracing::info!(
                path = %path.display(),
                templates = config.templates.len(),
                "Loaded plan templates"
            );
            Ok(config)
        } else {
            tracing::warn!(
                path = %path.display(),
                "Plan templates file not found, using built-in templates"
            );
            Self::builtin()
        }
    }

    /// Template serving `event_type`, or the fallback
    pub fn template_for(&self, event_type: &str) -> &PlanTemplate {
        self.templates
            .iter()
            .find(|t| t.serves(event_type))
            .unwrap_or(&self.fallback)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut claimed = HashSet::new();

        for template in self.templates.iter().chain(std::iter::once(&self.fallback)) {
            validate_items(template)?;
        }

        for template in &self.templates {
            if template.event_types.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("templates.{}.event_types", template.name),
                    message: "Template must serve at least one event type".to_string(),
                });
            }
            for event_type in &template.event_types {
                if !claimed.insert(event_type.trim().to_lowercase()) {
                    return Err(ConfigError::InvalidValue {
                        field: format!("templates.{}.event_types", template.name),
                        message: format!("'{}' is served by more than one template", event_type),
                    });
                }
            }
        }

        Ok(())
    }
}

fn validate_items(template: &PlanTemplate) -> Result<(), ConfigError> {
    if !template.items.iter().any(|i| i.min_guests.is_none()) {
        return Err(ConfigError::InvalidValue {
            field: format!("templates.{}.items", template.name),
            message: "Template needs at least one ungated item".to_string(),
        });
    }
    for item in &template.items {
        if item.category.trim().is_empty() || item.description.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: format!("templates.{}.items", template.name),
                message: "Item category and description must not be empty".to_string(),
            });
        }
    }
    Ok(())
}
