//! Reference Catalogs
//!
//! Static mappings from canonical names to keyword synonyms, one catalog for
//! event types and one for locations. Catalogs are validated and compiled once
//! at load; lookups afterwards are read-only and need no locking.
//!
//! ## Matching
//!
//! A keyword matches case-insensitively when delimited by non-word characters
//! (or the text edges). A trailing plural `s`/`es` is tolerated, so "weddings"
//! matches `wedding` while "holiday" does not match `holi`. Multi-word keywords
//! match across any whitespace run.
//!
//! When several entries match, the longest matched keyword wins; ties go to
//! the entry declared first.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use event_planner_core::EventRequest;

use crate::ConfigError;

const BUILTIN_EVENTS: &str = include_str!("../../../data/indian_events.json");
const BUILTIN_LOCATIONS: &str = include_str!("../../../data/indian_locations.json");

/// Which catalog a file or lookup refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Events,
    Locations,
}

impl CatalogKind {
    /// Top-level key of the JSON catalog file
    pub fn root_key(&self) -> &'static str {
        match self {
            CatalogKind::Events => "events",
            CatalogKind::Locations => "locations",
        }
    }

    fn builtin_source(&self) -> &'static str {
        match self {
            CatalogKind::Events => BUILTIN_EVENTS,
            CatalogKind::Locations => BUILTIN_LOCATIONS,
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.root_key())
    }
}

/// Catalog entry as declared in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Canonical name the keywords resolve to
    #[serde(alias = "canonical_name")]
    pub name: String,
    /// Synonyms, matched case-insensitively
    pub keywords: Vec<String>,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, keywords: &[&str]) -> Self {
        Self {
            name: name.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Catalog file layout: `{"events": [...]}` or `{"locations": [...]}`
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    events: Option<Vec<CatalogEntry>>,
    #[serde(default)]
    locations: Option<Vec<CatalogEntry>>,
}

#[derive(Debug, Clone)]
struct CompiledKeyword {
    text: String,
    char_len: usize,
    pattern: Regex,
}

#[derive(Debug, Clone)]
struct CompiledEntry {
    canonical_name: String,
    keywords: Vec<CompiledKeyword>,
}

/// A successful catalog lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogMatch<'a> {
    pub canonical_name: &'a str,
    /// Normalized keyword that matched
    pub keyword: &'a str,
    /// Byte span of the match in the searched text
    pub start: usize,
    pub end: usize,
}

/// Compiled, immutable catalog
#[derive(Debug, Clone)]
pub struct Catalog {
    kind: CatalogKind,
    entries: Vec<CompiledEntry>,
}

impl Catalog {
    /// Validate and compile entries, preserving declaration order
    pub fn from_entries(kind: CatalogKind, entries: Vec<CatalogEntry>) -> Result<Self, ConfigError> {
        let invalid = |message: String| ConfigError::InvalidCatalog {
            catalog: kind.to_string(),
            message,
        };

        if entries.is_empty() {
            return Err(invalid("catalog has no entries".to_string()));
        }

        let mut seen_names = HashSet::new();
        let mut seen_keywords = HashSet::new();
        let mut compiled = Vec::with_capacity(entries.len());

        for entry in entries {
            let canonical_name = entry.name.trim().to_string();
            if canonical_name.is_empty() {
                return Err(invalid("entry with empty canonical name".to_string()));
            }
            if !seen_names.insert(canonical_name.to_lowercase()) {
                return Err(invalid(format!("duplicate canonical name '{}'", canonical_name)));
            }
            if entry.keywords.is_empty() {
                return Err(invalid(format!("'{}' has no keywords", canonical_name)));
            }

            let mut keywords = Vec::with_capacity(entry.keywords.len());
            for keyword in &entry.keywords {
                let text = normalize_keyword(keyword);
                if text.is_empty() {
                    return Err(invalid(format!("'{}' has an empty keyword", canonical_name)));
                }
                if !seen_keywords.insert(text.clone()) {
                    return Err(invalid(format!(
                        "keyword '{}' of '{}' is declared more than once",
                        text, canonical_name
                    )));
                }
                let pattern = keyword_pattern(&text).map_err(|e| {
                    invalid(format!("keyword '{}' cannot be compiled: {}", text, e))
                })?;
                keywords.push(CompiledKeyword {
                    char_len: text.chars().count(),
                    text,
                    pattern,
                });
            }

            compiled.push(CompiledEntry {
                canonical_name,
                keywords,
            });
        }

        Ok(Self {
            kind,
            entries: compiled,
        })
    }

    /// Parse a JSON catalog document
    pub fn from_json_str(kind: CatalogKind, json: &str) -> Result<Self, ConfigError> {
        let file: CatalogFile = serde_json::from_str(json).map_err(|e| ConfigError::InvalidCatalog {
            catalog: kind.to_string(),
            message: e.to_string(),
        })?;

        let entries = match kind {
            CatalogKind::Events => file.events,
            CatalogKind::Locations => file.locations,
        }
        .ok_or_else(|| ConfigError::MissingField(kind.root_key().to_string()))?;

        Self::from_entries(kind, entries)
    }

    /// Load a catalog from a JSON file
    pub fn load<P: AsRef<Path>>(kind: CatalogKind, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileNotFound(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(kind, &content)
    }

    /// Catalog compiled into the binary
    pub fn builtin(kind: CatalogKind) -> Result<Self, ConfigError> {
        Self::from_json_str(kind, kind.builtin_source())
    }

    /// Load from `path`, falling back to the built-in catalog when the file is absent
    ///
    /// A file that exists but does not parse or validate is an error.
    pub fn load_or_builtin<P: AsRef<Path>>(kind: CatalogKind, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            let catalog = Self::load(kind, path)?;
            tracing::info!(
                catalog = %kind,
                path = %path.display(),
                entries = catalog.len(),
                "Loaded catalog"
            );
            Ok(catalog)
        } else {
            tracing::warn!(
                catalog = %kind,
                path = %path.display(),
                "Catalog file not found, using built-in catalog"
            );
            Self::builtin(kind)
        }
    }

    pub fn kind(&self) -> CatalogKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Canonical names in declaration order
    pub fn canonical_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.canonical_name.as_str()).collect()
    }

    /// Canonical spelling of a canonical name (case-insensitive)
    pub fn canonical(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        self.entries
            .iter()
            .find(|e| e.canonical_name.eq_ignore_ascii_case(name))
            .map(|e| e.canonical_name.as_str())
    }

    /// Canonical name for the best keyword match in `text`
    pub fn lookup(&self, text: &str) -> Option<&str> {
        self.find(text).map(|m| m.canonical_name)
    }

    /// Best keyword match in `text`, with its span
    pub fn find(&self, text: &str) -> Option<CatalogMatch<'_>> {
        if text.trim().is_empty() {
            return None;
        }

        let mut best: Option<(usize, CatalogMatch<'_>)> = None;

        for entry in &self.entries {
            for keyword in &entry.keywords {
                let Some(span) = keyword.pattern.captures(text).and_then(|c| c.get(1)) else {
                    continue;
                };
                // Strictly longer only, so earlier entries keep ties
                let better = best
                    .as_ref()
                    .map_or(true, |(len, _)| keyword.char_len > *len);
                if better {
                    best = Some((
                        keyword.char_len,
                        CatalogMatch {
                            canonical_name: &entry.canonical_name,
                            keyword: &keyword.text,
                            start: span.start(),
                            end: span.end(),
                        },
                    ));
                }
            }
        }

        best.map(|(_, m)| m)
    }
}

/// Both reference catalogs
#[derive(Debug, Clone)]
pub struct ReferenceCatalogs {
    pub events: Catalog,
    pub locations: Catalog,
}

impl ReferenceCatalogs {
    pub fn new(events: Catalog, locations: Catalog) -> Self {
        Self { events, locations }
    }

    /// Built-in event and location catalogs
    pub fn builtin() -> Result<Self, ConfigError> {
        Ok(Self {
            events: Catalog::builtin(CatalogKind::Events)?,
            locations: Catalog::builtin(CatalogKind::Locations)?,
        })
    }

    /// Load both catalogs, falling back per file to the built-in copies
    pub fn load(settings: &crate::CatalogSettings) -> Result<Self, ConfigError> {
        Ok(Self {
            events: Catalog::load_or_builtin(CatalogKind::Events, &settings.events_path)?,
            locations: Catalog::load_or_builtin(CatalogKind::Locations, &settings.locations_path)?,
        })
    }

    /// Validate a caller-supplied request and rewrite its names to canonical spelling
    ///
    /// Event types and locations must already be canonical names (case-insensitive);
    /// free text goes through the slot extractor instead.
    pub fn canonicalize(&self, request: &EventRequest) -> Result<EventRequest, String> {
        request.validate()?;

        let mut canonical = request.clone();
        if let Some(ref event_type) = request.event_type {
            let name = self
                .events
                .canonical(event_type)
                .ok_or_else(|| format!("Unknown event_type '{}'", event_type))?;
            canonical.event_type = Some(name.to_string());
        }
        if let Some(ref location) = request.location {
            let name = self
                .locations
                .canonical(location)
                .ok_or_else(|| format!("Unknown location '{}'", location))?;
            canonical.location = Some(name.to_string());
        }
        Ok(canonical)
    }
}

fn normalize_keyword(keyword: &str) -> String {
    keyword
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn keyword_pattern(keyword: &str) -> Result<Regex, regex::Error> {
    let body = keyword
        .split(' ')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    Regex::new(&format!(
        r"(?i)(?:^|[^\p{{L}}\p{{M}}\p{{N}}_])({})(?:e?s)?(?:$|[^\p{{L}}\p{{M}}\p{{N}}_])",
        body
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn events() -> Catalog {
        Catalog::builtin(CatalogKind::Events).unwrap()
    }

    fn locations() -> Catalog {
        Catalog::builtin(CatalogKind::Locations).unwrap()
    }

    #[test]
    fn test_builtin_catalogs_load() {
        let catalogs = ReferenceCatalogs::builtin().unwrap();
        assert!(!catalogs.events.is_empty());
        assert!(!catalogs.locations.is_empty());
        assert_eq!(catalogs.events.canonical_names()[0], "Wedding");
    }

    #[test]
    fn test_lookup_colloquial_keyword() {
        assert_eq!(events().lookup("planning a shaadi"), Some("Wedding"));
        assert_eq!(events().lookup("Planning a WEDDING next month"), Some("Wedding"));
        assert_eq!(events().lookup("my son's bday"), Some("Birthday Party"));
        assert_eq!(locations().lookup("in Chennai"), Some("Chennai, Tamil Nadu"));
        assert_eq!(locations().lookup("near trichy"), Some("Tiruchirappalli, Tamil Nadu"));
    }

    #[test]
    fn test_lookup_word_boundaries() {
        assert_eq!(events().lookup("two weddings this year"), Some("Wedding"));
        assert_eq!(events().lookup("going on a holiday"), None);
        assert_eq!(events().lookup("holi party"), Some("Festival Celebration"));
        assert_eq!(locations().lookup("concrete plans"), None);
    }

    #[test]
    fn test_lookup_no_match() {
        assert_eq!(events().lookup("hello there"), None);
        assert_eq!(events().lookup(""), None);
        assert_eq!(locations().lookup("   "), None);
    }

    #[test]
    fn test_longest_keyword_wins() {
        let catalog = Catalog::from_entries(
            CatalogKind::Locations,
            vec![
                CatalogEntry::new("Delhi, NCR", &["delhi"]),
                CatalogEntry::new("New Delhi", &["new delhi"]),
            ],
        )
        .unwrap();
        let found = catalog.find("a venue in New  Delhi please").unwrap();
        assert_eq!(found.canonical_name, "New Delhi");
        assert_eq!(found.keyword, "new delhi");
    }

    #[test]
    fn test_tie_prefers_first_declared() {
        let catalog = Catalog::from_entries(
            CatalogKind::Events,
            vec![
                CatalogEntry::new("Engagement", &["sagai"]),
                CatalogEntry::new("Wedding", &["shadi"]),
            ],
        )
        .unwrap();
        assert_eq!(catalog.lookup("shadi or sagai"), Some("Engagement"));
    }

    #[test]
    fn test_rejects_duplicate_canonical_names() {
        let err = Catalog::from_entries(
            CatalogKind::Events,
            vec![
                CatalogEntry::new("Wedding", &["wedding"]),
                CatalogEntry::new("wedding", &["shaadi"]),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCatalog { .. }));
    }

    #[test]
    fn test_rejects_empty_keywords() {
        let err = Catalog::from_entries(
            CatalogKind::Events,
            vec![CatalogEntry::new("Wedding", &[])],
        )
        .unwrap_err();
        assert!(err.to_string().contains("no keywords"));

        let err = Catalog::from_entries(
            CatalogKind::Events,
            vec![CatalogEntry::new("Wedding", &["  "])],
        )
        .unwrap_err();
        assert!(err.to_string().contains("empty keyword"));
    }

    #[test]
    fn test_rejects_duplicate_keywords() {
        let err = Catalog::from_entries(
            CatalogKind::Events,
            vec![
                CatalogEntry::new("Wedding", &["shaadi"]),
                CatalogEntry::new("Reception", &["Shaadi"]),
            ],
        )
        .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_from_json_requires_root_key() {
        let err = Catalog::from_json_str(CatalogKind::Locations, r#"{"events": []}"#).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn test_load_or_builtin_missing_file_falls_back() {
        let catalog =
            Catalog::load_or_builtin(CatalogKind::Events, "/nonexistent/indian_events.json").unwrap();
        assert_eq!(catalog.lookup("shaadi"), Some("Wedding"));
    }

    #[test]
    fn test_load_or_builtin_malformed_file_is_fatal() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let result = Catalog::load_or_builtin(CatalogKind::Events, file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file_preserves_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"locations": [
                {{"name": "Pune, Maharashtra", "keywords": ["pune"]}},
                {{"name": "Goa", "keywords": ["goa"]}}
            ]}}"#
        )
        .unwrap();
        let catalog = Catalog::load(CatalogKind::Locations, file.path()).unwrap();
        assert_eq!(catalog.canonical_names(), vec!["Pune, Maharashtra", "Goa"]);
        assert_eq!(catalog.lookup("pune or goa"), Some("Pune, Maharashtra"));
        assert_eq!(catalog.canonical("goa"), Some("Goa"));
    }

    #[test]
    fn test_canonicalize_request() {
        let catalogs = ReferenceCatalogs::builtin().unwrap();
        let request = EventRequest {
            event_type: Some("birthday party".into()),
            location: Some(" pune, maharashtra ".into()),
            guest_count: Some(40),
            budget_amount: Some(60_000.0),
        };
        let canonical = catalogs.canonicalize(&request).unwrap();
        assert_eq!(canonical.event_type.as_deref(), Some("Birthday Party"));
        assert_eq!(canonical.location.as_deref(), Some("Pune, Maharashtra"));
        assert_eq!(canonical.guest_count, Some(40));

        let unknown = EventRequest {
            location: Some("Atlantis".into()),
            ..request.clone()
        };
        assert_eq!(
            catalogs.canonicalize(&unknown).unwrap_err(),
            "Unknown location 'Atlantis'"
        );

        // Keywords are not canonical names
        let keyword = EventRequest {
            event_type: Some("shaadi".into()),
            ..request
        };
        assert!(catalogs.canonicalize(&keyword).is_err());

        assert_eq!(
            catalogs.canonicalize(&EventRequest::default()).unwrap(),
            EventRequest::default()
        );
    }
}
