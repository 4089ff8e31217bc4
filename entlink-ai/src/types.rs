//! Core types shared by the extraction, linking and geocoding stages
//!
//! An [`Entity`] is created once per recognized span and enriched in place by
//! each stage. Its `text`, `start` and `end` are fixed at construction; only the
//! link fields and the geocoding result change afterwards.
//!
//! Offsets are UTF-8 byte offsets into the analysed text, half-open.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Entity types
// ============================================================================

/// Canonical entity type
///
/// Tagger labels without a canonical mapping pass through verbatim as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityType {
    Person,
    Organization,
    Location,
    Misc,
    Address,
    Other(String),
}

impl EntityType {
    pub fn as_str(&self) -> &str {
        match self {
            EntityType::Person => "PERSON",
            EntityType::Organization => "ORGANIZATION",
            EntityType::Location => "LOCATION",
            EntityType::Misc => "MISC",
            EntityType::Address => "ADDRESS",
            EntityType::Other(label) => label,
        }
    }

    /// Parse a canonical type name; anything else becomes `Other`
    pub fn from_canonical(name: &str) -> Self {
        match name {
            "PERSON" => EntityType::Person,
            "ORGANIZATION" => EntityType::Organization,
            "LOCATION" => EntityType::Location,
            "MISC" => EntityType::Misc,
            "ADDRESS" => EntityType::Address,
            other => EntityType::Other(other.to_string()),
        }
    }

    /// Types whose text can contribute geographic context (LOCATION, GPE, FACILITY)
    pub fn is_context_source(&self) -> bool {
        match self {
            EntityType::Location => true,
            EntityType::Other(label) => matches!(label.as_str(), "GPE" | "FACILITY"),
            _ => false,
        }
    }

    /// Types the geocoding resolver attempts to place on a map
    pub fn is_geocodable(&self) -> bool {
        match self {
            EntityType::Location | EntityType::Organization | EntityType::Address => true,
            EntityType::Other(label) => matches!(label.as_str(), "GPE" | "FACILITY"),
            _ => false,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EntityType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EntityType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(EntityType::from_canonical(&name))
    }
}

// ============================================================================
// Links
// ============================================================================

/// External knowledge source that produced a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Structured knowledge base (entity search)
    Wikidata,
    /// Primary encyclopedia (full-text search)
    Wikipedia,
    /// Secondary encyclopedia mirror (HTML search page)
    Britannica,
}

impl SourceKind {
    pub fn category(self) -> LinkCategory {
        match self {
            SourceKind::Wikidata => LinkCategory::KnowledgeBase,
            SourceKind::Wikipedia | SourceKind::Britannica => LinkCategory::Encyclopedia,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Wikidata => "wikidata",
            SourceKind::Wikipedia => "wikipedia",
            SourceKind::Britannica => "britannica",
        }
    }
}

/// Link categories; within one category only the first success is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkCategory {
    KnowledgeBase,
    Encyclopedia,
}

/// Successful top result from a knowledge source
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeHit {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Link fields, populated independently
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Links {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_base_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encyclopedia_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encyclopedia_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encyclopedia_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encyclopedia_source: Option<SourceKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_url: Option<String>,
}

// ============================================================================
// Geocoding
// ============================================================================

/// Top result from a geocoding provider
#[derive(Debug, Clone, PartialEq)]
pub struct GeoHit {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
}

/// Geocoding strategy that produced a resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeocodingStrategy {
    Contextual,
    Library,
    MapSearch,
    Aggressive,
}

impl GeocodingStrategy {
    /// Tag stored in `geocoding_source`, e.g. `nominatim_contextual`
    pub fn source_tag(self, provider: &str) -> String {
        match self {
            GeocodingStrategy::Contextual => format!("{}_contextual", provider),
            GeocodingStrategy::Library => provider.to_string(),
            GeocodingStrategy::MapSearch => provider.to_string(),
            GeocodingStrategy::Aggressive => format!("{}_aggressive", provider),
        }
    }
}

/// Successful geocoding result; all fields are set together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoResolution {
    pub latitude: f64,
    pub longitude: f64,
    pub location_name: String,
    pub geocoding_source: String,
    pub search_term_used: String,
}

// ============================================================================
// Entity
// ============================================================================

/// Recognized span with its enrichment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    text: String,
    #[serde(rename = "type")]
    entity_type: EntityType,
    start: usize,
    end: usize,
    original_label: String,
    #[serde(flatten)]
    pub links: Links,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoResolution>,
}

impl Entity {
    pub fn new(
        text: impl Into<String>,
        entity_type: EntityType,
        start: usize,
        end: usize,
        original_label: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            entity_type,
            start,
            end,
            original_label: original_label.into(),
            links: Links::default(),
            geo: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn original_label(&self) -> &str {
        &self.original_label
    }

    /// Length in characters, used by the longest-span-wins policy
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Half-open interval overlap
    pub fn overlaps(&self, other: &Entity) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn has_link(&self, category: LinkCategory) -> bool {
        match category {
            LinkCategory::KnowledgeBase => self.links.knowledge_base_url.is_some(),
            LinkCategory::Encyclopedia => self.links.encyclopedia_url.is_some(),
        }
    }

    pub fn has_any_link(&self) -> bool {
        self.links.knowledge_base_url.is_some()
            || self.links.encyclopedia_url.is_some()
            || self.links.map_url.is_some()
    }

    /// Record a successful knowledge-source hit in the matching category
    pub fn apply_link(&mut self, kind: SourceKind, hit: KnowledgeHit) {
        match kind.category() {
            LinkCategory::KnowledgeBase => {
                self.links.knowledge_base_url = Some(hit.url);
                self.links.knowledge_base_description =
                    hit.description.filter(|d| !d.trim().is_empty());
            }
            LinkCategory::Encyclopedia => {
                self.links.encyclopedia_url = Some(hit.url);
                self.links.encyclopedia_title = hit.title;
                self.links.encyclopedia_description =
                    hit.description.filter(|d| !d.trim().is_empty());
                self.links.encyclopedia_source = Some(kind);
            }
        }
    }

    pub fn is_geocoded(&self) -> bool {
        self.geo.is_some()
    }
}

// ============================================================================
// Provider errors
// ============================================================================

/// Failure of a single external call
///
/// Every variant is a linking miss: the pipeline records it and moves on to
/// the next source or strategy.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LookupError {
    #[error("request timed out")]
    Timeout,

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed response: {0}")]
    Parse(String),

    #[error("client configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LookupError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LookupError::Timeout
        } else if e.is_decode() {
            LookupError::Parse(e.to_string())
        } else if let Some(status) = e.status() {
            LookupError::Status(status.as_u16())
        } else {
            LookupError::Network(e.to_string())
        }
    }
}

/// Result of one external lookup: hit, clean miss, or failure
pub type LookupResult<T> = Result<Option<T>, LookupError>;

/// Logged record of a failed external call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderMiss {
    pub entity: String,
    pub provider: String,
    pub query: String,
    pub reason: String,
}

impl ProviderMiss {
    pub fn new(entity: &str, provider: &str, query: &str, error: &LookupError) -> Self {
        Self {
            entity: entity.to_string(),
            provider: provider.to_string(),
            query: query.to_string(),
            reason: error.to_string(),
        }
    }
}
