//! Bootstrap configuration for entlink-ai
//!
//! Loaded once at startup from TOML (see `entlink_common::config` for the
//! file resolution order). Every field has a built-in default, so an absent
//! file or a partial one is never fatal.
//!
//! ```toml
//! [server]
//! port = 5730
//!
//! [tagger]
//! endpoint = "http://127.0.0.1:5731/tag"
//! offsets = "chars"
//!
//! [providers.nominatim]
//! min_interval_ms = 1000
//! ```

use crate::extraction::OffsetUnit;
use entlink_common::config::{load_toml_or_default, ConfigResolver, LoggingConfig};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Application name used for config file lookup
pub const APP_NAME: &str = "entlink";

/// Complete bootstrap configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub tagger: TaggerConfig,
    #[serde(default)]
    pub linking: LinkingConfig,
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// HTTP listener
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5730
}

/// Remote tagging service
#[derive(Debug, Clone, Deserialize)]
pub struct TaggerConfig {
    #[serde(default = "default_tagger_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_tagger_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub offsets: OffsetUnit,
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_tagger_endpoint(),
            timeout_secs: default_tagger_timeout(),
            offsets: OffsetUnit::default(),
        }
    }
}

impl TaggerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_tagger_endpoint() -> String {
    "http://127.0.0.1:5731/tag".to_string()
}

fn default_tagger_timeout() -> u64 {
    10
}

/// Knowledge linking behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct LinkingConfig {
    /// Search language for the knowledge base and geocoder results
    #[serde(default = "default_language")]
    pub language: String,
    /// Query the secondary encyclopedia when the primary one misses
    #[serde(default = "default_true")]
    pub enable_mirror: bool,
    /// Entities enriched concurrently (1 = strictly sequential)
    #[serde(default = "default_concurrency")]
    pub max_concurrent_entities: usize,
}

impl Default for LinkingConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            enable_mirror: true,
            max_concurrent_entities: default_concurrency(),
        }
    }
}

fn default_language() -> String {
    "en".to_string()
}

fn default_true() -> bool {
    true
}

fn default_concurrency() -> usize {
    1
}

/// Geocoding behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Include ArcGIS after Nominatim in the provider fallback
    #[serde(default = "default_true")]
    pub enable_secondary_provider: bool,
    /// Optional ISO 3166-1 country codes to bias map search (e.g. "gb,ie")
    #[serde(default)]
    pub country_codes: Option<String>,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            enable_secondary_provider: true,
            country_codes: None,
        }
    }
}

/// In-memory analysis cache
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Maximum cached analyses (0 disables the cache)
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
        }
    }
}

fn default_cache_capacity() -> usize {
    32
}

/// External providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderId {
    Wikidata,
    Wikipedia,
    Britannica,
    Nominatim,
    Arcgis,
}

impl ProviderId {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderId::Wikidata => "wikidata",
            ProviderId::Wikipedia => "wikipedia",
            ProviderId::Britannica => "britannica",
            ProviderId::Nominatim => "nominatim",
            ProviderId::Arcgis => "arcgis",
        }
    }

    /// Built-in base URL, timeout and minimum call spacing
    pub fn defaults(self) -> ProviderSettings {
        let (base_url, timeout_secs, min_interval_ms) = match self {
            ProviderId::Wikidata => ("https://www.wikidata.org", 5, 100),
            ProviderId::Wikipedia => ("https://en.wikipedia.org", 10, 200),
            ProviderId::Britannica => ("https://www.britannica.com", 10, 300),
            // Nominatim usage policy: at most one request per second
            ProviderId::Nominatim => ("https://nominatim.openstreetmap.org", 10, 1000),
            ProviderId::Arcgis => ("https://geocode.arcgis.com", 10, 300),
        };

        ProviderSettings {
            base_url: base_url.to_string(),
            timeout: Duration::from_secs(timeout_secs),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }
}

/// Resolved settings for one provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub base_url: String,
    pub timeout: Duration,
    pub min_interval: Duration,
}

/// Partial override for one provider, merged over its defaults
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderOverride {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub min_interval_ms: Option<u64>,
}

/// `[providers.*]` tables
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub wikidata: ProviderOverride,
    #[serde(default)]
    pub wikipedia: ProviderOverride,
    #[serde(default)]
    pub britannica: ProviderOverride,
    #[serde(default)]
    pub nominatim: ProviderOverride,
    #[serde(default)]
    pub arcgis: ProviderOverride,
}

impl ProvidersConfig {
    /// Settings for `id` with any configured overrides applied
    pub fn settings(&self, id: ProviderId) -> ProviderSettings {
        let overrides = match id {
            ProviderId::Wikidata => &self.wikidata,
            ProviderId::Wikipedia => &self.wikipedia,
            ProviderId::Britannica => &self.britannica,
            ProviderId::Nominatim => &self.nominatim,
            ProviderId::Arcgis => &self.arcgis,
        };

        let mut settings = id.defaults();
        if let Some(url) = &overrides.base_url {
            settings.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = overrides.timeout_secs {
            settings.timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = overrides.min_interval_ms {
            settings.min_interval = Duration::from_millis(ms);
        }
        settings
    }
}

/// Resolve and load the config file
pub fn load_config(cli_path: Option<&Path>) -> entlink_common::Result<TomlConfig> {
    let resolver = ConfigResolver::new(APP_NAME);
    let path = resolver.resolve(cli_path);
    load_toml_or_default(path.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.server.port, 5730);
        assert_eq!(config.tagger.offsets, OffsetUnit::Chars);
        assert_eq!(config.linking.max_concurrent_entities, 1);
        assert!(config.geocoding.enabled);
        assert_eq!(config.cache.capacity, 32);
    }

    #[test]
    fn test_provider_defaults() {
        let providers = ProvidersConfig::default();
        let wikidata = providers.settings(ProviderId::Wikidata);
        assert_eq!(wikidata.timeout, Duration::from_secs(5));
        assert_eq!(wikidata.min_interval, Duration::from_millis(100));

        let nominatim = providers.settings(ProviderId::Nominatim);
        assert_eq!(nominatim.base_url, "https://nominatim.openstreetmap.org");
        assert_eq!(nominatim.min_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let config: TomlConfig = toml::from_str(
            r#"
[providers.wikipedia]
base_url = "http://127.0.0.1:9999/"
min_interval_ms = 0
"#,
        )
        .unwrap();

        let wikipedia = config.providers.settings(ProviderId::Wikipedia);
        assert_eq!(wikipedia.base_url, "http://127.0.0.1:9999");
        assert_eq!(wikipedia.min_interval, Duration::ZERO);
        assert_eq!(wikipedia.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_sections_parse() {
        let config: TomlConfig = toml::from_str(
            r#"
[server]
port = 8080

[tagger]
endpoint = "http://tagger:8000/ner"
offsets = "bytes"

[linking]
language = "de"
enable_mirror = false
max_concurrent_entities = 4

[geocoding]
country_codes = "gb"

[cache]
capacity = 0
"#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.tagger.offsets, OffsetUnit::Bytes);
        assert_eq!(config.tagger.timeout(), Duration::from_secs(10));
        assert_eq!(config.linking.language, "de");
        assert!(!config.linking.enable_mirror);
        assert_eq!(config.geocoding.country_codes.as_deref(), Some("gb"));
        assert!(config.geocoding.enable_secondary_provider);
        assert_eq!(config.cache.capacity, 0);
    }
}
