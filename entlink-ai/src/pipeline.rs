//! End-to-end analysis pipeline
//!
//! Stages run strictly in order for one request:
//! extraction → knowledge linking → context detection → geocoding → map links.
//! Only an extraction failure aborts the request; every linking or geocoding
//! failure is recorded in [`Analysis::misses`] and leaves the fields absent.

use crate::cache::{cache_key, AnalysisCache};
use crate::config::{ProviderId, TomlConfig};
use crate::extraction::{CapitalizationValidator, EntityExtractor, HttpTagger, TaggerError};
use crate::geocoding::{GeoContextDetector, Geocoder, GeocodingResolver};
use crate::linking::{KnowledgeLinker, KnowledgeSource};
use crate::providers::{
    ArcGisClient, BritannicaClient, NominatimClient, WikidataClient, WikipediaClient,
};
use crate::types::{Entity, LookupError, ProviderMiss};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

/// Title used when the caller does not supply one
pub const DEFAULT_TITLE: &str = "text_analysis";

/// Per-request switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_true")]
    pub link: bool,
    #[serde(default = "default_true")]
    pub geocode: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            title: default_title(),
            link: true,
            geocode: true,
        }
    }
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_true() -> bool {
    true
}

/// Completed analysis of one text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    /// Consolidated entities sorted by `start`
    pub entities: Vec<Entity>,
    /// Geographic context keys used for geocoding
    pub context: Vec<String>,
    /// Failed external calls
    pub misses: Vec<ProviderMiss>,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("entity extraction failed: {0}")]
    Extraction(#[from] TaggerError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("pipeline configuration error: {0}")]
    Configuration(String),
}

impl From<LookupError> for PipelineError {
    fn from(e: LookupError) -> Self {
        PipelineError::Configuration(e.to_string())
    }
}

/// Extraction, linking and geocoding wired together
pub struct EntityPipeline {
    extractor: EntityExtractor,
    linker: KnowledgeLinker,
    detector: GeoContextDetector,
    geocoder: Option<GeocodingResolver>,
    cache: AnalysisCache,
    concurrency: usize,
}

impl EntityPipeline {
    /// `geocoder` of `None` disables geocoding regardless of request options
    pub fn new(
        extractor: EntityExtractor,
        linker: KnowledgeLinker,
        geocoder: Option<GeocodingResolver>,
    ) -> Self {
        Self {
            extractor,
            linker,
            detector: GeoContextDetector::new(),
            geocoder,
            cache: AnalysisCache::new(0),
            concurrency: 1,
        }
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = AnalysisCache::new(capacity);
        self
    }

    /// Entities enriched concurrently by the linking and geocoding stages
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Build the production pipeline: HTTP tagger and live providers
    pub fn from_config(config: &TomlConfig) -> Result<Self, PipelineError> {
        let user_agent = entlink_common::get_user_agent();
        let providers = &config.providers;
        let language = config.linking.language.as_str();

        let tagger = HttpTagger::new(
            config.tagger.endpoint.clone(),
            config.tagger.timeout(),
            config.tagger.offsets,
            &user_agent,
        )
        .map_err(|e| PipelineError::Configuration(e.to_string()))?;
        let extractor = EntityExtractor::new(Arc::new(tagger), Arc::new(CapitalizationValidator));

        let mut sources: Vec<Arc<dyn KnowledgeSource>> = vec![
            Arc::new(WikidataClient::new(
                &providers.settings(ProviderId::Wikidata),
                language,
                &user_agent,
            )?),
            Arc::new(WikipediaClient::new(
                &providers.settings(ProviderId::Wikipedia),
                &user_agent,
            )?),
        ];
        if config.linking.enable_mirror {
            sources.push(Arc::new(BritannicaClient::new(
                &providers.settings(ProviderId::Britannica),
                &user_agent,
            )?));
        }
        let linker = KnowledgeLinker::new(sources);

        let geocoder = if config.geocoding.enabled {
            // One Nominatim client serves both roles so its rate limit is shared
            let nominatim: Arc<dyn Geocoder> = Arc::new(NominatimClient::new(
                &providers.settings(ProviderId::Nominatim),
                language,
                config.geocoding.country_codes.clone(),
                &user_agent,
            )?);
            let mut chain = vec![nominatim.clone()];
            if config.geocoding.enable_secondary_provider {
                chain.push(Arc::new(ArcGisClient::new(
                    &providers.settings(ProviderId::Arcgis),
                    &user_agent,
                )?));
            }
            Some(GeocodingResolver::new(chain, nominatim))
        } else {
            None
        };

        info!(
            tagger = %config.tagger.endpoint,
            sources = ?linker.source_kinds(),
            geocoding = geocoder.is_some(),
            cache_capacity = config.cache.capacity,
            "Pipeline configured"
        );

        Ok(Self::new(extractor, linker, geocoder)
            .with_cache_capacity(config.cache.capacity)
            .with_concurrency(config.linking.max_concurrent_entities))
    }

    /// Analyse `text`
    ///
    /// # Errors
    /// `InvalidInput` for blank text; `Extraction` when the tagger fails.
    pub async fn analyze(&self, text: &str, options: &AnalysisOptions) -> Result<Analysis, PipelineError> {
        if text.trim().is_empty() {
            return Err(PipelineError::InvalidInput("text is empty".to_string()));
        }

        let key = cache_key(text, options);
        if let Some(cached) = self.cache.get(&key) {
            debug!(id = %cached.id, "Analysis served from cache");
            return Ok(cached);
        }

        let mut entities = self.extractor.extract(text).await?;
        let mut misses = Vec::new();

        if options.link {
            misses.extend(self.linker.link_all(&mut entities, self.concurrency).await);
        }

        let mut context = Vec::new();
        if options.geocode {
            if let Some(resolver) = &self.geocoder {
                context = self.detector.detect(text, &entities);
                misses.extend(resolver.resolve_all(&mut entities, &context, self.concurrency).await);
            }
        }

        let analysis = Analysis {
            id: Uuid::new_v4(),
            title: options.title.clone(),
            text: text.to_string(),
            created_at: Utc::now(),
            entities,
            context,
            misses,
        };

        info!(
            id = %analysis.id,
            entities = analysis.entities.len(),
            misses = analysis.misses.len(),
            "Analysis complete"
        );

        self.cache.insert(key, analysis.clone());
        Ok(analysis)
    }
}
