//! Contextual geocoding stage
//!
//! Place-like entities without coordinates go through four strategies, first
//! success wins:
//!
//! 1. **Contextual**: the entity text qualified with expansions of the detected
//!    context keys, against the primary provider, then against map search
//! 2. **Library**: the verbatim text against each provider in order
//! 3. **Map search**: one verbatim query
//! 4. **Aggressive**: the verbatim text with fixed UK-centric suffixes, against map search
//!
//! Every call goes through the provider's own rate limiter. A failed call is a
//! miss for that attempt only.

pub mod context;

pub use context::{context_expansions, GeoContextDetector, MAX_CONTEXT_KEYS};

use crate::types::{
    Entity, EntityType, GeoHit, GeoResolution, GeocodingStrategy, LookupResult, ProviderMiss,
};
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Contextual queries sent to the primary provider
pub const MAX_PRIMARY_CONTEXT_QUERIES: usize = 5;

/// Contextual queries sent to map search
pub const MAX_MAP_SEARCH_CONTEXT_QUERIES: usize = 3;

/// Source name recorded for the map-search role
pub const MAP_SEARCH_SOURCE: &str = "map_search";

const AGGRESSIVE_SUFFIXES: &[&str] = &["", ", UK", ", England", ", Scotland", ", Wales", " city", " town"];

/// Free-text geocoding backend
#[async_trait]
pub trait Geocoder: Send + Sync {
    fn name(&self) -> &'static str;

    /// Top result for `query`; `Ok(None)` when nothing matched
    async fn geocode(&self, query: &str) -> LookupResult<GeoHit>;
}

/// Layered geocoding fallback
pub struct GeocodingResolver {
    /// Library chain; the first entry is the primary provider
    providers: Vec<Arc<dyn Geocoder>>,
    map_search: Arc<dyn Geocoder>,
}

struct Attempt<'a> {
    geocoder: &'a dyn Geocoder,
    strategy: GeocodingStrategy,
    source: String,
}

impl GeocodingResolver {
    pub fn new(providers: Vec<Arc<dyn Geocoder>>, map_search: Arc<dyn Geocoder>) -> Self {
        Self {
            providers,
            map_search,
        }
    }

    /// Resolve coordinates for one entity, returning the failed calls
    ///
    /// Entities that already have coordinates, or are not place-like, are left
    /// untouched without any external call.
    pub async fn resolve_entity(&self, entity: &mut Entity, context: &[String]) -> Vec<ProviderMiss> {
        let mut misses = Vec::new();
        if entity.is_geocoded() || !entity.entity_type().is_geocodable() {
            return misses;
        }

        for (attempt, queries) in self.plan(entity.text(), context) {
            for query in queries {
                match attempt.geocoder.geocode(&query).await {
                    Ok(Some(hit)) => {
                        debug!(
                            entity = %entity.text(),
                            query = %query,
                            strategy = ?attempt.strategy,
                            source = %attempt.source,
                            "Geocoded entity"
                        );
                        entity.geo = Some(GeoResolution {
                            latitude: hit.latitude,
                            longitude: hit.longitude,
                            location_name: hit.display_name,
                            geocoding_source: attempt.source,
                            search_term_used: query,
                        });
                        return misses;
                    }
                    Ok(None) => {
                        debug!(entity = %entity.text(), query = %query, source = %attempt.source, "No geocoding result");
                    }
                    Err(e) => {
                        warn!(
                            entity = %entity.text(),
                            query = %query,
                            provider = attempt.geocoder.name(),
                            error = %e,
                            "Geocoding lookup failed"
                        );
                        misses.push(ProviderMiss::new(entity.text(), attempt.geocoder.name(), &query, &e));
                    }
                }
            }
        }

        debug!(entity = %entity.text(), "All geocoding strategies exhausted");
        misses
    }

    /// Resolve every entity, at most `concurrency` at a time, then attach map links
    ///
    /// Entities keep their order.
    pub async fn resolve_all(
        &self,
        entities: &mut Vec<Entity>,
        context: &[String],
        concurrency: usize,
    ) -> Vec<ProviderMiss> {
        let pending = std::mem::take(entities);
        let results: Vec<(Entity, Vec<ProviderMiss>)> = futures::stream::iter(pending)
            .map(|mut entity| async move {
                let misses = self.resolve_entity(&mut entity, context).await;
                (entity, misses)
            })
            .buffered(concurrency.max(1))
            .collect()
            .await;

        let mut misses = Vec::new();
        for (entity, entity_misses) in results {
            entities.push(entity);
            misses.extend(entity_misses);
        }

        apply_map_links(entities);

        info!(
            candidates = entities.iter().filter(|e| e.entity_type().is_geocodable()).count(),
            geocoded = entities.iter().filter(|e| e.is_geocoded()).count(),
            context = ?context,
            misses = misses.len(),
            "Geocoding complete"
        );
        misses
    }

    /// Ordered attempts with their queries
    fn plan(&self, text: &str, context: &[String]) -> Vec<(Attempt<'_>, Vec<String>)> {
        let mut plan = Vec::new();
        let map_search = self.map_search.as_ref();

        if !context.is_empty() {
            let variants = contextual_variants(text, context);
            if let Some(primary) = self.providers.first() {
                plan.push((
                    Attempt {
                        geocoder: primary.as_ref(),
                        strategy: GeocodingStrategy::Contextual,
                        source: GeocodingStrategy::Contextual.source_tag(primary.name()),
                    },
                    variants.iter().take(MAX_PRIMARY_CONTEXT_QUERIES).cloned().collect(),
                ));
            }
            plan.push((
                Attempt {
                    geocoder: map_search,
                    strategy: GeocodingStrategy::Contextual,
                    source: GeocodingStrategy::Contextual.source_tag(MAP_SEARCH_SOURCE),
                },
                variants.into_iter().take(MAX_MAP_SEARCH_CONTEXT_QUERIES).collect(),
            ));
        }

        for provider in &self.providers {
            plan.push((
                Attempt {
                    geocoder: provider.as_ref(),
                    strategy: GeocodingStrategy::Library,
                    source: GeocodingStrategy::Library.source_tag(provider.name()),
                },
                vec![text.to_string()],
            ));
        }

        plan.push((
            Attempt {
                geocoder: map_search,
                strategy: GeocodingStrategy::MapSearch,
                source: GeocodingStrategy::MapSearch.source_tag(MAP_SEARCH_SOURCE),
            },
            vec![text.to_string()],
        ));

        plan.push((
            Attempt {
                geocoder: map_search,
                strategy: GeocodingStrategy::Aggressive,
                source: GeocodingStrategy::Aggressive.source_tag(MAP_SEARCH_SOURCE),
            },
            AGGRESSIVE_SUFFIXES
                .iter()
                .map(|suffix| format!("{}{}", text, suffix))
                .collect(),
        ));

        plan
    }
}

/// Query variants for the contextual strategy, deduplicated in order
///
/// The verbatim text comes first, then `"{text}, {expansion}"` for every
/// expansion of every context key.
pub fn contextual_variants(text: &str, context: &[String]) -> Vec<String> {
    let mut variants = vec![text.to_string()];

    for key in context {
        for expansion in context_expansions(key) {
            let variant = format!("{}, {}", text, expansion);
            if !variants.contains(&variant) {
                variants.push(variant);
            }
        }
    }

    variants
}

/// OpenStreetMap view centred on the coordinates
pub fn map_url(entity_type: &EntityType, latitude: f64, longitude: f64) -> String {
    let zoom = if *entity_type == EntityType::Address { 18 } else { 12 };
    format!(
        "https://www.openstreetmap.org/?mlat={}&mlon={}&zoom={}",
        latitude, longitude, zoom
    )
}

/// Set `map_url` on every geocoded entity that lacks one
pub fn apply_map_links(entities: &mut [Entity]) {
    for entity in entities.iter_mut() {
        if entity.links.map_url.is_some() {
            continue;
        }
        if let Some(geo) = &entity.geo {
            entity.links.map_url = Some(map_url(entity.entity_type(), geo.latitude, geo.longitude));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LookupError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Answers a fixed set of queries and records every call
    struct ScriptedGeocoder {
        name: &'static str,
        answers: HashMap<String, LookupResult<GeoHit>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedGeocoder {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                answers: HashMap::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn answer(mut self, query: &str, result: LookupResult<GeoHit>) -> Self {
            self.answers.insert(query.to_string(), result);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Geocoder for ScriptedGeocoder {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn geocode(&self, query: &str) -> LookupResult<GeoHit> {
            self.calls.lock().unwrap().push(query.to_string());
            self.answers.get(query).cloned().unwrap_or(Ok(None))
        }
    }

    fn place(lat: f64, lon: f64, name: &str) -> LookupResult<GeoHit> {
        Ok(Some(GeoHit {
            latitude: lat,
            longitude: lon,
            display_name: name.to_string(),
        }))
    }

    fn location(text: &str) -> Entity {
        Entity::new(text, EntityType::Location, 0, text.len(), "LOC")
    }

    #[test]
    fn test_contextual_variants() {
        let context = vec!["uk".to_string()];
        assert_eq!(
            contextual_variants("Cambridge", &context),
            vec![
                "Cambridge",
                "Cambridge, UK",
                "Cambridge, United Kingdom",
                "Cambridge, England",
                "Cambridge, Britain"
            ]
        );

        let context = vec!["london".to_string(), "uk".to_string()];
        assert_eq!(
            contextual_variants("London", &context),
            vec![
                "London",
                "London, London, UK",
                "London, London, England",
                "London, UK",
                "London, United Kingdom",
                "London, England",
                "London, Britain"
            ]
        );
    }

    #[tokio::test]
    async fn test_contextual_variant_hit() {
        let primary = Arc::new(
            ScriptedGeocoder::new("nominatim")
                .answer("Cambridge, UK", place(52.2053, 0.1218, "Cambridge, Cambridgeshire, England")),
        );
        let resolver = GeocodingResolver::new(vec![primary.clone()], primary.clone());

        let mut cambridge = location("Cambridge");
        let misses = resolver.resolve_entity(&mut cambridge, &["uk".to_string()]).await;

        assert!(misses.is_empty());
        let geo = cambridge.geo.as_ref().unwrap();
        assert_eq!(geo.latitude, 52.2053);
        assert_eq!(geo.geocoding_source, "nominatim_contextual");
        assert_eq!(geo.search_term_used, "Cambridge, UK");
        assert_eq!(primary.calls(), vec!["Cambridge", "Cambridge, UK"]);
    }

    #[tokio::test]
    async fn test_city_context_repeats_the_name_and_falls_through() {
        let geocoder = Arc::new(
            ScriptedGeocoder::new("nominatim")
                .answer("London, UK", place(51.5074, -0.1278, "London, Greater London, England")),
        );
        let resolver = GeocodingResolver::new(vec![geocoder.clone()], geocoder.clone());

        let mut london = location("London");
        resolver.resolve_entity(&mut london, &["london".to_string()]).await;

        let geo = london.geo.as_ref().unwrap();
        assert_eq!(geo.geocoding_source, "map_search_aggressive");
        assert_eq!(geo.search_term_used, "London, UK");
        assert_eq!(
            geocoder.calls(),
            vec![
                // contextual, primary then map search
                "London",
                "London, London, UK",
                "London, London, England",
                "London",
                "London, London, UK",
                "London, London, England",
                // library, map search, aggressive
                "London",
                "London",
                "London",
                "London, UK"
            ]
        );
    }

    #[tokio::test]
    async fn test_contextual_queries_are_capped_per_provider() {
        let primary = Arc::new(ScriptedGeocoder::new("nominatim"));
        let map_search = Arc::new(
            ScriptedGeocoder::new("map")
                .answer("Cambridge, United Kingdom", place(52.2053, 0.1218, "Cambridge")),
        );
        let resolver = GeocodingResolver::new(vec![primary.clone()], map_search.clone());
        let context = vec!["uk".to_string(), "usa".to_string()];
        assert_eq!(contextual_variants("Cambridge", &context).len(), 8);

        let mut cambridge = location("Cambridge");
        let misses = resolver.resolve_entity(&mut cambridge, &context).await;

        assert!(misses.is_empty());
        assert_eq!(
            primary.calls(),
            vec![
                "Cambridge",
                "Cambridge, UK",
                "Cambridge, United Kingdom",
                "Cambridge, England",
                "Cambridge, Britain"
            ]
        );
        assert_eq!(
            map_search.calls(),
            vec!["Cambridge", "Cambridge, UK", "Cambridge, United Kingdom"]
        );
        let geo = cambridge.geo.as_ref().unwrap();
        assert_eq!(geo.geocoding_source, "map_search_contextual");
        assert_eq!(geo.search_term_used, "Cambridge, United Kingdom");
    }

    #[tokio::test]
    async fn test_geocoded_entities_are_skipped() {
        let primary = Arc::new(ScriptedGeocoder::new("nominatim").answer("Leeds", place(53.8, -1.55, "Leeds")));
        let resolver = GeocodingResolver::new(vec![primary.clone()], primary.clone());

        let mut entities = vec![location("Leeds")];
        resolver.resolve_all(&mut entities, &[], 1).await;
        let calls_after_first = primary.calls().len();
        let first = entities.clone();

        resolver.resolve_all(&mut entities, &[], 1).await;
        assert_eq!(primary.calls().len(), calls_after_first);
        assert_eq!(entities, first);
    }

    #[tokio::test]
    async fn test_strategy_order_and_failures() {
        let primary = Arc::new(ScriptedGeocoder::new("nominatim").answer("Smallville", Err(LookupError::Timeout)));
        let secondary = Arc::new(ScriptedGeocoder::new("arcgis").answer("Smallville", Err(LookupError::Status(500))));
        let map_search = Arc::new(
            ScriptedGeocoder::new("map").answer("Smallville, Wales", place(52.0, -3.5, "Smallville, Wales")),
        );
        let resolver = GeocodingResolver::new(vec![primary.clone(), secondary.clone()], map_search.clone());

        let mut town = location("Smallville");
        let misses = resolver.resolve_entity(&mut town, &[]).await;

        assert_eq!(misses.len(), 2);
        assert_eq!(misses[0].provider, "nominatim");
        assert_eq!(misses[1].provider, "arcgis");
        assert_eq!(
            map_search.calls(),
            vec![
                "Smallville",
                "Smallville",
                "Smallville, UK",
                "Smallville, England",
                "Smallville, Scotland",
                "Smallville, Wales"
            ]
        );
        let geo = town.geo.as_ref().unwrap();
        assert_eq!(geo.geocoding_source, "map_search_aggressive");
        assert_eq!(geo.search_term_used, "Smallville, Wales");
    }

    #[tokio::test]
    async fn test_library_fallback_tag() {
        let primary = Arc::new(ScriptedGeocoder::new("nominatim"));
        let secondary = Arc::new(ScriptedGeocoder::new("arcgis").answer("Acme Corp", place(40.0, -75.0, "Acme Corp HQ")));
        let resolver = GeocodingResolver::new(vec![primary.clone(), secondary], primary.clone());

        let mut acme = Entity::new("Acme Corp", EntityType::Organization, 0, 9, "ORG");
        resolver.resolve_entity(&mut acme, &[]).await;

        let geo = acme.geo.as_ref().unwrap();
        assert_eq!(geo.geocoding_source, "arcgis");
        assert_eq!(geo.search_term_used, "Acme Corp");
    }

    #[tokio::test]
    async fn test_non_place_entities_are_not_geocoded() {
        let primary = Arc::new(ScriptedGeocoder::new("nominatim"));
        let resolver = GeocodingResolver::new(vec![primary.clone()], primary.clone());

        let mut entities = vec![Entity::new("Ada Lovelace", EntityType::Person, 0, 12, "PER")];
        resolver.resolve_all(&mut entities, &["uk".to_string()], 1).await;

        assert!(primary.calls().is_empty());
        assert!(!entities[0].is_geocoded());
    }

    #[tokio::test]
    async fn test_unresolved_entity_keeps_geo_fields_empty() {
        let primary = Arc::new(ScriptedGeocoder::new("nominatim"));
        let resolver = GeocodingResolver::new(vec![primary.clone()], primary.clone());

        let mut entities = vec![location("Nowhere")];
        let misses = resolver.resolve_all(&mut entities, &[], 1).await;

        assert!(misses.is_empty());
        assert!(entities[0].geo.is_none());
        assert!(entities[0].links.map_url.is_none());
        // library + map search + seven aggressive variants
        assert_eq!(primary.calls().len(), 9);
    }

    #[test]
    fn test_map_links() {
        let mut entities = vec![
            Entity::new("10 Downing Street", EntityType::Address, 0, 17, "ADDRESS"),
            location("Paris"),
            location("Atlantis"),
        ];
        for (entity, (lat, lon)) in entities.iter_mut().zip([(51.5034, -0.1276), (48.8566, 2.3522)]) {
            entity.geo = Some(GeoResolution {
                latitude: lat,
                longitude: lon,
                location_name: entity.text().to_string(),
                geocoding_source: "nominatim".to_string(),
                search_term_used: entity.text().to_string(),
            });
        }

        apply_map_links(&mut entities);

        assert_eq!(
            entities[0].links.map_url.as_deref(),
            Some("https://www.openstreetmap.org/?mlat=51.5034&mlon=-0.1276&zoom=18")
        );
        assert_eq!(
            entities[1].links.map_url.as_deref(),
            Some("https://www.openstreetmap.org/?mlat=48.8566&mlon=2.3522&zoom=12")
        );
        assert!(entities[2].links.map_url.is_none());
    }

    #[tokio::test]
    async fn test_resolve_all_runs_on_spawned_task_and_keeps_order() {
        let primary = Arc::new(
            ScriptedGeocoder::new("nominatim")
                .answer("Leeds", place(53.8, -1.55, "Leeds"))
                .answer("York", place(53.96, -1.08, "York")),
        );
        let resolver = Arc::new(GeocodingResolver::new(vec![primary.clone()], primary));

        let entities = tokio::spawn(async move {
            let mut entities = vec![location("Leeds"), location("Nowhere"), location("York")];
            resolver.resolve_all(&mut entities, &[], 3).await;
            entities
        })
        .await
        .unwrap();

        let texts: Vec<&str> = entities.iter().map(|e| e.text()).collect();
        assert_eq!(texts, vec!["Leeds", "Nowhere", "York"]);
        assert_eq!(entities[0].geo.as_ref().unwrap().latitude, 53.8);
        assert!(entities[1].geo.is_none());
        assert_eq!(entities[2].geo.as_ref().unwrap().latitude, 53.96);
        assert!(entities[2].links.map_url.is_some());
    }
}
