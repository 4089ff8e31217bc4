//! Knowledge linking stage
//!
//! Sources are consulted in priority order: structured knowledge base,
//! encyclopedia full-text search, encyclopedia mirror. Links fall into two
//! categories (knowledge base, encyclopedia). A source is skipped when the
//! entity already holds a link in its category, so within a category the
//! first success wins while an entity can still carry one link per category.
//!
//! Every failure is a miss for that source only: it is logged, recorded in
//! the returned miss list, and the chain moves on.

use crate::types::{Entity, KnowledgeHit, LookupResult, ProviderMiss, SourceKind};
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Searchable knowledge source
#[async_trait]
pub trait KnowledgeSource: Send + Sync {
    /// Which source this is; determines the link category
    fn kind(&self) -> SourceKind;

    /// Search by free text; `Ok(None)` when there is no acceptable result
    async fn search(&self, term: &str) -> LookupResult<KnowledgeHit>;
}

/// Priority-ordered chain of knowledge sources
pub struct KnowledgeLinker {
    sources: Vec<Arc<dyn KnowledgeSource>>,
}

impl KnowledgeLinker {
    /// `sources` must be in priority order
    pub fn new(sources: Vec<Arc<dyn KnowledgeSource>>) -> Self {
        Self { sources }
    }

    pub fn source_kinds(&self) -> Vec<SourceKind> {
        self.sources.iter().map(|s| s.kind()).collect()
    }

    /// Link a single entity, returning the failed calls
    pub async fn link_entity(&self, entity: &mut Entity) -> Vec<ProviderMiss> {
        let mut misses = Vec::new();

        for source in &self.sources {
            let kind = source.kind();
            if entity.has_link(kind.category()) {
                continue;
            }

            match source.search(entity.text()).await {
                Ok(Some(hit)) => {
                    debug!(
                        entity = %entity.text(),
                        source = kind.as_str(),
                        url = %hit.url,
                        "Linked entity"
                    );
                    entity.apply_link(kind, hit);
                }
                Ok(None) => {
                    debug!(entity = %entity.text(), source = kind.as_str(), "No result");
                }
                Err(e) => {
                    warn!(
                        entity = %entity.text(),
                        source = kind.as_str(),
                        error = %e,
                        "Knowledge source lookup failed"
                    );
                    misses.push(ProviderMiss::new(entity.text(), kind.as_str(), entity.text(), &e));
                }
            }
        }

        misses
    }

    /// Link every entity, at most `concurrency` at a time
    ///
    /// Entities keep their order.
    pub async fn link_all(&self, entities: &mut Vec<Entity>, concurrency: usize) -> Vec<ProviderMiss> {
        let pending = std::mem::take(entities);
        let results: Vec<(Entity, Vec<ProviderMiss>)> = futures::stream::iter(pending)
            .map(|mut entity| async move {
                let misses = self.link_entity(&mut entity).await;
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

        let linked = entities.iter().filter(|e| e.has_any_link()).count();
        info!(
            entities = entities.len(),
            linked,
            misses = misses.len(),
            "Knowledge linking complete"
        );
        misses
    }
}
