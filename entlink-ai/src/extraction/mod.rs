//! Entity extraction stage
//!
//! Tagger spans and address matches are turned into candidate entities and
//! consolidated into a non-overlapping set:
//!
//! 1. Drop excluded tagger classes (DATE, MONEY, ...)
//! 2. Map the label to a canonical type (drop again if it maps to an excluded class)
//! 3. Check offsets against the text and run the validator
//! 4. Add address-pattern matches
//! 5. Resolve overlaps (longest span wins)

pub mod address_matcher;
pub mod overlap;
pub mod tagger;
pub mod type_mapper;
pub mod validator;

pub use address_matcher::extract_addresses;
pub use overlap::resolve_overlaps;
pub use tagger::{HttpTagger, OffsetUnit, TaggedSpan, Tagger, TaggerError};
pub use type_mapper::{is_excluded, map_entity_type, map_label, EXCLUDED_LABELS};
pub use validator::{CapitalizationValidator, EntityValidator};

use crate::types::Entity;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Runs the tagger and consolidates its output with address matches
pub struct EntityExtractor {
    tagger: Arc<dyn Tagger>,
    validator: Arc<dyn EntityValidator>,
}

impl EntityExtractor {
    pub fn new(tagger: Arc<dyn Tagger>, validator: Arc<dyn EntityValidator>) -> Self {
        Self { tagger, validator }
    }

    /// Extract the consolidated entity set for `text`
    ///
    /// # Errors
    /// Returns `TaggerError` when the tagger fails; no partial set is produced.
    pub async fn extract(&self, text: &str) -> Result<Vec<Entity>, TaggerError> {
        let spans = self.tagger.tag(text).await?;
        let tagged = spans.len();

        let mut candidates: Vec<Entity> = spans
            .into_iter()
            .filter_map(|span| self.entity_from_span(text, span))
            .collect();
        let accepted_spans = candidates.len();

        let addresses = extract_addresses(text);
        let address_count = addresses.len();
        candidates.extend(addresses);

        let entities = resolve_overlaps(candidates);

        info!(
            tagger = self.tagger.name(),
            tagged,
            accepted_spans,
            addresses = address_count,
            entities = entities.len(),
            "Entity extraction complete"
        );

        Ok(entities)
    }

    fn entity_from_span(&self, text: &str, span: TaggedSpan) -> Option<Entity> {
        if is_excluded(&span.label) {
            return None;
        }

        let entity_type = map_entity_type(&span.label);
        if is_excluded(entity_type.as_str()) {
            return None;
        }

        if span.start >= span.end
            || span.end > text.len()
            || !text.is_char_boundary(span.start)
            || !text.is_char_boundary(span.end)
        {
            warn!(
                span = %span.text,
                start = span.start,
                end = span.end,
                "Tagger span has invalid offsets, dropped"
            );
            return None;
        }

        // The text slice is authoritative for the entity text
        let slice = &text[span.start..span.end];
        if slice != span.text {
            debug!(reported = %span.text, actual = %slice, "Tagger span text differs from offsets");
        }

        if !self.validator.is_valid(slice, &entity_type) {
            debug!(
                span = %slice,
                entity_type = %entity_type,
                validator = self.validator.name(),
                "Span rejected by validator"
            );
            return None;
        }

        Some(Entity::new(slice, entity_type, span.start, span.end, span.label))
    }
}
