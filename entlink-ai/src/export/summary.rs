//! Headline counts for an entity set

use crate::types::Entity;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    /// Entities with coordinates
    pub geocoded: usize,
    /// Entities with a knowledge-base or encyclopedia link
    pub linked: usize,
    pub unique_types: usize,
}

impl Summary {
    pub fn from_entities(entities: &[Entity]) -> Self {
        let unique_types: HashSet<&str> = entities.iter().map(|e| e.entity_type().as_str()).collect();

        Self {
            total: entities.len(),
            geocoded: entities.iter().filter(|e| e.is_geocoded()).count(),
            linked: entities
                .iter()
                .filter(|e| e.links.knowledge_base_url.is_some() || e.links.encyclopedia_url.is_some())
                .count(),
            unique_types: unique_types.len(),
        }
    }
}
