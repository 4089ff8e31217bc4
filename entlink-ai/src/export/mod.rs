//! Output formats for a completed analysis
//!
//! - [`jsonld`]: schema.org `TextDigitalDocument`
//! - [`html`]: the source text with linked entities highlighted
//! - [`summary`]: headline counts
//!
//! All exporters read entities only; nothing here mutates an analysis.

pub mod html;
pub mod jsonld;
pub mod summary;

pub use html::{highlight_entities, render_document};
pub use jsonld::to_jsonld;
pub use summary::Summary;

use crate::types::{Entity, SourceKind};

/// The single link shown for an entity
///
/// Order: primary encyclopedia, knowledge base, encyclopedia mirror, map.
pub fn primary_link(entity: &Entity) -> Option<&str> {
    let links = &entity.links;
    let encyclopedia = links.encyclopedia_url.as_deref();

    if links.encyclopedia_source == Some(SourceKind::Wikipedia) && encyclopedia.is_some() {
        return encyclopedia;
    }
    links
        .knowledge_base_url
        .as_deref()
        .or(encyclopedia)
        .or(links.map_url.as_deref())
}

/// Best available description: knowledge base, encyclopedia snippet, encyclopedia title
pub fn description(entity: &Entity) -> Option<&str> {
    let links = &entity.links;
    links
        .knowledge_base_description
        .as_deref()
        .or(links.encyclopedia_description.as_deref())
        .or(links.encyclopedia_title.as_deref())
}

/// Every external link in export order: knowledge base, encyclopedia, map
pub fn all_links(entity: &Entity) -> Vec<&str> {
    let links = &entity.links;
    [
        links.knowledge_base_url.as_deref(),
        links.encyclopedia_url.as_deref(),
        links.map_url.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect()
}
