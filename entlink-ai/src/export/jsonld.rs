//! JSON-LD export (schema.org `TextDigitalDocument`)
//!
//! `sameAs` is a single string when an entity has one link and an array when it
//! has several, in knowledge base, encyclopedia, map order. Offsets are the
//! entity's byte offsets into `text`.

use super::{all_links, description};
use crate::pipeline::Analysis;
use crate::types::Entity;
use serde::Serialize;

pub const SCHEMA_CONTEXT: &str = "http://schema.org/";

#[derive(Debug, Serialize)]
pub struct JsonLdDocument<'a> {
    #[serde(rename = "@context")]
    context: &'static str,
    #[serde(rename = "@type")]
    doc_type: &'static str,
    text: &'a str,
    #[serde(rename = "dateCreated")]
    date_created: String,
    title: &'a str,
    entities: Vec<JsonLdEntity<'a>>,
}

#[derive(Debug, Serialize)]
pub struct JsonLdEntity<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    entity_type: &'a str,
    #[serde(rename = "startOffset")]
    start_offset: usize,
    #[serde(rename = "endOffset")]
    end_offset: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    geo: Option<GeoCoordinates<'a>>,
    #[serde(rename = "sameAs", skip_serializing_if = "Option::is_none")]
    same_as: Option<SameAs<'a>>,
}

#[derive(Debug, Serialize)]
pub struct GeoCoordinates<'a> {
    #[serde(rename = "@type")]
    geo_type: &'static str,
    latitude: f64,
    longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SameAs<'a> {
    One(&'a str),
    Many(Vec<&'a str>),
}

impl<'a> From<&'a Entity> for JsonLdEntity<'a> {
    fn from(entity: &'a Entity) -> Self {
        let mut links = all_links(entity);
        let same_as = match links.len() {
            0 => None,
            1 => links.pop().map(SameAs::One),
            _ => Some(SameAs::Many(links)),
        };

        Self {
            name: entity.text(),
            entity_type: entity.entity_type().as_str(),
            start_offset: entity.start(),
            end_offset: entity.end(),
            description: description(entity),
            geo: entity.geo.as_ref().map(|geo| GeoCoordinates {
                geo_type: "GeoCoordinates",
                latitude: geo.latitude,
                longitude: geo.longitude,
                name: Some(geo.location_name.as_str()).filter(|n| !n.is_empty()),
            }),
            same_as,
        }
    }
}

/// Build the JSON-LD document for an analysis
pub fn to_jsonld(analysis: &Analysis) -> JsonLdDocument<'_> {
    JsonLdDocument {
        context: SCHEMA_CONTEXT,
        doc_type: "TextDigitalDocument",
        text: &analysis.text,
        date_created: analysis.created_at.to_rfc3339(),
        title: &analysis.title,
        entities: analysis.entities.iter().map(JsonLdEntity::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EntityType, GeoResolution};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn analysis(entities: Vec<Entity>) -> Analysis {
        Analysis {
            id: Uuid::new_v4(),
            title: "trip".to_string(),
            text: "Ada Lovelace visited London.".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            entities,
            context: vec!["london".to_string()],
            misses: Vec::new(),
        }
    }

    #[test]
    fn test_document_shape() {
        let ada = Entity::new("Ada Lovelace", EntityType::Person, 0, 12, "PER");
        let value = serde_json::to_value(to_jsonld(&analysis(vec![ada]))).unwrap();

        assert_eq!(value["@context"], "http://schema.org/");
        assert_eq!(value["@type"], "TextDigitalDocument");
        assert_eq!(value["title"], "trip");
        assert_eq!(value["dateCreated"], "2024-05-01T12:00:00+00:00");

        let entity = &value["entities"][0];
        assert_eq!(entity["name"], "Ada Lovelace");
        assert_eq!(entity["type"], "PERSON");
        assert_eq!(entity["startOffset"], 0);
        assert_eq!(entity["endOffset"], 12);
        assert!(entity.get("sameAs").is_none());
        assert!(entity.get("geo").is_none());
        assert!(entity.get("description").is_none());
    }

    #[test]
    fn test_same_as_string_or_array() {
        let mut one = Entity::new("Ada Lovelace", EntityType::Person, 0, 12, "PER");
        one.links.knowledge_base_url = Some("http://www.wikidata.org/entity/Q7259".into());

        let mut london = Entity::new("London", EntityType::Location, 21, 27, "LOC");
        london.links.knowledge_base_url = Some("http://www.wikidata.org/entity/Q84".into());
        london.links.knowledge_base_description = Some("capital of the United Kingdom".into());
        london.links.encyclopedia_url = Some("https://en.wikipedia.org/wiki/London".into());
        london.links.map_url = Some("https://www.openstreetmap.org/?mlat=51.5&mlon=-0.12&zoom=12".into());
        london.geo = Some(GeoResolution {
            latitude: 51.5,
            longitude: -0.12,
            location_name: "London, Greater London, England".into(),
            geocoding_source: "nominatim_contextual".into(),
            search_term_used: "London, UK".into(),
        });

        let value = serde_json::to_value(to_jsonld(&analysis(vec![one, london]))).unwrap();
        assert_eq!(value["entities"][0]["sameAs"], "http://www.wikidata.org/entity/Q7259");

        let london = &value["entities"][1];
        assert_eq!(
            london["sameAs"],
            serde_json::json!([
                "http://www.wikidata.org/entity/Q84",
                "https://en.wikipedia.org/wiki/London",
                "https://www.openstreetmap.org/?mlat=51.5&mlon=-0.12&zoom=12"
            ])
        );
        assert_eq!(london["description"], "capital of the United Kingdom");
        assert_eq!(london["geo"]["@type"], "GeoCoordinates");
        assert_eq!(london["geo"]["latitude"], 51.5);
        assert_eq!(london["geo"]["name"], "London, Greater London, England");
    }
}
