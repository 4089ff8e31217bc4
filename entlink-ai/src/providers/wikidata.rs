//! Wikidata entity search client (structured knowledge base)
//!
//! Endpoint: `{base}/w/api.php?action=wbsearchentities`.
//! Any non-empty top result is accepted; the link is the canonical
//! entity URI built from the item identifier.

use super::http::ProviderHttp;
use crate::config::{ProviderId, ProviderSettings};
use crate::linking::KnowledgeSource;
use crate::types::{KnowledgeHit, LookupError, LookupResult, SourceKind};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// Canonical entity URI prefix
const ENTITY_URI_PREFIX: &str = "http://www.wikidata.org/entity/";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    search: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

pub struct WikidataClient {
    http: ProviderHttp,
    language: String,
}

impl WikidataClient {
    pub fn new(
        settings: &ProviderSettings,
        language: &str,
        user_agent: &str,
    ) -> Result<Self, LookupError> {
        Ok(Self {
            http: ProviderHttp::new(ProviderId::Wikidata.as_str(), settings, user_agent)?,
            language: language.to_string(),
        })
    }
}

#[async_trait]
impl KnowledgeSource for WikidataClient {
    fn kind(&self) -> SourceKind {
        SourceKind::Wikidata
    }

    async fn search(&self, term: &str) -> LookupResult<KnowledgeHit> {
        let response: SearchResponse = self
            .http
            .get_json(
                "/w/api.php",
                &[
                    ("action", "wbsearchentities"),
                    ("format", "json"),
                    ("search", term),
                    ("language", self.language.as_str()),
                    ("limit", "1"),
                    ("type", "item"),
                ],
            )
            .await?;

        let Some(top) = response.search.into_iter().next() else {
            return Ok(None);
        };
        if top.id.trim().is_empty() {
            return Ok(None);
        }

        debug!(term = %term, id = %top.id, "Wikidata match");

        Ok(Some(KnowledgeHit {
            url: format!("{}{}", ENTITY_URI_PREFIX, top.id),
            title: top.label,
            description: top.description,
        }))
    }
}
