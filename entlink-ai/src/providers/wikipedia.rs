//! Wikipedia full-text search client (primary encyclopedia)
//!
//! Endpoint: `{base}/w/api.php?action=query&list=search`.
//! The top result becomes the article link; its snippet is stripped of
//! markup and truncated to 200 characters for the description.

use super::http::ProviderHttp;
use crate::config::{ProviderId, ProviderSettings};
use crate::linking::KnowledgeSource;
use crate::types::{KnowledgeHit, LookupError, LookupResult, SourceKind};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

/// Snippet length kept before the ellipsis
pub const SNIPPET_MAX_CHARS: usize = 200;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    query: Option<QueryBody>,
}

#[derive(Debug, Deserialize)]
struct QueryBody {
    #[serde(default)]
    search: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    title: String,
    #[serde(default)]
    snippet: Option<String>,
}

pub struct WikipediaClient {
    http: ProviderHttp,
}

impl WikipediaClient {
    pub fn new(settings: &ProviderSettings, user_agent: &str) -> Result<Self, LookupError> {
        Ok(Self {
            http: ProviderHttp::new(ProviderId::Wikipedia.as_str(), settings, user_agent)?,
        })
    }

    fn article_url(&self, title: &str) -> String {
        format!(
            "{}/wiki/{}",
            self.http.base_url(),
            urlencoding::encode(&title.replace(' ', "_"))
        )
    }
}

#[async_trait]
impl KnowledgeSource for WikipediaClient {
    fn kind(&self) -> SourceKind {
        SourceKind::Wikipedia
    }

    async fn search(&self, term: &str) -> LookupResult<KnowledgeHit> {
        let response: QueryResponse = self
            .http
            .get_json(
                "/w/api.php",
                &[
                    ("action", "query"),
                    ("format", "json"),
                    ("list", "search"),
                    ("srsearch", term),
                    ("srlimit", "1"),
                ],
            )
            .await?;

        let Some(top) = response.query.and_then(|q| q.search.into_iter().next()) else {
            return Ok(None);
        };
        if top.title.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(KnowledgeHit {
            url: self.article_url(&top.title),
            description: top.snippet.as_deref().map(clean_snippet),
            title: Some(top.title),
        }))
    }
}

/// Strip markup, decode common entities and truncate to [`SNIPPET_MAX_CHARS`]
pub fn clean_snippet(snippet: &str) -> String {
    let text = HTML_TAG.replace_all(snippet, "");
    let text = text
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");

    if text.chars().count() > SNIPPET_MAX_CHARS {
        let truncated: String = text.chars().take(SNIPPET_MAX_CHARS).collect();
        format!("{}...", truncated)
    } else {
        text
    }
}
