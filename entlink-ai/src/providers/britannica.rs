//! Britannica search-page client (secondary encyclopedia mirror)
//!
//! There is no JSON API, so topic links are scraped from the search results
//! page. A link is accepted only when its text and the entity text overlap
//! (case-insensitive substring in either direction).

use super::http::ProviderHttp;
use crate::config::{ProviderId, ProviderSettings};
use crate::linking::KnowledgeSource;
use crate::types::{KnowledgeHit, LookupError, LookupResult, SourceKind};
use async_trait::async_trait;
use scraper::{Html, Selector};

pub struct BritannicaClient {
    http: ProviderHttp,
}

impl BritannicaClient {
    pub fn new(settings: &ProviderSettings, user_agent: &str) -> Result<Self, LookupError> {
        Ok(Self {
            http: ProviderHttp::new(ProviderId::Britannica.as_str(), settings, user_agent)?,
        })
    }
}

#[async_trait]
impl KnowledgeSource for BritannicaClient {
    fn kind(&self) -> SourceKind {
        SourceKind::Britannica
    }

    async fn search(&self, term: &str) -> LookupResult<KnowledgeHit> {
        let page = self.http.get_text("/search", &[("query", term)]).await?;

        Ok(find_topic_link(&page, term).map(|(path, title)| KnowledgeHit {
            url: format!("{}{}", self.http.base_url(), path),
            title: Some(title),
            description: None,
        }))
    }
}

/// First topic link whose text overlaps `term`, as `(path, title)`
pub fn find_topic_link(page: &str, term: &str) -> Option<(String, String)> {
    let document = Html::parse_document(page);
    let selector = Selector::parse("a[href^='/topic/']").ok()?;
    let term_lower = term.to_lowercase();

    document.select(&selector).find_map(|link| {
        let path = link.value().attr("href")?;
        let text = link.text().collect::<String>();
        let title = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if title.is_empty() {
            return None;
        }

        let title_lower = title.to_lowercase();
        if title_lower.contains(&term_lower) || term_lower.contains(&title_lower) {
            Some((path.to_string(), title))
        } else {
            None
        }
    })
}
