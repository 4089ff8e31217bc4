//! Shared helpers for entlink-ai integration tests
//!
//! - `spawn_mock`: serve an axum router on an ephemeral local port
//! - in-memory `Tagger`, `KnowledgeSource` and `Geocoder` implementations

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use entlink_ai::config::ProviderSettings;
use entlink_ai::extraction::{TaggedSpan, Tagger, TaggerError};
use entlink_ai::geocoding::Geocoder;
use entlink_ai::linking::KnowledgeSource;
use entlink_ai::types::{GeoHit, KnowledgeHit, LookupResult, SourceKind};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Serve `router` on 127.0.0.1 and return its base URL
pub async fn spawn_mock(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock server");
    let addr = listener.local_addr().expect("Mock server has no address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Mock server failed");
    });
    format!("http://{}", addr)
}

/// Provider settings for a mock server: short timeout, no rate limit
pub fn mock_settings(base_url: &str) -> ProviderSettings {
    ProviderSettings {
        base_url: base_url.to_string(),
        timeout: Duration::from_secs(2),
        min_interval: Duration::ZERO,
    }
}

pub const TEST_USER_AGENT: &str = "entlink-test/0.1";

/// Tagger that labels every occurrence of the configured phrases
pub struct PhraseTagger {
    phrases: Vec<(String, String)>,
}

impl PhraseTagger {
    pub fn new(phrases: &[(&str, &str)]) -> Self {
        Self {
            phrases: phrases
                .iter()
                .map(|(text, label)| (text.to_string(), label.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl Tagger for PhraseTagger {
    fn name(&self) -> &'static str {
        "phrase"
    }

    async fn tag(&self, text: &str) -> Result<Vec<TaggedSpan>, TaggerError> {
        let mut spans = Vec::new();
        for (phrase, label) in &self.phrases {
            for (start, matched) in text.match_indices(phrase.as_str()) {
                spans.push(TaggedSpan {
                    text: matched.to_string(),
                    label: label.clone(),
                    start,
                    end: start + matched.len(),
                });
            }
        }
        Ok(spans)
    }
}

/// Tagger that always fails
pub struct DownTagger;

#[async_trait]
impl Tagger for DownTagger {
    fn name(&self) -> &'static str {
        "down"
    }

    async fn tag(&self, _text: &str) -> Result<Vec<TaggedSpan>, TaggerError> {
        Err(TaggerError::Unavailable("connection refused".to_string()))
    }
}

/// Knowledge source answering from a fixed table
pub struct TableSource {
    kind: SourceKind,
    table: HashMap<String, KnowledgeHit>,
    calls: Mutex<usize>,
}

impl TableSource {
    pub fn new(kind: SourceKind, entries: &[(&str, &str, Option<&str>)]) -> Self {
        Self {
            kind,
            table: entries
                .iter()
                .map(|(term, url, description)| {
                    (
                        term.to_string(),
                        KnowledgeHit {
                            url: url.to_string(),
                            title: Some(term.to_string()),
                            description: description.map(str::to_string),
                        },
                    )
                })
                .collect(),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl KnowledgeSource for TableSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn search(&self, term: &str) -> LookupResult<KnowledgeHit> {
        *self.calls.lock().unwrap() += 1;
        Ok(self.table.get(term).cloned())
    }
}

/// Geocoder answering exact queries from a fixed table, recording every query
pub struct TableGeocoder {
    name: &'static str,
    table: HashMap<String, GeoHit>,
    queries: Mutex<Vec<String>>,
}

impl TableGeocoder {
    pub fn new(name: &'static str, entries: &[(&str, f64, f64, &str)]) -> Self {
        Self {
            name,
            table: entries
                .iter()
                .map(|(query, latitude, longitude, display_name)| {
                    (
                        query.to_string(),
                        GeoHit {
                            latitude: *latitude,
                            longitude: *longitude,
                            display_name: display_name.to_string(),
                        },
                    )
                })
                .collect(),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Geocoder for TableGeocoder {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn geocode(&self, query: &str) -> LookupResult<GeoHit> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.table.get(query).cloned())
    }
}
