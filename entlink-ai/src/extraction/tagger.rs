//! Sequence tagger adapter
//!
//! The tagging model is an external capability: given text, it returns
//! labeled spans. [`HttpTagger`] talks to a tagging service over HTTP
//! (`POST {"text": ...}`), the way the provider clients talk to their APIs.
//!
//! Spans returned by any [`Tagger`] carry UTF-8 byte offsets.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Labeled span produced by a tagger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedSpan {
    pub text: String,
    pub label: String,
    pub start: usize,
    pub end: usize,
}

/// Tagger failure; fatal to the analysis request
#[derive(Debug, Error)]
pub enum TaggerError {
    #[error("tagger unavailable: {0}")]
    Unavailable(String),

    #[error("tagger returned HTTP status {0}")]
    Status(u16),

    #[error("tagger response could not be parsed: {0}")]
    Parse(String),
}

/// Opaque tagging capability
#[async_trait]
pub trait Tagger: Send + Sync {
    /// Tagger name for logging
    fn name(&self) -> &'static str;

    /// Tag `text`, returning spans with byte offsets into `text`
    async fn tag(&self, text: &str) -> Result<Vec<TaggedSpan>, TaggerError>;
}

/// Offset unit used by the remote tagging service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OffsetUnit {
    /// Unicode scalar values (what most Python taggers report)
    #[default]
    Chars,
    /// UTF-8 bytes
    Bytes,
}

#[derive(Serialize)]
struct TagRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TagResponse {
    Bare(Vec<TaggedSpan>),
    Wrapped { spans: Vec<TaggedSpan> },
}

impl TagResponse {
    fn into_spans(self) -> Vec<TaggedSpan> {
        match self {
            TagResponse::Bare(spans) | TagResponse::Wrapped { spans } => spans,
        }
    }
}

/// HTTP tagging service client
pub struct HttpTagger {
    client: Client,
    endpoint: String,
    offsets: OffsetUnit,
}

impl HttpTagger {
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Duration,
        offsets: OffsetUnit,
        user_agent: &str,
    ) -> Result<Self, TaggerError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| TaggerError::Unavailable(format!("HTTP client init failed: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            offsets,
        })
    }
}

#[async_trait]
impl Tagger for HttpTagger {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn tag(&self, text: &str) -> Result<Vec<TaggedSpan>, TaggerError> {
        debug!(endpoint = %self.endpoint, chars = text.chars().count(), "Calling tagger");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&TagRequest { text })
            .send()
            .await
            .map_err(|e| TaggerError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TaggerError::Status(status.as_u16()));
        }

        let spans = response
            .json::<TagResponse>()
            .await
            .map_err(|e| TaggerError::Parse(e.to_string()))?
            .into_spans();

        Ok(match self.offsets {
            OffsetUnit::Bytes => spans,
            OffsetUnit::Chars => char_spans_to_byte_spans(text, spans),
        })
    }
}

/// Convert character offsets to byte offsets, dropping spans outside the text
pub fn char_spans_to_byte_spans(text: &str, spans: Vec<TaggedSpan>) -> Vec<TaggedSpan> {
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();

    spans
        .into_iter()
        .filter_map(|span| {
            match (boundaries.get(span.start), boundaries.get(span.end)) {
                (Some(&start), Some(&end)) => Some(TaggedSpan { start, end, ..span }),
                _ => {
                    warn!(
                        span = %span.text,
                        start = span.start,
                        end = span.end,
                        "Tagger span outside text, dropped"
                    );
                    None
                }
            }
        })
        .collect()
}
