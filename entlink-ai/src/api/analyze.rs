//! Analysis endpoints
//!
//! POST /analyze, POST /analyze/jsonld, POST /analyze/html. All three take the
//! same request body and run the full pipeline; they differ only in output.

use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    export::{render_document, to_jsonld, Summary},
    pipeline::{Analysis, AnalysisOptions, DEFAULT_TITLE},
    AppState,
};

/// Analysis request body
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "default_true")]
    pub link: bool,
    #[serde(default = "default_true")]
    pub geocode: bool,
}

fn default_true() -> bool {
    true
}

impl AnalyzeRequest {
    fn options(&self) -> AnalysisOptions {
        AnalysisOptions {
            title: self
                .title
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or(DEFAULT_TITLE)
                .to_string(),
            link: self.link,
            geocode: self.geocode,
        }
    }
}

/// POST /analyze response
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub analysis: Analysis,
    pub summary: Summary,
}

async fn run(state: &AppState, request: &AnalyzeRequest) -> ApiResult<Analysis> {
    let options = request.options();
    info!(
        chars = request.text.chars().count(),
        link = options.link,
        geocode = options.geocode,
        "Analysis requested"
    );
    state
        .pipeline
        .analyze(&request.text, &options)
        .await
        .map_err(ApiError::from)
}

/// POST /analyze
pub async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let analysis = run(&state, &request).await?;
    let summary = Summary::from_entities(&analysis.entities);
    Ok(Json(AnalyzeResponse { analysis, summary }))
}

/// POST /analyze/jsonld
pub async fn analyze_jsonld(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> ApiResult<impl IntoResponse> {
    let analysis = run(&state, &request).await?;
    let body = serde_json::to_string_pretty(&to_jsonld(&analysis))
        .map_err(|e| ApiError::Internal(format!("JSON-LD serialization failed: {}", e)))?;
    Ok(([(header::CONTENT_TYPE, "application/ld+json")], body))
}

/// POST /analyze/html
pub async fn analyze_html(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> ApiResult<Html<String>> {
    let analysis = run(&state, &request).await?;
    Ok(Html(render_document(&analysis)))
}

/// Build analysis routes
pub fn analyze_routes() -> Router<AppState> {
    Router::new()
        .route("/analyze", post(analyze))
        .route("/analyze/jsonld", post(analyze_jsonld))
        .route("/analyze/html", post(analyze_html))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request: AnalyzeRequest = serde_json::from_str(r#"{"text": "hello"}"#).unwrap();
        let options = request.options();
        assert_eq!(options.title, "text_analysis");
        assert!(options.link);
        assert!(options.geocode);
    }

    #[test]
    fn test_blank_title_falls_back() {
        let request: AnalyzeRequest =
            serde_json::from_str(r#"{"text": "hello", "title": "  ", "geocode": false}"#).unwrap();
        let options = request.options();
        assert_eq!(options.title, "text_analysis");
        assert!(!options.geocode);
    }
}
