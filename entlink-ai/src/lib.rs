//! entlink-ai library interface
//!
//! Entity extraction, knowledge linking and contextual geocoding, plus the
//! HTTP service that hosts them. Exposed as a library for integration testing.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod extraction;
pub mod geocoding;
pub mod linking;
pub mod pipeline;
pub mod providers;
pub mod types;

pub use crate::error::{ApiError, ApiResult};
pub use crate::pipeline::{Analysis, AnalysisOptions, EntityPipeline, PipelineError};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<EntityPipeline>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(pipeline: Arc<EntityPipeline>) -> Self {
        Self {
            pipeline,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::analyze_routes())
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
