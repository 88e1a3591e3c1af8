// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::{DefaultBodyLimit, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::detector::{ContourDetector, DetectionParams, Detector};
use crate::vision::Annotator;

use super::detect_and_recommend::detect_and_recommend_handler;
use super::image_analysis::image_analysis_handler;

/// Process-wide read-only state shared across requests.
///
/// The learned detector is `None` when the model failed to load at startup;
/// the heuristic endpoint keeps serving in that degraded mode.
#[derive(Clone)]
pub struct AppState {
    pub detector: Option<Arc<dyn Detector>>,
    pub heuristic: Arc<ContourDetector>,
    pub annotator: Arc<Annotator>,
    pub params: DetectionParams,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_handler))
        // Learned-detection endpoint
        .route("/image-analysis", post(image_analysis_handler))
        // Contour-based detect-and-recommend endpoint
        .route("/detect_and_recommend", post(detect_and_recommend_handler))
        // Image cap is enforced after decode; leave headroom for the
        // multipart framing around a maximum-size upload
        .layer(DefaultBodyLimit::max(12 * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn start_server(state: AppState, addr: &str) -> anyhow::Result<()> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("API server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let model = match &state.detector {
        Some(detector) => detector.name(),
        None => "unavailable",
    };
    axum::response::Json(json!({
        "status": "ok",
        "model": model,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
