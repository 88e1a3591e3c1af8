// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use std::env;
use std::sync::Arc;
use tracing::{info, warn};

use airframe_damage_node::{
    start_server, Annotator, AppState, ContourDetector, Detector, NodeConfig, YoloDetector,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let config = NodeConfig::parse();

    info!(
        "Starting airframe-damage-node v{}",
        env!("CARGO_PKG_VERSION")
    );

    // The learned model is optional at startup: without it the heuristic
    // endpoint keeps serving and /image-analysis returns 503.
    let detector: Option<Arc<dyn Detector>> =
        match YoloDetector::load(&config.model_path, &config.labels_path) {
            Ok(model) => Some(Arc::new(model)),
            Err(e) => {
                warn!("Detection model unavailable, starting degraded: {:#}", e);
                None
            }
        };

    let annotator = match &config.font_path {
        Some(path) => match Annotator::with_font_path(path) {
            Ok(annotator) => annotator,
            Err(e) => {
                warn!("Annotation font unavailable, labels disabled: {:#}", e);
                Annotator::new()
            }
        },
        None => Annotator::new(),
    };

    let state = AppState {
        detector,
        heuristic: Arc::new(ContourDetector::with_area_threshold(config.area_threshold)),
        annotator: Arc::new(annotator),
        params: config.detection_params(),
    };

    start_server(state, &config.bind_addr()).await
}
