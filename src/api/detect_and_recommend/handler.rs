// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detect-and-recommend endpoint handler

use axum::extract::{Multipart, State};
use axum::Json;
use tracing::{debug, info, warn};

use super::response::DetectAndRecommendResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::api::upload::read_image_field;
use crate::assessment::recommend;
use crate::vision::{decode_image_bytes, encode_jpeg, to_base64};

/// POST /detect_and_recommend - Heuristic damage detection with repair
/// recommendations
///
/// Accepts a multipart upload under the `image` field, runs the contour
/// pipeline, and returns the annotated image, per-contour damage details,
/// and one recommendation per detail.
///
/// # Errors
/// - 400 Bad Request: missing image field or undecodable upload
/// - 500 Internal Server Error: response encoding failed
pub async fn detect_and_recommend_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<DetectAndRecommendResponse>, ApiError> {
    // 1. Pull the upload out of the form
    let bytes = read_image_field(&mut multipart).await.map_err(|e| {
        warn!("Detect-and-recommend request rejected: {}", e);
        e
    })?;

    // 2. Decode
    let (image, info) = decode_image_bytes(&bytes).map_err(|e| {
        warn!("Failed to decode uploaded image: {}", e);
        ApiError::InvalidImage(format!("Error decoding image: {}", e))
    })?;
    debug!(
        "Decoded upload: {}x{}, {} bytes",
        info.width, info.height, info.size_bytes
    );

    // 3. Contour analysis on the request's own copy
    let observations = state.heuristic.analyze(&image);

    // 4. Annotate, then derive one recommendation per observation
    let mut canvas = image.to_rgb8();
    for obs in &observations {
        state.annotator.draw_observation(&mut canvas, obs);
    }
    let repair_recommendations = observations.iter().map(recommend).collect();

    let jpeg = encode_jpeg(&canvas)
        .map_err(|e| ApiError::Processing(format!("Error processing image: {}", e)))?;

    info!(
        "Detect-and-recommend complete: {} observations ({}x{} upload)",
        observations.len(),
        info.width,
        info.height
    );

    Ok(Json(DetectAndRecommendResponse {
        image: to_base64(&jpeg),
        damage_details: observations,
        repair_recommendations,
    }))
}
