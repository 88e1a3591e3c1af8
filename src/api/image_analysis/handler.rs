// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Learned-detection endpoint handler

use axum::extract::{Multipart, State};
use axum::Json;
use tracing::{debug, info, warn};

use super::response::{Detection, ImageAnalysisResponse};
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::api::upload::read_image_field;
use crate::vision::{decode_image_bytes, encode_jpeg, to_base64};

/// POST /image-analysis - Locate surface damage with the learned model
///
/// Accepts a multipart upload under the `image` field and returns the
/// detections plus the annotated image.
///
/// # Errors
/// - 400 Bad Request: missing image field or undecodable upload
/// - 503 Service Unavailable: detection model not loaded
/// - 500 Internal Server Error: inference or response encoding failed
pub async fn image_analysis_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ImageAnalysisResponse>, ApiError> {
    // 1. Pull the upload out of the form
    let bytes = read_image_field(&mut multipart).await.map_err(|e| {
        warn!("Image analysis request rejected: {}", e);
        e
    })?;

    // 2. Decode; failure here is a malformed upload, not a server fault
    let (image, info) = decode_image_bytes(&bytes).map_err(|e| {
        warn!("Failed to decode uploaded image: {}", e);
        ApiError::InvalidImage(format!("Error decoding image: {}", e))
    })?;
    debug!(
        "Decoded upload: {}x{}, {} bytes",
        info.width, info.height, info.size_bytes
    );

    // 3. Run inference with the process-wide model
    let detector = state.detector.as_ref().ok_or_else(|| {
        warn!("Detection model not loaded");
        ApiError::ServiceUnavailable("Detection model not loaded".to_string())
    })?;
    let regions = detector.detect(&image, &state.params).map_err(|e| {
        warn!("Model inference failed: {}", e);
        ApiError::Inference(format!("Error during model inference: {}", e))
    })?;

    // 4. Annotate a working copy and encode it for transport
    let mut canvas = image.to_rgb8();
    for region in &regions {
        state.annotator.draw_region(&mut canvas, region);
    }
    let jpeg = encode_jpeg(&canvas)
        .map_err(|e| ApiError::Processing(format!("Error processing image: {}", e)))?;
    let result_image = to_base64(&jpeg);

    info!(
        "Image analysis complete: {} detections ({}x{} upload)",
        regions.len(),
        info.width,
        info.height
    );

    Ok(Json(ImageAnalysisResponse {
        detections: regions.iter().map(Detection::from).collect(),
        result_image,
    }))
}
