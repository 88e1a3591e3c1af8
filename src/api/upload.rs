// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Multipart upload extraction shared by both detection endpoints.

use axum::extract::Multipart;

use super::errors::ApiError;

/// Multipart field name both endpoints accept the upload under.
pub const IMAGE_FIELD: &str = "image";

/// Pull the raw bytes of the `image` field out of a multipart upload.
///
/// A missing field is a client error ("No image provided"), matching the
/// endpoint contract.
pub async fn read_image_field(multipart: &mut Multipart) -> Result<Vec<u8>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidRequest(format!("Multipart error: {e}")))?
    {
        if field.name() == Some(IMAGE_FIELD) {
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::InvalidRequest(format!("Failed to read image field: {e}")))?;
            return Ok(data.to_vec());
        }
    }

    Err(ApiError::InvalidRequest("No image provided".to_string()))
}
