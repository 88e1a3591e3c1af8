// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image decoding and transport encoding for the damage endpoints.
//!
//! Uploads arrive as raw container bytes (JPEG/PNG/...); responses carry the
//! annotated raster re-encoded as JPEG and wrapped in base64.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbImage};
use thiserror::Error;

/// Maximum upload size (10MB)
const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// JPEG quality for response images. Matches the OpenCV imencode default the
/// service contract was written against.
const JPEG_QUALITY: u8 = 95;

/// Errors from decoding an upload or encoding a response image.
///
/// Decode variants are client faults; `EncodeFailed` is a server fault.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Image data is empty")]
    EmptyData,

    #[error("Image data is too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Failed to encode image: {0}")]
    EncodeFailed(String),
}

/// Image metadata extracted during decoding
#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub size_bytes: usize,
}

/// Decode raw upload bytes into a raster image.
///
/// The container format is auto-detected from magic bytes; empty, oversized,
/// truncated, or unrecognized input fails. Any failure here must be reported
/// to the caller as a malformed upload, not a server fault.
pub fn decode_image_bytes(bytes: &[u8]) -> Result<(DynamicImage, ImageInfo), CodecError> {
    if bytes.is_empty() {
        return Err(CodecError::EmptyData);
    }
    if bytes.len() > MAX_IMAGE_SIZE {
        return Err(CodecError::TooLarge(bytes.len(), MAX_IMAGE_SIZE));
    }

    let format = detect_format(bytes)?;

    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| CodecError::DecodeFailed(e.to_string()))?;

    let info = ImageInfo {
        width: img.width(),
        height: img.height(),
        format,
        size_bytes: bytes.len(),
    };

    Ok((img, info))
}

/// Encode an annotated raster as JPEG bytes at the fixed response quality.
pub fn encode_jpeg(image: &RgbImage) -> Result<Vec<u8>, CodecError> {
    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
    image
        .write_with_encoder(encoder)
        .map_err(|e| CodecError::EncodeFailed(e.to_string()))?;
    Ok(bytes)
}

/// Base64 transport representation of encoded image bytes.
pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Detect image format from magic bytes
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, CodecError> {
    if bytes.len() < 4 {
        return Err(CodecError::UnsupportedFormat);
    }

    match bytes {
        // PNG: 89 50 4E 47 (0x89 P N G)
        [0x89, 0x50, 0x4E, 0x47, ..] => Ok(ImageFormat::Png),

        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Ok(ImageFormat::Jpeg),

        // WebP: RIFF .... WEBP
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Ok(ImageFormat::WebP),

        // GIF: GIF87a or GIF89a
        [0x47, 0x49, 0x46, 0x38, x, ..] if *x == 0x37 || *x == 0x39 => Ok(ImageFormat::Gif),

        // BMP: BM
        [0x42, 0x4D, ..] => Ok(ImageFormat::Bmp),

        // TIFF: II (little-endian) or MM (big-endian)
        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => Ok(ImageFormat::Tiff),

        _ => Err(CodecError::UnsupportedFormat),
    }
}
