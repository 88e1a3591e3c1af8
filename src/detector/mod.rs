// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Damage detection capability.
//!
//! Two interchangeable strategies sit behind the [`Detector`] trait: the
//! learned ONNX model ([`YoloDetector`]) and the classical edge/contour
//! heuristic ([`ContourDetector`]). Handlers receive the detector as an
//! injected dependency so tests can substitute a fake.

pub mod contour;
pub mod yolo;

pub use contour::ContourDetector;
pub use yolo::YoloDetector;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectorError {
    /// The model could not process the image (unexpected shape, runtime
    /// failure). A server fault; never retried.
    #[error("inference failed: {0}")]
    Inference(String),
}

/// Per-request detection parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DetectionParams {
    /// Minimum confidence for a region to be reported (0..1).
    pub confidence_threshold: f32,
    /// Target inference resolution in pixels (letterboxed square).
    pub input_size: u32,
    /// IoU threshold for non-maximum suppression.
    pub iou_threshold: f32,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.1,
            input_size: 1280,
            iou_threshold: 0.45,
        }
    }
}

/// A detected damage region in original-image pixel coordinates.
///
/// Immutable once produced; corners always satisfy `x2 >= x1`, `y2 >= y1`.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedRegion {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    pub label: String,
    pub confidence: f32,
}

impl DetectedRegion {
    pub fn width(&self) -> u32 {
        (self.x2 - self.x1).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        (self.y2 - self.y1).max(0) as u32
    }
}

/// Detector backend trait.
///
/// Implementations must be safe for concurrent invocation; the hosting
/// handlers call `detect` from multiple requests at once.
pub trait Detector: Send + Sync {
    /// Backend identifier for logging and the health endpoint.
    fn name(&self) -> &'static str;

    /// Run detection on a decoded raster image.
    fn detect(
        &self,
        image: &DynamicImage,
        params: &DetectionParams,
    ) -> Result<Vec<DetectedRegion>, DetectorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_match_service_contract() {
        let params = DetectionParams::default();
        assert_eq!(params.confidence_threshold, 0.1);
        assert_eq!(params.input_size, 1280);
        assert_eq!(params.iou_threshold, 0.45);
    }

    #[test]
    fn test_region_dimensions() {
        let region = DetectedRegion {
            x1: 10,
            y1: 20,
            x2: 110,
            y2: 70,
            label: "crack".to_string(),
            confidence: 0.8,
        };
        assert_eq!(region.width(), 100);
        assert_eq!(region.height(), 50);
    }

    #[test]
    fn test_degenerate_region_has_zero_extent() {
        let region = DetectedRegion {
            x1: 5,
            y1: 5,
            x2: 5,
            y2: 5,
            label: "dent".to_string(),
            confidence: 0.2,
        };
        assert_eq!(region.width(), 0);
        assert_eq!(region.height(), 0);
    }
}
