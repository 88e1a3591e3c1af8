// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Classical contour-based damage detector.
//!
//! Grayscale → Gaussian smoothing → Canny edges → external contour tracing,
//! then severity classification per contour. A self-contained alternate
//! pipeline to the learned model; it produces [`DamageObservation`]s
//! directly and is exposed through the [`Detector`] trait via an explicit
//! adapter.

use image::DynamicImage;
use imageproc::contours::find_contours;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use tracing::debug;

use super::{DetectedRegion, DetectionParams, Detector, DetectorError};
use crate::assessment::{DamageObservation, SeverityClassifier};

/// Sigma for the smoothing pass. OpenCV's derived sigma for a 5x5 kernel.
pub const GAUSSIAN_SIGMA: f32 = 1.1;

/// Canny hysteresis thresholds.
pub const CANNY_LOW: f32 = 50.0;
pub const CANNY_HIGH: f32 = 150.0;

pub struct ContourDetector {
    classifier: SeverityClassifier,
}

impl Default for ContourDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ContourDetector {
    pub fn new() -> Self {
        Self {
            classifier: SeverityClassifier::new(),
        }
    }

    pub fn with_area_threshold(area_threshold: f64) -> Self {
        Self {
            classifier: SeverityClassifier::with_area_threshold(area_threshold),
        }
    }

    /// Run the full heuristic pipeline on a decoded image.
    ///
    /// Only external contours are considered; contours failing the area
    /// filter produce no observation.
    pub fn analyze(&self, image: &DynamicImage) -> Vec<DamageObservation> {
        let gray = image.to_luma8();
        let blurred = gaussian_blur_f32(&gray, GAUSSIAN_SIGMA);
        let edges = canny(&blurred, CANNY_LOW, CANNY_HIGH);

        let contours = find_contours::<i32>(&edges);
        let total = contours.len();

        let observations: Vec<DamageObservation> = contours
            .iter()
            .filter(|c| c.parent.is_none())
            .filter_map(|c| self.classifier.classify(&c.points))
            .collect();

        debug!(
            "Contour analysis: {} contours traced, {} qualifying observations",
            total,
            observations.len()
        );

        observations
    }
}

/// Adapter from the heuristic pipeline's output to the shared detection
/// shape. The heuristic path has no learned confidence; 1.0 marks the
/// region as unconditional.
impl From<&DamageObservation> for DetectedRegion {
    fn from(obs: &DamageObservation) -> Self {
        let (x, y, w, h) = obs.bounding_box;
        DetectedRegion {
            x1: x,
            y1: y,
            x2: x + w as i32,
            y2: y + h as i32,
            label: obs.damage_type.to_string(),
            confidence: 1.0,
        }
    }
}

impl Detector for ContourDetector {
    fn name(&self) -> &'static str {
        "contour-heuristic"
    }

    fn detect(
        &self,
        image: &DynamicImage,
        _params: &DetectionParams,
    ) -> Result<Vec<DetectedRegion>, DetectorError> {
        Ok(self.analyze(image).iter().map(DetectedRegion::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn uniform_image(width: u32, height: u32, value: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([value; 3])))
    }

    /// Black canvas with one bright filled square, which Canny turns into a
    /// clean closed contour.
    fn square_image(canvas: u32, origin: u32, side: u32) -> DynamicImage {
        let mut img = RgbImage::from_pixel(canvas, canvas, Rgb([0, 0, 0]));
        for y in origin..origin + side {
            for x in origin..origin + side {
                img.put_pixel(x, y, Rgb([255, 255, 255]));
            }
        }
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_uniform_image_yields_no_observations() {
        let detector = ContourDetector::new();
        assert!(detector.analyze(&uniform_image(64, 64, 128)).is_empty());
    }

    #[test]
    fn test_square_yields_observation_with_sane_geometry() {
        let detector = ContourDetector::new();
        let observations = detector.analyze(&square_image(128, 30, 40));
        assert!(!observations.is_empty());

        for obs in &observations {
            assert!(obs.severity > 0.0);
            let (x, y, w, h) = obs.bounding_box;
            // Edge contour sits on the square's border, within a couple of
            // pixels of blur spread
            assert!(x >= 25 && y >= 25);
            assert!(x + w as i32 <= 80 && y + h as i32 <= 80);
            let (cx, cy) = obs.location;
            assert!((cx - 50).abs() <= 4 && (cy - 50).abs() <= 4);
        }
    }

    #[test]
    fn test_small_blob_filtered_by_area() {
        // 6x6 square encloses well under 100 px²
        let detector = ContourDetector::new();
        let observations = detector.analyze(&square_image(64, 20, 6));
        assert!(observations.is_empty());
    }

    #[test]
    fn test_adapter_normalizes_to_region() {
        use crate::assessment::DamageType;
        let obs = DamageObservation {
            location: (15, 25),
            severity: 3.0,
            damage_type: DamageType::Dent,
            bounding_box: (10, 20, 11, 9),
        };
        let region = DetectedRegion::from(&obs);
        assert_eq!((region.x1, region.y1, region.x2, region.y2), (10, 20, 21, 29));
        assert_eq!(region.label, "dent");
        assert_eq!(region.confidence, 1.0);
        assert!(region.x2 >= region.x1 && region.y2 >= region.y1);
    }

    #[test]
    fn test_detector_trait_path_matches_analyze() {
        let detector = ContourDetector::new();
        let image = square_image(128, 30, 40);
        let observations = detector.analyze(&image);
        let regions = detector
            .detect(&image, &DetectionParams::default())
            .unwrap();
        assert_eq!(observations.len(), regions.len());
    }
}
