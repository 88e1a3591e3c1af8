// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Draw detection boxes and labels onto a working copy of the image.
//!
//! Purely a visualization step; nothing drawn here feeds back into the
//! detection or severity data returned to the caller.

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use std::path::Path;
use tracing::debug;

use crate::assessment::DamageObservation;
use crate::detector::DetectedRegion;

const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const LINE_WIDTH: u32 = 2;
const LABEL_SCALE: f32 = 16.0;
const LABEL_HEIGHT: i32 = 20;

/// Box-and-label renderer.
///
/// Text labels need a TTF font resolved at startup; without one, boxes are
/// still drawn and labels are skipped.
pub struct Annotator {
    font: Option<FontVec>,
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new()
    }
}

impl Annotator {
    /// Annotator without label text.
    pub fn new() -> Self {
        Self { font: None }
    }

    /// Annotator with label text from a TTF/OTF font file.
    pub fn with_font_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        let font = FontVec::try_from_vec(data)
            .map_err(|_| anyhow::anyhow!("invalid font file {}", path.as_ref().display()))?;
        Ok(Self { font: Some(font) })
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Draw a learned-path detection: bounding box plus "label confidence".
    pub fn draw_region(&self, image: &mut RgbImage, region: &DetectedRegion) {
        self.draw_box(image, region.x1, region.y1, region.x2, region.y2);
        self.draw_label(
            image,
            &format!("{} {:.2}", region.label, region.confidence),
            region.x1,
            region.y1 - LABEL_HEIGHT,
        );
    }

    /// Draw a heuristic-path observation: bounding box plus location and
    /// severity lines above it.
    pub fn draw_observation(&self, image: &mut RgbImage, obs: &DamageObservation) {
        let (x, y, w, h) = obs.bounding_box;
        self.draw_box(image, x, y, x + w as i32, y + h as i32);
        self.draw_label(
            image,
            &format!("Location: ({}, {})", obs.location.0, obs.location.1),
            x,
            y - LABEL_HEIGHT,
        );
        self.draw_label(
            image,
            &format!("Severity: {:.2}", obs.severity),
            x,
            y - 2 * LABEL_HEIGHT,
        );
    }

    fn draw_box(&self, image: &mut RgbImage, x1: i32, y1: i32, x2: i32, y2: i32) {
        let (w, h) = (image.width() as i32, image.height() as i32);
        let x_min = x1.min(x2).clamp(0, w);
        let y_min = y1.min(y2).clamp(0, h);
        let x_max = x1.max(x2).clamp(0, w);
        let y_max = y1.max(y2).clamp(0, h);
        let rw = (x_max - x_min).max(1) as u32;
        let rh = (y_max - y_min).max(1) as u32;

        draw_hollow_rect_mut(image, Rect::at(x_min, y_min).of_size(rw, rh), BOX_COLOR);
        for t in 1..(LINE_WIDTH as i32).min(rw as i32 / 2).min(rh as i32 / 2) {
            let rw2 = rw.saturating_sub(2 * t as u32).max(1);
            let rh2 = rh.saturating_sub(2 * t as u32).max(1);
            let inner = Rect::at(x_min + t, y_min + t).of_size(rw2, rh2);
            draw_hollow_rect_mut(image, inner, BOX_COLOR);
        }
    }

    fn draw_label(&self, image: &mut RgbImage, text: &str, x: i32, y: i32) {
        let Some(font) = &self.font else {
            debug!("No annotation font loaded, skipping label '{}'", text);
            return;
        };
        draw_text_mut(
            image,
            BOX_COLOR,
            x.max(0),
            y.max(0),
            PxScale::from(LABEL_SCALE),
            font,
            text,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::DamageType;

    fn black_canvas(w: u32, h: u32) -> RgbImage {
        RgbImage::from_pixel(w, h, Rgb([0, 0, 0]))
    }

    fn region(x1: i32, y1: i32, x2: i32, y2: i32) -> DetectedRegion {
        DetectedRegion {
            x1,
            y1,
            x2,
            y2,
            label: "crack".to_string(),
            confidence: 0.85,
        }
    }

    #[test]
    fn test_draw_region_paints_box_border() {
        let mut image = black_canvas(100, 100);
        let annotator = Annotator::new();
        annotator.draw_region(&mut image, &region(20, 30, 60, 70));
        assert_eq!(*image.get_pixel(20, 30), BOX_COLOR);
        assert_eq!(*image.get_pixel(59, 50), BOX_COLOR);
        // Interior untouched
        assert_eq!(*image.get_pixel(40, 50), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_draw_region_out_of_bounds_does_not_panic() {
        let mut image = black_canvas(50, 50);
        let annotator = Annotator::new();
        annotator.draw_region(&mut image, &region(-10, -10, 200, 200));
        annotator.draw_region(&mut image, &region(49, 49, 49, 49));
    }

    #[test]
    fn test_draw_observation_paints_bounding_box() {
        let mut image = black_canvas(80, 80);
        let annotator = Annotator::new();
        let obs = DamageObservation {
            location: (30, 30),
            severity: 4.0,
            damage_type: DamageType::Dent,
            bounding_box: (20, 20, 20, 20),
        };
        annotator.draw_observation(&mut image, &obs);
        assert_eq!(*image.get_pixel(20, 20), BOX_COLOR);
    }

    #[test]
    fn test_no_font_annotator_reports_absence() {
        assert!(!Annotator::new().has_font());
    }

    #[test]
    fn test_with_font_path_rejects_non_font() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("font.ttf");
        std::fs::write(&bogus, b"not a font").unwrap();
        assert!(Annotator::with_font_path(&bogus).is_err());
    }

    #[test]
    fn test_tiny_image_does_not_panic() {
        let mut image = black_canvas(1, 1);
        Annotator::new().draw_region(&mut image, &region(0, 0, 0, 0));
    }
}
