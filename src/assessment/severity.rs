// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Contour severity classification.
//!
//! Maps a traced contour to a [`DamageObservation`]: centroid via
//! area-weighted moments, severity on a fixed linear scale, and a coarse
//! crack/dent type from shape complexity. The thresholds are part of the
//! service contract and must not be reinterpreted.

use imageproc::geometry::approximate_polygon_dp;
use imageproc::point::Point;
use serde::Serialize;
use std::fmt;

/// Contours with enclosed area at or below this many px² are discarded.
pub const AREA_THRESHOLD: f64 = 100.0;

/// Severity is `area / SEVERITY_DIVISOR`, unit-less and unbounded.
pub const SEVERITY_DIVISOR: f64 = 100.0;

/// Simplified contours with more than this many vertices classify as cracks.
pub const CRACK_VERTEX_THRESHOLD: usize = 10;

/// Douglas-Peucker tolerance for vertex counting. Traced contours carry one
/// point per border pixel; simplification collapses straight runs so the
/// count reflects actual corners.
pub const SIMPLIFY_EPSILON: f64 = 1.0;

/// Coarse damage type from contour shape complexity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DamageType {
    Crack,
    Dent,
}

impl fmt::Display for DamageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DamageType::Crack => write!(f, "crack"),
            DamageType::Dent => write!(f, "dent"),
        }
    }
}

/// A qualifying damage contour, one per contour surviving the area filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DamageObservation {
    /// Area-weighted centroid in pixel coordinates.
    pub location: (i32, i32),
    /// Non-negative, unbounded.
    pub severity: f64,
    #[serde(rename = "type")]
    pub damage_type: DamageType,
    /// Axis-aligned (x, y, width, height).
    pub bounding_box: (i32, i32, u32, u32),
}

/// Classifies contours into damage observations.
#[derive(Debug, Clone)]
pub struct SeverityClassifier {
    area_threshold: f64,
}

impl Default for SeverityClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SeverityClassifier {
    pub fn new() -> Self {
        Self {
            area_threshold: AREA_THRESHOLD,
        }
    }

    pub fn with_area_threshold(area_threshold: f64) -> Self {
        Self { area_threshold }
    }

    /// Classify one traced contour. Returns `None` for contours whose
    /// enclosed area does not exceed the threshold.
    pub fn classify(&self, contour: &[Point<i32>]) -> Option<DamageObservation> {
        let area = contour_area(contour);
        if area <= self.area_threshold {
            return None;
        }

        let simplified = approximate_polygon_dp(contour, SIMPLIFY_EPSILON, true);
        let damage_type = if simplified.len() > CRACK_VERTEX_THRESHOLD {
            DamageType::Crack
        } else {
            DamageType::Dent
        };

        Some(DamageObservation {
            location: centroid(contour),
            severity: area / SEVERITY_DIVISOR,
            damage_type,
            bounding_box: bounding_rect(contour),
        })
    }
}

/// Enclosed contour area via the shoelace formula (Green's theorem, same
/// quantity as the zeroth image moment).
pub fn contour_area(contour: &[Point<i32>]) -> f64 {
    (signed_area(contour)).abs()
}

/// Area-weighted centroid. Falls back to (0, 0) when the zeroth moment is
/// zero (degenerate contour) instead of dividing by zero.
pub fn centroid(contour: &[Point<i32>]) -> (i32, i32) {
    let m00 = signed_area(contour);
    if m00 == 0.0 {
        return (0, 0);
    }

    let mut sx = 0.0f64;
    let mut sy = 0.0f64;
    let n = contour.len();
    for i in 0..n {
        let p = contour[i];
        let q = contour[(i + 1) % n];
        let cross = (p.x as f64) * (q.y as f64) - (q.x as f64) * (p.y as f64);
        sx += (p.x + q.x) as f64 * cross;
        sy += (p.y + q.y) as f64 * cross;
    }

    ((sx / (6.0 * m00)) as i32, (sy / (6.0 * m00)) as i32)
}

fn signed_area(contour: &[Point<i32>]) -> f64 {
    if contour.len() < 3 {
        return 0.0;
    }
    let n = contour.len();
    let mut sum = 0.0f64;
    for i in 0..n {
        let p = contour[i];
        let q = contour[(i + 1) % n];
        sum += (p.x as f64) * (q.y as f64) - (q.x as f64) * (p.y as f64);
    }
    sum / 2.0
}

fn bounding_rect(contour: &[Point<i32>]) -> (i32, i32, u32, u32) {
    let mut min_x = i32::MAX;
    let mut min_y = i32::MAX;
    let mut max_x = i32::MIN;
    let mut max_y = i32::MIN;
    for p in contour {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    (
        min_x,
        min_y,
        (max_x - min_x + 1) as u32,
        (max_y - min_y + 1) as u32,
    )
}
