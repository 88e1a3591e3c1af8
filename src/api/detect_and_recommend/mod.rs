// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Contour-based detect-and-recommend endpoint module.
//!
//! Provides POST /detect_and_recommend for the heuristic damage pipeline
//! with repair recommendations.

pub mod handler;
pub mod response;

pub use handler::detect_and_recommend_handler;
pub use response::DetectAndRecommendResponse;
