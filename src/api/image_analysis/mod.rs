// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Learned-detection endpoint module.
//!
//! Provides POST /image-analysis for locating damage with the ONNX model.

pub mod handler;
pub mod response;

pub use handler::image_analysis_handler;
pub use response::{Detection, ImageAnalysisResponse};
