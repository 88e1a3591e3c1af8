// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod assessment;
pub mod config;
pub mod detector;
pub mod vision;

// Re-export main types
pub use api::{build_router, start_server, ApiError, AppState};
pub use assessment::{
    recommend, DamageObservation, DamageType, RepairAction, RepairRecommendation,
    SeverityClassifier,
};
pub use config::NodeConfig;
pub use detector::{
    ContourDetector, DetectedRegion, DetectionParams, Detector, DetectorError, YoloDetector,
};
pub use vision::{decode_image_bytes, encode_jpeg, to_base64, Annotator, CodecError, ImageInfo};
