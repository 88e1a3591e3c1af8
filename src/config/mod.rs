// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Node configuration.
//!
//! Every knob is settable by flag or environment variable; defaults match
//! the service contract.

use clap::Parser;
use std::path::PathBuf;

use crate::detector::DetectionParams;

#[derive(Parser, Debug, Clone)]
#[command(name = "airframe-damage-node", about = "Surface damage assessment HTTP service")]
pub struct NodeConfig {
    /// Bind address for the API server
    #[arg(long, env = "API_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Bind port for the API server
    #[arg(long, env = "API_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Path to the ONNX detection model
    #[arg(long, env = "MODEL_PATH", default_value = "modelfiles/best.onnx")]
    pub model_path: PathBuf,

    /// Path to the newline-separated class vocabulary for the model
    #[arg(long, env = "LABELS_PATH", default_value = "modelfiles/labels.txt")]
    pub labels_path: PathBuf,

    /// Optional TTF/OTF font for annotation labels
    #[arg(long, env = "FONT_PATH")]
    pub font_path: Option<PathBuf>,

    /// Minimum confidence for reported detections
    #[arg(long, env = "CONF_THRESHOLD", default_value_t = 0.1)]
    pub confidence_threshold: f32,

    /// IoU threshold for non-maximum suppression
    #[arg(long, env = "IOU_THRESHOLD", default_value_t = 0.45)]
    pub iou_threshold: f32,

    /// Inference resolution in pixels (must be non-zero)
    #[arg(long, env = "INFERENCE_SIZE", default_value_t = 1280,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub inference_size: u32,

    /// Minimum contour area (px²) for the heuristic pipeline
    #[arg(long, env = "AREA_THRESHOLD", default_value_t = 100.0)]
    pub area_threshold: f64,
}

impl NodeConfig {
    pub fn detection_params(&self) -> DetectionParams {
        DetectionParams {
            confidence_threshold: self.confidence_threshold,
            input_size: self.inference_size,
            iou_threshold: self.iou_threshold,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_service_contract() {
        let config = NodeConfig::parse_from(["airframe-damage-node"]);
        assert_eq!(config.confidence_threshold, 0.1);
        assert_eq!(config.inference_size, 1280);
        assert_eq!(config.iou_threshold, 0.45);
        assert_eq!(config.area_threshold, 100.0);
        assert_eq!(config.port, 8080);
        assert!(config.font_path.is_none());
    }

    #[test]
    fn test_detection_params_from_config() {
        let config = NodeConfig::parse_from([
            "airframe-damage-node",
            "--confidence-threshold",
            "0.3",
            "--inference-size",
            "640",
        ]);
        let params = config.detection_params();
        assert_eq!(params.confidence_threshold, 0.3);
        assert_eq!(params.input_size, 640);
    }

    #[test]
    fn test_inference_size_zero_rejected() {
        // A zero resolution must fail at parse time, not panic mid-request
        let result =
            NodeConfig::try_parse_from(["airframe-damage-node", "--inference-size", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_bind_addr() {
        let config = NodeConfig::parse_from(["airframe-damage-node", "--port", "9001"]);
        assert_eq!(config.bind_addr(), "127.0.0.1:9001");
    }
}
