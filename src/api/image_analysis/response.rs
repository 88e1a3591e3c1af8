// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Learned-detection response types

use serde::{Deserialize, Serialize};

use crate::detector::DetectedRegion;

/// One reported detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    /// Confidence score (0.0-1.0)
    pub confidence: f32,
    /// Corner-form box [x1, y1, x2, y2] in original-image pixels
    #[serde(rename = "box")]
    pub bounding_box: [i32; 4],
}

impl From<&DetectedRegion> for Detection {
    fn from(region: &DetectedRegion) -> Self {
        Detection {
            label: region.label.clone(),
            confidence: region.confidence,
            bounding_box: [region.x1, region.y1, region.x2, region.y2],
        }
    }
}

/// Response from the learned-detection endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageAnalysisResponse {
    pub detections: Vec<Detection>,
    /// Annotated image, base64-encoded JPEG
    pub result_image: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_conversion() {
        let region = DetectedRegion {
            x1: 1,
            y1: 2,
            x2: 30,
            y2: 40,
            label: "corrosion".to_string(),
            confidence: 0.42,
        };
        let detection = Detection::from(&region);
        assert_eq!(detection.bounding_box, [1, 2, 30, 40]);
        assert_eq!(detection.label, "corrosion");
    }

    #[test]
    fn test_response_serialization_uses_box_key() {
        let response = ImageAnalysisResponse {
            detections: vec![Detection {
                label: "crack".to_string(),
                confidence: 0.9,
                bounding_box: [0, 0, 10, 10],
            }],
            result_image: "abcd".to_string(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["detections"][0]["box"], serde_json::json!([0, 0, 10, 10]));
        assert_eq!(json["result_image"], "abcd");
    }
}
