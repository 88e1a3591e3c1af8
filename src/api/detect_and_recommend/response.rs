// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detect-and-recommend response types

use serde::Serialize;

use crate::assessment::{DamageObservation, RepairRecommendation};

/// Response from the heuristic detect-and-recommend endpoint.
///
/// `damage_details` and `repair_recommendations` are always the same length;
/// each recommendation carries its observation's location, type, and
/// severity unchanged.
#[derive(Debug, Clone, Serialize)]
pub struct DetectAndRecommendResponse {
    /// Annotated image, base64-encoded JPEG
    pub image: String,
    pub damage_details: Vec<DamageObservation>,
    pub repair_recommendations: Vec<RepairRecommendation>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::{recommend, DamageType};

    #[test]
    fn test_response_serialization_shape() {
        let obs = DamageObservation {
            location: (10, 12),
            severity: 6.0,
            damage_type: DamageType::Crack,
            bounding_box: (5, 6, 10, 12),
        };
        let response = DetectAndRecommendResponse {
            image: "aaaa".to_string(),
            repair_recommendations: vec![recommend(&obs)],
            damage_details: vec![obs],
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["damage_details"][0]["location"], serde_json::json!([10, 12]));
        assert_eq!(json["damage_details"][0]["type"], "crack");
        assert_eq!(
            json["repair_recommendations"][0]["action"],
            "Schedule repair within a month"
        );
        assert_eq!(json["image"], "aaaa");
    }
}
