// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Repair recommendation engine.
//!
//! A pure, total function over (severity, damage type). No state, no failure
//! modes.

use serde::{Serialize, Serializer};

use super::severity::{DamageObservation, DamageType};

/// Severity at or above this tier requires immediate repair.
pub const IMMEDIATE_THRESHOLD: f64 = 8.0;

/// Severity at or above this tier (and below immediate) should be scheduled.
pub const SCHEDULE_THRESHOLD: f64 = 5.0;

/// Discrete action tier for a damage observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairAction {
    Monitor,
    Schedule,
    Immediate,
}

impl RepairAction {
    /// Wire representation, kept verbatim from the service contract.
    pub fn as_str(&self) -> &'static str {
        match self {
            RepairAction::Monitor => "Monitor for further damage",
            RepairAction::Schedule => "Schedule repair within a month",
            RepairAction::Immediate => "Immediate repair required",
        }
    }
}

impl Serialize for RepairAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Recommendation produced 1:1 from a [`DamageObservation`]; location, type,
/// and severity are carried over unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepairRecommendation {
    pub location: (i32, i32),
    #[serde(rename = "type")]
    pub damage_type: DamageType,
    pub severity: f64,
    pub action: RepairAction,
    pub details: String,
}

/// Map an observation to its repair recommendation using the fixed severity
/// tiers.
pub fn recommend(observation: &DamageObservation) -> RepairRecommendation {
    let severity = observation.severity;
    let damage_type = observation.damage_type;

    let (action, details) = if severity >= IMMEDIATE_THRESHOLD {
        (
            RepairAction::Immediate,
            format!(
                "Severe {} detected. Immediate action is necessary to prevent further damage.",
                damage_type
            ),
        )
    } else if severity >= SCHEDULE_THRESHOLD {
        (
            RepairAction::Schedule,
            format!(
                "Moderate {} detected. Repair should be scheduled within a month to maintain safety and integrity.",
                damage_type
            ),
        )
    } else {
        (
            RepairAction::Monitor,
            format!(
                "Minor {} detected. Regular monitoring is recommended to ensure it does not worsen.",
                damage_type
            ),
        )
    };

    RepairRecommendation {
        location: observation.location,
        damage_type,
        severity,
        action,
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(severity: f64, damage_type: DamageType) -> DamageObservation {
        DamageObservation {
            location: (42, 17),
            severity,
            damage_type,
            bounding_box: (40, 10, 20, 20),
        }
    }

    #[test]
    fn test_severity_at_immediate_boundary() {
        let rec = recommend(&observation(8.0, DamageType::Crack));
        assert_eq!(rec.action, RepairAction::Immediate);
    }

    #[test]
    fn test_severity_just_below_immediate_boundary() {
        let rec = recommend(&observation(7.999, DamageType::Crack));
        assert_eq!(rec.action, RepairAction::Schedule);
    }

    #[test]
    fn test_severity_at_schedule_boundary() {
        let rec = recommend(&observation(5.0, DamageType::Dent));
        assert_eq!(rec.action, RepairAction::Schedule);
    }

    #[test]
    fn test_severity_just_below_schedule_boundary() {
        let rec = recommend(&observation(4.999, DamageType::Dent));
        assert_eq!(rec.action, RepairAction::Monitor);
    }

    #[test]
    fn test_recommendation_carries_observation_fields() {
        let obs = observation(6.5, DamageType::Crack);
        let rec = recommend(&obs);
        assert_eq!(rec.location, obs.location);
        assert_eq!(rec.damage_type, obs.damage_type);
        assert_eq!(rec.severity, obs.severity);
    }

    #[test]
    fn test_details_cite_damage_type() {
        let rec = recommend(&observation(9.0, DamageType::Crack));
        assert!(rec.details.contains("Severe crack"));
        assert!(rec.details.contains("Immediate action is necessary"));

        let rec = recommend(&observation(6.0, DamageType::Dent));
        assert!(rec.details.contains("Moderate dent"));

        let rec = recommend(&observation(1.0, DamageType::Dent));
        assert!(rec.details.contains("Minor dent"));
    }

    #[test]
    fn test_action_wire_strings() {
        assert_eq!(
            serde_json::to_value(RepairAction::Immediate).unwrap(),
            "Immediate repair required"
        );
        assert_eq!(
            serde_json::to_value(RepairAction::Schedule).unwrap(),
            "Schedule repair within a month"
        );
        assert_eq!(
            serde_json::to_value(RepairAction::Monitor).unwrap(),
            "Monitor for further damage"
        );
    }

    #[test]
    fn test_recommendation_serialization_shape() {
        let rec = recommend(&observation(2.0, DamageType::Dent));
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["location"], serde_json::json!([42, 17]));
        assert_eq!(json["type"], "dent");
        assert_eq!(json["action"], "Monitor for further damage");
        assert!(json["details"].as_str().unwrap().contains("Minor dent"));
    }
}
