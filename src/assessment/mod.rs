// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Severity classification and repair recommendations for the heuristic
//! detection path.

pub mod recommend;
pub mod severity;

pub use recommend::{recommend, RepairAction, RepairRecommendation};
pub use severity::{DamageObservation, DamageType, SeverityClassifier};
