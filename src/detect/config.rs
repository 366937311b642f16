// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/vigilcore

//! Detector configuration.
//!
//! The user-facing sensitivity scale is inverted from the internal
//! per-block threshold: user value 1 (least sensitive) is internal 256,
//! user value 256 is internal 1. Hosts persist [`DetectorConfig`] as they
//! see fit; the serde derives keep it format-agnostic.

use serde::{Deserialize, Serialize};

/// Lowest sensitivity on either scale.
pub const SENSITIVITY_MIN: u16 = 1;
/// Highest sensitivity on either scale.
pub const SENSITIVITY_MAX: u16 = 256;

/// Host-visible detector settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// User-scale sensitivity, 1 (least) to 256 (most sensitive).
    pub sensitivity: u16,
    /// Detected-area percentage the host considers significant. Stored and
    /// reported verbatim; the engine itself never acts on it.
    pub detected_area_threshold: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            sensitivity: SENSITIVITY_MIN,
            detected_area_threshold: 10.0,
        }
    }
}

/// Convert a user-scale sensitivity to the internal per-block threshold.
pub(crate) fn user_to_internal(user: u16) -> u16 {
    257 - user.clamp(SENSITIVITY_MIN, SENSITIVITY_MAX)
}

/// Convert an internal per-block threshold to the user scale.
pub(crate) fn internal_to_user(internal: u16) -> u16 {
    257 - internal.clamp(SENSITIVITY_MIN, SENSITIVITY_MAX)
}

/// Clamp a detected-area threshold to the percentage range.
pub(crate) fn clamp_area_threshold(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DetectorConfig::default();
        assert_eq!(config.sensitivity, 1);
        assert_eq!(config.detected_area_threshold, 10.0);
    }

    #[test]
    fn scale_inversion_round_trips() {
        for user in [1u16, 2, 100, 247, 255, 256] {
            assert_eq!(internal_to_user(user_to_internal(user)), user);
        }
        // Default user value 1 is the internal ceiling
        assert_eq!(user_to_internal(1), 256);
        assert_eq!(user_to_internal(256), 1);
    }

    #[test]
    fn out_of_range_values_clamp() {
        assert_eq!(user_to_internal(0), 256);
        assert_eq!(user_to_internal(999), 1);
        assert_eq!(clamp_area_threshold(-3.0), 0.0);
        assert_eq!(clamp_area_threshold(250.0), 100.0);
    }

    #[test]
    fn serde_round_trip() {
        let config = DetectorConfig {
            sensitivity: 200,
            detected_area_threshold: 25.5,
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: DetectorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn serde_missing_fields_use_defaults() {
        let config: DetectorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DetectorConfig::default());
    }
}
