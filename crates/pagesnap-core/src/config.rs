//! Tunable constants for snapping and interaction handling.

use crate::snap::SnapOptions;
use crate::timers::Duration;
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Engine configuration.
///
/// Every field has a default, so a partial JSON object only overrides the
/// values it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum distance (px) at which an edge or center snaps. Inclusive.
    pub snap_tolerance: f64,
    /// Whether equal-spacing positions between two neighbours are snap candidates.
    pub equal_spacing: bool,
    /// Pointer travel (px, per axis) before a drag counts as a move.
    pub drag_threshold: f64,
    /// Pointer travel (px, per axis) before a resize takes effect.
    pub resize_threshold: f64,
    /// Smallest width a resize may produce.
    pub min_width: f64,
    /// Smallest height a resize may produce.
    pub min_height: f64,
    /// Both dimensions above this floor mean the element already has real
    /// content size, so it is committed alongside the position on its first
    /// move into absolute positioning.
    pub reasonable_size_floor: f64,
    /// Keep aspect ratio on corner resizes.
    pub keep_aspect_ratio: bool,
    /// Delay before guide lines disappear after a gesture ends.
    pub indicator_clear_delay_ms: u64,
    /// Grace period before tracked rectangles are dropped after a gesture ends.
    pub cleanup_delay_ms: u64,
    /// Window after a commit during which sibling systems leave the element alone.
    pub commit_cooldown_ms: u64,
    /// Minimum spacing of property-store mirrors while dragging.
    pub drag_mirror_interval_ms: u64,
    /// Minimum spacing of property-store mirrors while resizing.
    pub resize_mirror_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            snap_tolerance: 5.0,
            equal_spacing: true,
            drag_threshold: 2.0,
            resize_threshold: 5.0,
            min_width: 20.0,
            min_height: 20.0,
            reasonable_size_floor: 20.0,
            keep_aspect_ratio: false,
            indicator_clear_delay_ms: 300,
            cleanup_delay_ms: 100,
            commit_cooldown_ms: 1200,
            drag_mirror_interval_ms: 50,
            resize_mirror_interval_ms: 500,
        }
    }
}

impl EngineConfig {
    /// Options handed to the snap resolver.
    pub fn snap_options(&self) -> SnapOptions {
        SnapOptions {
            tolerance: self.snap_tolerance,
            equal_spacing: self.equal_spacing,
        }
    }

    pub fn min_size(&self) -> Size {
        Size::new(self.min_width, self.min_height)
    }

    pub fn indicator_clear_delay(&self) -> Duration {
        Duration::from_millis(self.indicator_clear_delay_ms)
    }

    pub fn cleanup_delay(&self) -> Duration {
        Duration::from_millis(self.cleanup_delay_ms)
    }

    pub fn commit_cooldown(&self) -> Duration {
        Duration::from_millis(self.commit_cooldown_ms)
    }

    pub fn drag_mirror_interval(&self) -> Duration {
        Duration::from_millis(self.drag_mirror_interval_ms)
    }

    pub fn resize_mirror_interval(&self) -> Duration {
        Duration::from_millis(self.resize_mirror_interval_ms)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a configuration from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.snap_tolerance, 5.0);
        assert_eq!(config.drag_threshold, 2.0);
        assert_eq!(config.resize_threshold, 5.0);
        assert_eq!(config.cleanup_delay(), Duration::from_millis(100));
        assert_eq!(config.commit_cooldown(), Duration::from_millis(1200));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{ "snap_tolerance": 8, "keep_aspect_ratio": true }"#).unwrap();
        assert_eq!(config.snap_tolerance, 8.0);
        assert!(config.keep_aspect_ratio);
        assert_eq!(config.resize_threshold, 5.0);
        assert_eq!(config.min_size(), Size::new(20.0, 20.0));
    }

    #[test]
    fn test_json_roundtrip() {
        let mut config = EngineConfig::default();
        config.drag_mirror_interval_ms = 16;
        let parsed = EngineConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
