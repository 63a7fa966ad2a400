//! Engine configuration.
//!
//! Every timing constant and default the engine relies on lives here so hosts
//! can tune them from a JSON object without touching code. Missing fields take
//! their defaults.

use crate::error::Result;
use crate::geometry::NormalizedPosition;
use serde::{Deserialize, Serialize};

/// Tunables for the positioning engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Quiet period after the last position change before a save. Default: **5000 ms**.
    pub save_debounce_ms: u32,

    /// Quiet period after the last window resize before re-fitting. Default: **200 ms**.
    pub resize_debounce_ms: u32,

    /// How long a widget waits for its drag surface to appear. Default: **2000 ms**.
    pub anchor_timeout_ms: u32,

    /// Delay between two drag-surface lookups. Default: **100 ms**.
    pub anchor_poll_interval_ms: u32,

    /// Minimum horizontal travel for a touch swipe to change plan. Default: **50 px**.
    pub swipe_threshold_px: f64,

    /// Trash position used until one has been stored. Default: top-right `(0.95, 0.05)`.
    pub default_trash_position: NormalizedPosition,

    /// Diameter of the trash control. Default: **40 px**.
    pub trash_size_px: f64,

    /// `localStorage` key remembering the last shown plan.
    pub storage_key: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            save_debounce_ms: 5000,
            resize_debounce_ms: 200,
            anchor_timeout_ms: 2000,
            anchor_poll_interval_ms: 100,
            swipe_threshold_px: 50.0,
            default_trash_position: NormalizedPosition { x: 0.95, y: 0.05 },
            trash_size_px: 40.0,
            storage_key: "currentFloorplanId".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON configuration. An empty string yields
    /// the defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Replace values that would stall the engine (zero poll interval) with defaults.
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.anchor_poll_interval_ms == 0 {
            log::warn!("anchorPollIntervalMs must be positive, using default");
            self.anchor_poll_interval_ms = defaults.anchor_poll_interval_ms;
        }
        if self.swipe_threshold_px.is_nan() || self.swipe_threshold_px < 0.0 {
            self.swipe_threshold_px = defaults.swipe_threshold_px;
        }
        self.default_trash_position = NormalizedPosition::new(
            self.default_trash_position.x,
            self.default_trash_position.y,
        );
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_json_yields_defaults() {
        assert_eq!(EngineConfig::from_json("").unwrap(), EngineConfig::default());
        assert_eq!(EngineConfig::from_json("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn partial_json_overrides_some_fields() {
        let config = EngineConfig::from_json(r#"{"saveDebounceMs": 1000}"#).unwrap();
        assert_eq!(config.save_debounce_ms, 1000);
        assert_eq!(config.resize_debounce_ms, 200);
    }

    #[test]
    fn zero_poll_interval_falls_back() {
        let config = EngineConfig::from_json(r#"{"anchorPollIntervalMs": 0}"#).unwrap();
        assert_eq!(config.anchor_poll_interval_ms, 100);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(EngineConfig::from_json("{nope").is_err());
    }
}
