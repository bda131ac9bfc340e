use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: f64,
    },
}

/// Tuning constants for one carousel engine.
///
/// Every field has a default, so a config file only needs to name what it
/// overrides. Distances are layout units (CSS pixels in a browser), times
/// are milliseconds, velocities are units per millisecond.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// The engine only runs while the viewport is strictly narrower than this.
    pub breakpoint: f64,
    /// Space between adjacent items, added to the measured item width.
    pub item_gap: f64,
    /// Multiplier from pointer travel to scroll displacement.
    pub drag_gain: f64,
    /// Lower bound on the time between two pointer samples when estimating
    /// velocity.
    pub min_sample_interval_ms: f64,
    /// Release speed above which momentum runs instead of an immediate snap.
    pub launch_velocity: f64,
    /// Momentum stops once speed falls to this.
    pub velocity_floor: f64,
    /// Per-tick velocity multiplier during momentum.
    pub decay: f64,
    /// Nominal frame duration used as the momentum step.
    pub frame_ms: f64,
    /// How long the adjustment lock is held after a wrap rewrite.
    pub lock_window_ms: f64,
    /// Delay between a smooth snap and its follow-up wrap check.
    pub snap_settle_ms: f64,
    pub scroll_debounce_ms: f64,
    pub resize_debounce_ms: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            breakpoint: 768.0,
            item_gap: 20.0,
            drag_gain: 1.2,
            min_sample_interval_ms: 1.0,
            launch_velocity: 0.3,
            velocity_floor: 0.1,
            decay: 0.95,
            frame_ms: 16.0,
            lock_window_ms: 50.0,
            snap_settle_ms: 350.0,
            scroll_debounce_ms: 100.0,
            resize_debounce_ms: 250.0,
        }
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON config and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Whether the engine should run at this viewport width.
    pub fn is_active_width(&self, viewport_width: f64) -> bool {
        viewport_width < self.breakpoint
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check("breakpoint", "> 0", self.breakpoint, self.breakpoint > 0.0)?;
        check("item_gap", ">= 0", self.item_gap, self.item_gap >= 0.0)?;
        check("drag_gain", "> 0", self.drag_gain, self.drag_gain > 0.0)?;
        check(
            "min_sample_interval_ms",
            "> 0",
            self.min_sample_interval_ms,
            self.min_sample_interval_ms > 0.0,
        )?;
        check(
            "velocity_floor",
            "> 0",
            self.velocity_floor,
            self.velocity_floor > 0.0,
        )?;
        check(
            "launch_velocity",
            ">= velocity_floor",
            self.launch_velocity,
            self.launch_velocity >= self.velocity_floor,
        )?;
        check(
            "decay",
            "in (0, 1)",
            self.decay,
            self.decay > 0.0 && self.decay < 1.0,
        )?;
        check("frame_ms", "> 0", self.frame_ms, self.frame_ms > 0.0)?;
        check(
            "lock_window_ms",
            ">= frame_ms",
            self.lock_window_ms,
            self.lock_window_ms >= self.frame_ms,
        )?;
        check(
            "snap_settle_ms",
            ">= 0",
            self.snap_settle_ms,
            self.snap_settle_ms >= 0.0,
        )?;
        check(
            "scroll_debounce_ms",
            ">= 0",
            self.scroll_debounce_ms,
            self.scroll_debounce_ms >= 0.0,
        )?;
        check(
            "resize_debounce_ms",
            ">= 0",
            self.resize_debounce_ms,
            self.resize_debounce_ms >= 0.0,
        )?;
        Ok(())
    }
}

fn check(
    field: &'static str,
    expected: &'static str,
    value: f64,
    ok: bool,
) -> Result<(), ConfigError> {
    // NaN fails every comparison above, infinities are caught here.
    if ok && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            expected,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{"item_gap": 16, "lock_window_ms": 80}"#).unwrap();
        assert_eq!(config.item_gap, 16.0);
        assert_eq!(config.lock_window_ms, 80.0);
        assert_eq!(config.decay, 0.95);
        assert_eq!(config.breakpoint, 768.0);
    }

    #[test]
    fn rejects_runaway_decay() {
        let err = EngineConfig::from_json(r#"{"decay": 1.0}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange { field: "decay", .. }
        ));
    }

    #[test]
    fn lock_must_outlast_a_frame() {
        let config = EngineConfig {
            lock_window_ms: 10.0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            EngineConfig::from_json("{"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn breakpoint_is_exclusive() {
        let config = EngineConfig::default();
        assert!(config.is_active_width(767.0));
        assert!(!config.is_active_width(768.0));
        assert!(!config.is_active_width(1024.0));
    }
}
