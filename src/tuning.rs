//! Data-driven physics and difficulty tuning
//!
//! All values are in pixels and seconds. Defaults reproduce the classic feel
//! at 60 Hz (0.7 px/frame² gravity, 5.5 px/frame run speed, etc).

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Physics and camera tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Visible area width (camera clamps against this)
    pub viewport_width: f32,
    /// Visible area height (falling below it costs a life)
    pub viewport_height: f32,
    /// Downward acceleration (px/s²)
    pub gravity: f32,
    /// Vertical velocity applied on jump (px/s, negative is up)
    pub jump_velocity: f32,
    /// Horizontal run speed (px/s)
    pub move_speed: f32,
    /// Global multiplier on enemy patrol speeds from level 2 onward
    pub enemy_speed_multiplier: f32,
    /// Vertical velocity after stomping an enemy (px/s, negative is up)
    pub stomp_bounce: f32,
    /// Depth below a platform's top within which a falling player lands
    pub landing_band: f32,
    /// Fraction of the viewport kept ahead of the player's left edge
    pub camera_lead: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            viewport_width: 800.0,
            viewport_height: 600.0,
            gravity: 2520.0,
            jump_velocity: -780.0,
            move_speed: 330.0,
            enemy_speed_multiplier: 1.3,
            stomp_bounce: -480.0,
            landing_band: 30.0,
            camera_lead: 1.0 / 3.0,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON; omitted fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let tuning: Tuning =
            serde_json::from_str(json).map_err(|e| GameError::InvalidTuning(e.to_string()))?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), GameError> {
        let positive = [
            ("viewport_width", self.viewport_width),
            ("viewport_height", self.viewport_height),
            ("gravity", self.gravity),
            ("move_speed", self.move_speed),
            ("enemy_speed_multiplier", self.enemy_speed_multiplier),
            ("landing_band", self.landing_band),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(GameError::InvalidTuning(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if !self.jump_velocity.is_finite() || self.jump_velocity >= 0.0 {
            return Err(GameError::InvalidTuning(format!(
                "jump_velocity must be negative (upward), got {}",
                self.jump_velocity
            )));
        }
        if !self.stomp_bounce.is_finite() || self.stomp_bounce >= 0.0 {
            return Err(GameError::InvalidTuning(format!(
                "stomp_bounce must be negative (upward), got {}",
                self.stomp_bounce
            )));
        }
        if !(0.0..=1.0).contains(&self.camera_lead) {
            return Err(GameError::InvalidTuning(format!(
                "camera_lead must be within 0..=1, got {}",
                self.camera_lead
            )));
        }
        Ok(())
    }
}
