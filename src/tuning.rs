//! Data-driven game balance
//!
//! Every gameplay constant lives here so balance can be tweaked from JSON
//! without touching simulation code. Missing fields fall back to defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected tuning overrides
#[derive(Error, Debug)]
pub enum TuningError {
    #[error("Invalid tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{0} must be a finite number")]
    NonFinite(&'static str),
    #[error("{min} must not exceed {max}")]
    InvertedRange {
        min: &'static str,
        max: &'static str,
    },
    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),
}

/// Gameplay tuning values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === World speed ===
    /// Scroll speed at run start (px/s)
    pub start_speed: f32,
    /// Scroll acceleration (px/s²)
    pub speed_rate: f32,

    // === Obstacle cadence ===
    /// Spawn interval at start speed (s)
    pub spawn_every_max: f32,
    /// Spawn interval floor (s)
    pub spawn_every_min: f32,
    /// Speed delta that shortens the interval by one second
    pub spawn_every_divisor: f32,
    /// Minimum distance from the right edge to the last obstacle (px)
    pub obstacle_gap_max: f32,
    pub obstacle_gap_min: f32,
    /// Gap shrink per px/s of extra speed
    pub obstacle_gap_slope: f32,
    /// Speed delta for +100% obstacle size
    pub obstacle_scale_divisor: f32,
    pub obstacle_scale_max: f32,
    /// Jump height that maxes out the tall-obstacle bias (px)
    pub jump_bias_height: f32,
    /// Extra height multiplier at full jump bias
    pub jump_bias_max: f32,
    /// Per-second decay of the remembered jump height
    pub jump_bias_decay: f32,

    // === Items, fans, clouds ===
    pub item_every: f32,
    pub item_chance: f32,
    pub fan_every: f32,
    pub fan_chance: f32,
    pub coin_value: f32,
    pub piglet_value: f32,
    /// Clouds spawn with probability `cloud_rate * dt` per tick
    pub cloud_rate: f32,
    pub cloud_cap: usize,
    /// Minimum horizontal/vertical edge gap between spawned entities (px)
    pub spawn_gap_x: f32,
    pub spawn_gap_y: f32,
    /// Disables all obstacle/item/fan spawning (scripted scenarios)
    pub spawning_enabled: bool,

    // === Pig physics ===
    pub gravity: f32,
    pub jump_velocity: f32,
    pub double_jump_velocity: f32,
    /// Gravity multiplier while invincible
    pub invincible_gravity_scale: f32,

    // === Invincibility ===
    pub fan_launch_velocity: f32,
    pub invincible_base: f32,
    pub invincible_per_piglet: f32,
    /// Maximum ground drop while invincible (px)
    pub ground_offset_max: f32,
    /// Ease-in / ease-out duration of the ground drop (s)
    pub ground_offset_transition: f32,
    /// Recovery rate of a leftover offset outside invincibility (1/s)
    pub ground_offset_recovery: f32,
    /// Remaining invincibility at which obstacle spawns stop (s)
    pub spawn_suppress_threshold: f32,
    /// How long obstacle spawns stay suppressed past expiry (s)
    pub spawn_suppress_overshoot: f32,
    pub grace_window: f32,
    pub absorb_radius: f32,
    pub absorb_pull_speed: f32,
    pub absorb_capture: f32,

    // === Scoring & effects ===
    /// Score per second at start speed
    pub score_rate: f32,
    /// Speed delta for +100% score rate
    pub score_speed_divisor: f32,
    pub smile_duration: f32,
    pub bleon_effect_duration: f32,
    pub hit_shake: f32,
    pub game_over_shake: f32,
    /// Visual recoil after an obstacle hit (px)
    pub hit_recoil: f32,
    pub popup_life: f32,
    pub popup_rise: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            start_speed: 330.0,
            speed_rate: 7.2 * 0.8,

            spawn_every_max: 1.15,
            spawn_every_min: 0.62,
            spawn_every_divisor: 1700.0,
            obstacle_gap_max: 160.0,
            obstacle_gap_min: 110.0,
            obstacle_gap_slope: 0.05,
            obstacle_scale_divisor: 900.0,
            obstacle_scale_max: 1.55,
            jump_bias_height: 150.0,
            jump_bias_max: 0.2,
            jump_bias_decay: 0.35,

            item_every: 2.2,
            item_chance: 0.6,
            fan_every: 9.0,
            fan_chance: 0.35,
            coin_value: 5.0,
            piglet_value: 15.0,
            cloud_rate: 0.35,
            cloud_cap: 6,
            spawn_gap_x: 96.0,
            spawn_gap_y: 36.0,
            spawning_enabled: true,

            gravity: 1550.0,
            jump_velocity: -540.0,
            double_jump_velocity: -430.0,
            invincible_gravity_scale: 0.15,

            fan_launch_velocity: -760.0,
            invincible_base: 5.0,
            invincible_per_piglet: 1.0,
            ground_offset_max: 110.0,
            ground_offset_transition: 0.6,
            ground_offset_recovery: 6.0,
            spawn_suppress_threshold: 1.2,
            spawn_suppress_overshoot: 0.8,
            grace_window: 1.0,
            absorb_radius: 190.0,
            absorb_pull_speed: 520.0,
            absorb_capture: 20.0,

            score_rate: 10.0,
            score_speed_divisor: 950.0,
            smile_duration: 0.6,
            bleon_effect_duration: 0.8,
            hit_shake: 0.5,
            game_over_shake: 0.2,
            hit_recoil: 10.0,
            popup_life: 0.8,
            popup_rise: 40.0,
        }
    }
}

impl Tuning {
    /// Parse tuning overrides; omitted fields keep their defaults.
    /// The merged result must pass `validate`.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values the simulation can't run with: non-finite numbers,
    /// inverted ranges and zero divisors
    pub fn validate(&self) -> Result<(), TuningError> {
        let fields = [
            ("start_speed", self.start_speed),
            ("speed_rate", self.speed_rate),
            ("spawn_every_max", self.spawn_every_max),
            ("spawn_every_min", self.spawn_every_min),
            ("spawn_every_divisor", self.spawn_every_divisor),
            ("obstacle_gap_max", self.obstacle_gap_max),
            ("obstacle_gap_min", self.obstacle_gap_min),
            ("obstacle_gap_slope", self.obstacle_gap_slope),
            ("obstacle_scale_divisor", self.obstacle_scale_divisor),
            ("obstacle_scale_max", self.obstacle_scale_max),
            ("jump_bias_height", self.jump_bias_height),
            ("jump_bias_max", self.jump_bias_max),
            ("jump_bias_decay", self.jump_bias_decay),
            ("item_every", self.item_every),
            ("item_chance", self.item_chance),
            ("fan_every", self.fan_every),
            ("fan_chance", self.fan_chance),
            ("coin_value", self.coin_value),
            ("piglet_value", self.piglet_value),
            ("cloud_rate", self.cloud_rate),
            ("spawn_gap_x", self.spawn_gap_x),
            ("spawn_gap_y", self.spawn_gap_y),
            ("gravity", self.gravity),
            ("jump_velocity", self.jump_velocity),
            ("double_jump_velocity", self.double_jump_velocity),
            ("invincible_gravity_scale", self.invincible_gravity_scale),
            ("fan_launch_velocity", self.fan_launch_velocity),
            ("invincible_base", self.invincible_base),
            ("invincible_per_piglet", self.invincible_per_piglet),
            ("ground_offset_max", self.ground_offset_max),
            ("ground_offset_transition", self.ground_offset_transition),
            ("ground_offset_recovery", self.ground_offset_recovery),
            ("spawn_suppress_threshold", self.spawn_suppress_threshold),
            ("spawn_suppress_overshoot", self.spawn_suppress_overshoot),
            ("grace_window", self.grace_window),
            ("absorb_radius", self.absorb_radius),
            ("absorb_pull_speed", self.absorb_pull_speed),
            ("absorb_capture", self.absorb_capture),
            ("score_rate", self.score_rate),
            ("score_speed_divisor", self.score_speed_divisor),
            ("smile_duration", self.smile_duration),
            ("bleon_effect_duration", self.bleon_effect_duration),
            ("hit_shake", self.hit_shake),
            ("game_over_shake", self.game_over_shake),
            ("hit_recoil", self.hit_recoil),
            ("popup_life", self.popup_life),
            ("popup_rise", self.popup_rise),
        ];
        if let Some(&(name, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(TuningError::NonFinite(name));
        }

        let ranges = [
            ("spawn_every_min", self.spawn_every_min, "spawn_every_max", self.spawn_every_max),
            ("obstacle_gap_min", self.obstacle_gap_min, "obstacle_gap_max", self.obstacle_gap_max),
            ("1.0", 1.0, "obstacle_scale_max", self.obstacle_scale_max),
        ];
        if let Some(&(min, _, max, _)) = ranges.iter().find(|(_, lo, _, hi)| lo > hi) {
            return Err(TuningError::InvertedRange { min, max });
        }

        let divisors = [
            ("spawn_every_divisor", self.spawn_every_divisor),
            ("obstacle_scale_divisor", self.obstacle_scale_divisor),
            ("score_speed_divisor", self.score_speed_divisor),
        ];
        if let Some(&(name, _)) = divisors.iter().find(|(_, v)| *v <= 0.0) {
            return Err(TuningError::NotPositive(name));
        }
        Ok(())
    }

    /// Obstacle spawn interval for a given speed
    pub fn spawn_every(&self, speed: f32) -> f32 {
        (self.spawn_every_max - (speed - self.start_speed) / self.spawn_every_divisor)
            .min(self.spawn_every_max)
            .max(self.spawn_every_min)
    }

    /// Required distance between the right edge and the newest obstacle
    pub fn obstacle_gap(&self, speed: f32) -> f32 {
        (self.obstacle_gap_max - (speed - self.start_speed) * self.obstacle_gap_slope)
            .min(self.obstacle_gap_max)
            .max(self.obstacle_gap_min)
    }

    /// Obstacle size multiplier for a given speed
    pub fn obstacle_scale(&self, speed: f32) -> f32 {
        (1.0 + (speed - self.start_speed) / self.obstacle_scale_divisor)
            .min(self.obstacle_scale_max)
            .max(1.0)
    }

    /// Score gained per second at a given speed
    pub fn score_per_second(&self, speed: f32) -> f32 {
        self.score_rate * (1.0 + (speed - self.start_speed) / self.score_speed_divisor)
    }

    /// Invincibility duration granted by a fan
    pub fn invincible_duration(&self, piglets: u32) -> f32 {
        self.invincible_base + piglets as f32 * self.invincible_per_piglet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override() {
        let tuning = Tuning::from_json(r#"{"gravity": 1200.0, "spawning_enabled": false}"#).unwrap();
        assert_eq!(tuning.gravity, 1200.0);
        assert!(!tuning.spawning_enabled);
        assert_eq!(tuning.start_speed, 330.0);
    }

    #[test]
    fn test_spawn_interval_clamped() {
        let tuning = Tuning::default();
        assert!((tuning.spawn_every(330.0) - 1.15).abs() < 1e-6);
        assert!((tuning.spawn_every(5000.0) - 0.62).abs() < 1e-6);
        // Inverse relation in between
        assert!(tuning.spawn_every(800.0) < tuning.spawn_every(500.0));
    }

    #[test]
    fn test_obstacle_scale_caps() {
        let tuning = Tuning::default();
        assert_eq!(tuning.obstacle_scale(330.0), 1.0);
        assert_eq!(tuning.obstacle_scale(10_000.0), 1.55);
        assert_eq!(tuning.obstacle_gap(330.0), 160.0);
        assert_eq!(tuning.obstacle_gap(10_000.0), 110.0);
    }

    #[test]
    fn test_inverted_ranges_rejected() {
        let err = Tuning::from_json(r#"{"spawn_every_min": 2.0}"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::InvertedRange {
                min: "spawn_every_min",
                ..
            }
        ));
        assert!(matches!(
            Tuning::from_json(r#"{"obstacle_scale_max": 0.9}"#),
            Err(TuningError::InvertedRange {
                max: "obstacle_scale_max",
                ..
            })
        ));
        assert!(matches!(
            Tuning::from_json(r#"{"obstacle_gap_min": 500.0}"#),
            Err(TuningError::InvertedRange { .. })
        ));
        assert!(matches!(
            Tuning::from_json(r#"{"spawn_every_divisor": 0.0}"#),
            Err(TuningError::NotPositive("spawn_every_divisor"))
        ));
        assert!(matches!(Tuning::from_json("{not json"), Err(TuningError::Parse(_))));
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_helpers_never_panic_on_unchecked_tuning() {
        // Built in code, so never validated
        let tuning = Tuning {
            spawn_every_min: 2.0,
            obstacle_scale_max: 0.9,
            obstacle_gap_min: 500.0,
            ..Default::default()
        };
        assert_eq!(tuning.spawn_every(330.0), 2.0);
        assert_eq!(tuning.obstacle_scale(2000.0), 1.0);
        assert_eq!(tuning.obstacle_gap(330.0), 500.0);
    }

    #[test]
    fn test_invincible_duration() {
        let tuning = Tuning::default();
        assert_eq!(tuning.invincible_duration(0), 5.0);
        assert_eq!(tuning.invincible_duration(3), 8.0);
    }
}
