//! Game tuning
//!
//! Every balance knob lives here. Values are loaded from JSON (any missing
//! field falls back to its default) and validated before a run starts.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{MIN_PLATFORM_ADVANCE, MIN_TOOTH_WIDTH};

/// Tuning load/validation failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read tuning file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} = {value} is outside [{lo}, {hi}]")]
    OutOfRange {
        field: &'static str,
        value: f32,
        lo: f32,
        hi: f32,
    },
    #[error("{field}: min {min} exceeds max {max}")]
    InvertedRange {
        field: &'static str,
        min: f32,
        max: f32,
    },
}

/// Track layout: platform sizes, gaps and the vertical band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackTuning {
    /// How far ahead of the actor the track is kept generated
    pub spawn_ahead_distance: f32,
    /// Leading-edge cursor start, relative to the actor's x at run start
    pub start_offset: f32,
    pub min_width: f32,
    pub max_width: f32,
    pub min_gap: f32,
    pub max_gap: f32,
    /// Gap before the very first platform (keeps the opening jump fair)
    pub first_gap: f32,
    pub min_y: f32,
    pub max_y: f32,
    pub platform_thickness: f32,
    /// Distance below `min_y` at which a falling actor is considered lost
    pub fall_depth: f32,
}

impl Default for TrackTuning {
    fn default() -> Self {
        Self {
            spawn_ahead_distance: 25.0,
            start_offset: 2.0,
            min_width: 2.0,
            max_width: 3.5,
            min_gap: 1.2,
            max_gap: 3.0,
            first_gap: 2.0,
            min_y: -2.5,
            max_y: 3.0,
            platform_thickness: crate::consts::PLATFORM_THICKNESS,
            fall_depth: 7.0,
        }
    }
}

/// Jump and run kinematics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpTuning {
    /// Gravity magnitude (sign is ignored)
    pub gravity: f32,
    pub gravity_scale: f32,
    pub desired_jump_height: f32,
    /// Grace window after leaving the ground (seconds); also the grounded
    /// jump window, so it must be positive
    pub coyote_time: f32,
    /// Horizontal speed at full sanity
    pub base_move_speed: f32,
}

impl Default for JumpTuning {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            gravity_scale: 2.5,
            desired_jump_height: 2.5,
            coyote_time: 0.1,
            base_move_speed: 5.0,
        }
    }
}

/// A spike strip definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardSpec {
    /// Sanity lost per contact episode
    pub damage: f32,
    /// How far the strip sinks into the platform top
    pub seat_skin: f32,
    pub tooth_width: f32,
    pub tooth_height: f32,
}

impl Default for HazardSpec {
    fn default() -> Self {
        Self {
            damage: 0.10,
            seat_skin: 0.01,
            tooth_width: 0.5,
            tooth_height: 0.3,
        }
    }
}

/// A pickup orb definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectibleSpec {
    /// Sanity restored on pickup
    pub heal: f32,
    /// Diameter in world units, independent of the platform's scale
    pub diameter: f32,
}

impl Default for CollectibleSpec {
    fn default() -> Self {
        Self {
            heal: 0.10,
            diameter: 0.70,
        }
    }
}

/// Decoration frequency, mix and placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecorTuning {
    /// Force a hazard after this many empties (inclusive range)
    pub force_hazard_after_min: u32,
    pub force_hazard_after_max: u32,
    pub reroll_force_threshold: bool,
    /// Chance a platform gets any decoration before streak boosts
    pub base_chance: f32,
    pub streak_boost_per_empty: f32,
    pub hazard_boost_per_empty: f32,
    /// Minimum empty platforms between any two decorations
    pub min_empty_between: u32,
    pub hazard_weight: f32,
    pub collectible_weight: f32,
    /// Fraction of the platform width covered by a hazard strip
    pub hazard_width_factor: f32,
    /// Height of a collectible above the platform top
    pub collectible_y_offset: f32,
    /// Horizontal margin kept free at both platform ends for collectibles
    pub collectible_inset: f32,
    /// Draw-order boost so decorations render above their platform
    pub render_order_boost: i32,
    /// `None` means the hazard asset is unavailable
    pub hazard: Option<HazardSpec>,
    /// `None` means the collectible asset is unavailable
    pub collectible: Option<CollectibleSpec>,
}

impl Default for DecorTuning {
    fn default() -> Self {
        Self {
            force_hazard_after_min: 4,
            force_hazard_after_max: 5,
            reroll_force_threshold: true,
            base_chance: 0.55,
            streak_boost_per_empty: 0.10,
            hazard_boost_per_empty: 0.08,
            min_empty_between: 0,
            hazard_weight: 0.6,
            collectible_weight: 0.4,
            hazard_width_factor: 0.90,
            collectible_y_offset: 0.60,
            collectible_inset: 0.25,
            render_order_boost: 10,
            hazard: Some(HazardSpec::default()),
            collectible: Some(CollectibleSpec::default()),
        }
    }
}

/// Sanity resource and the movement floors it drives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalityTuning {
    pub start: f32,
    /// Move speed multiplier at zero sanity
    pub min_move_multiplier: f32,
    /// Jump speed multiplier at zero sanity
    pub min_jump_multiplier: f32,
}

impl Default for VitalityTuning {
    fn default() -> Self {
        Self {
            start: 1.0,
            min_move_multiplier: 0.35,
            min_jump_multiplier: 0.6,
        }
    }
}

/// Standing-still drain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleTuning {
    /// Seconds of stillness on one platform before draining starts
    pub drain_delay: f32,
    /// Seconds between drain applications
    pub drain_interval: f32,
    pub loss_per_tick: f32,
    /// Horizontal speed at or below which the actor counts as still
    pub speed_epsilon: f32,
}

impl Default for IdleTuning {
    fn default() -> Self {
        Self {
            drain_delay: 10.0,
            drain_interval: 1.0,
            loss_per_tick: 0.01,
            speed_epsilon: 0.05,
        }
    }
}

/// Complete tuning for a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub track: TrackTuning,
    pub jump: JumpTuning,
    pub decor: DecorTuning,
    pub vitality: VitalityTuning,
    pub idle: IdleTuning,
}

const INF: f32 = f32::INFINITY;

fn check_range(field: &'static str, value: f32, lo: f32, hi: f32) -> Result<(), ConfigError> {
    // NaN fails `contains`; infinities are never a usable setting
    if value.is_finite() && (lo..=hi).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            lo,
            hi,
        })
    }
}

fn check_order(field: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    if min <= max {
        Ok(())
    } else {
        Err(ConfigError::InvertedRange { field, min, max })
    }
}

impl Tuning {
    /// Parse and validate tuning from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load and validate tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Check every field against its natural range
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.track;
        check_range("track.spawn_ahead_distance", t.spawn_ahead_distance, 0.0, INF)?;
        check_range("track.start_offset", t.start_offset, -INF, INF)?;
        check_range("track.min_width", t.min_width, f32::MIN_POSITIVE, INF)?;
        check_range("track.max_width", t.max_width, f32::MIN_POSITIVE, INF)?;
        check_order("track.width", t.min_width, t.max_width)?;
        check_range("track.min_gap", t.min_gap, 0.0, INF)?;
        check_range("track.max_gap", t.max_gap, 0.0, INF)?;
        check_order("track.gap", t.min_gap, t.max_gap)?;
        // Every platform must move the cursor by a visible amount
        check_range(
            "track.min_width + track.min_gap",
            t.min_width + t.min_gap,
            MIN_PLATFORM_ADVANCE,
            INF,
        )?;
        check_range("track.first_gap", t.first_gap, 0.0, INF)?;
        check_range("track.min_y", t.min_y, -INF, INF)?;
        check_range("track.max_y", t.max_y, -INF, INF)?;
        check_order("track.y", t.min_y, t.max_y)?;
        check_range("track.platform_thickness", t.platform_thickness, 0.0, INF)?;
        check_range("track.fall_depth", t.fall_depth, 0.0, INF)?;

        let j = &self.jump;
        check_range("jump.gravity", j.gravity, -INF, INF)?;
        check_range("jump.gravity_scale", j.gravity_scale, 0.0, INF)?;
        check_range("jump.desired_jump_height", j.desired_jump_height, f32::MIN_POSITIVE, INF)?;
        check_range("jump.coyote_time", j.coyote_time, f32::MIN_POSITIVE, INF)?;
        check_range("jump.base_move_speed", j.base_move_speed, 0.0, INF)?;

        let d = &self.decor;
        check_order(
            "decor.force_hazard_after",
            d.force_hazard_after_min as f32,
            d.force_hazard_after_max as f32,
        )?;
        check_range("decor.base_chance", d.base_chance, 0.0, 1.0)?;
        check_range("decor.streak_boost_per_empty", d.streak_boost_per_empty, 0.0, 1.0)?;
        check_range("decor.hazard_boost_per_empty", d.hazard_boost_per_empty, 0.0, 1.0)?;
        check_range("decor.hazard_weight", d.hazard_weight, 0.0, 1.0)?;
        check_range("decor.collectible_weight", d.collectible_weight, 0.0, 1.0)?;
        check_range("decor.hazard_width_factor", d.hazard_width_factor, 0.0, 1.0)?;
        check_range("decor.collectible_y_offset", d.collectible_y_offset, -INF, INF)?;
        check_range("decor.collectible_inset", d.collectible_inset, 0.0, INF)?;
        if let Some(h) = &d.hazard {
            check_range("decor.hazard.damage", h.damage, 0.0, 1.0)?;
            check_range("decor.hazard.seat_skin", h.seat_skin, 0.0, INF)?;
            check_range("decor.hazard.tooth_width", h.tooth_width, MIN_TOOTH_WIDTH, INF)?;
            check_range("decor.hazard.tooth_height", h.tooth_height, 0.0, INF)?;
        }
        if let Some(c) = &d.collectible {
            check_range("decor.collectible.heal", c.heal, 0.0, 1.0)?;
            check_range("decor.collectible.diameter", c.diameter, 0.0, INF)?;
        }

        let v = &self.vitality;
        check_range("vitality.start", v.start, 0.0, 1.0)?;
        check_range("vitality.min_move_multiplier", v.min_move_multiplier, 0.0, 1.0)?;
        check_range("vitality.min_jump_multiplier", v.min_jump_multiplier, 0.0, 1.0)?;

        let i = &self.idle;
        check_range("idle.drain_delay", i.drain_delay, 0.0, INF)?;
        check_range("idle.drain_interval", i.drain_interval, f32::MIN_POSITIVE, INF)?;
        check_range("idle.loss_per_tick", i.loss_per_tick, 0.0, 1.0)?;
        check_range("idle.speed_epsilon", i.speed_epsilon, 0.0, INF)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let tuning = Tuning::from_json(r#"{ "decor": { "base_chance": 0.25 } }"#).unwrap();
        assert_eq!(tuning.decor.base_chance, 0.25);
        assert_eq!(tuning.decor.hazard_weight, 0.6);
        assert_eq!(tuning.track, TrackTuning::default());
    }

    #[test]
    fn test_missing_hazard_asset() {
        let tuning = Tuning::from_json(r#"{ "decor": { "hazard": null } }"#).unwrap();
        assert!(tuning.decor.hazard.is_none());
        assert!(tuning.decor.collectible.is_some());
    }

    #[test]
    fn test_inverted_width_rejected() {
        let err = Tuning::from_json(r#"{ "track": { "min_width": 4.0, "max_width": 3.0 } }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvertedRange {
                field: "track.width",
                ..
            }
        ));
    }

    #[test]
    fn test_probability_out_of_range() {
        let mut tuning = Tuning::default();
        tuning.decor.base_chance = 1.5;
        assert!(matches!(
            tuning.validate(),
            Err(ConfigError::OutOfRange {
                field: "decor.base_chance",
                ..
            })
        ));

        tuning.decor.base_chance = f32::NAN;
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_zero_jump_height_rejected() {
        let mut tuning = Tuning::default();
        tuning.jump.desired_jump_height = 0.0;
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut tuning = Tuning::default();
        tuning.track.spawn_ahead_distance = f32::INFINITY;
        assert!(matches!(
            tuning.validate(),
            Err(ConfigError::OutOfRange {
                field: "track.spawn_ahead_distance",
                ..
            })
        ));

        let mut tuning = Tuning::default();
        tuning.jump.gravity = f32::NEG_INFINITY;
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_stalling_track_rejected() {
        let mut tuning = Tuning::default();
        tuning.track.min_width = f32::MIN_POSITIVE;
        tuning.track.max_width = f32::MIN_POSITIVE;
        tuning.track.min_gap = 0.0;
        tuning.track.max_gap = 0.0;
        assert!(matches!(
            tuning.validate(),
            Err(ConfigError::OutOfRange {
                field: "track.min_width + track.min_gap",
                ..
            })
        ));

        // Narrow platforms are fine as long as the gap makes up the distance
        tuning.track.min_gap = 0.5;
        tuning.track.max_gap = 0.5;
        assert!(tuning.validate().is_ok());
    }

    #[test]
    fn test_zero_tooth_width_rejected() {
        let mut tuning = Tuning::default();
        if let Some(h) = tuning.decor.hazard.as_mut() {
            h.tooth_width = 0.0;
        }
        assert!(matches!(
            tuning.validate(),
            Err(ConfigError::OutOfRange {
                field: "decor.hazard.tooth_width",
                ..
            })
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = Tuning::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
