//! Jump reach
//!
//! Derives how far up or down the next platform may sit from gravity and the
//! tuned jump height.

use crate::config::JumpTuning;
use crate::consts::{MIN_JUMP_HEIGHT, REACH_SAFETY};

/// Jump reach derived from gravity and desired apex height
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reach {
    /// Effective gravity (magnitude * scale)
    pub gravity: f32,
    /// Desired jump apex height
    pub jump_height: f32,
}

impl Reach {
    pub fn new(gravity: f32, gravity_scale: f32, jump_height: f32) -> Self {
        Self {
            gravity: (gravity * gravity_scale).abs(),
            jump_height,
        }
    }

    pub fn from_tuning(jump: &JumpTuning) -> Self {
        Self::new(jump.gravity, jump.gravity_scale, jump.desired_jump_height)
    }

    /// Largest vertical step between consecutive platforms (10% under the apex)
    #[inline]
    pub fn max_step(&self) -> f32 {
        self.jump_height * REACH_SAFETY
    }

    /// Launch speed that reaches `jump_height` under this gravity
    #[inline]
    pub fn jump_velocity(&self) -> f32 {
        (2.0 * self.gravity * self.jump_height.max(MIN_JUMP_HEIGHT)).sqrt()
    }

    /// Time from launch back to launch height
    pub fn airtime(&self) -> f32 {
        if self.gravity > 0.0 {
            2.0 * self.jump_velocity() / self.gravity
        } else {
            0.0
        }
    }
}
