//! Coyote-time jump gate
//!
//! Grounded probes flicker at platform edges; the gate keeps a short grace
//! window after the last grounded tick during which a jump is still honored.

use serde::{Deserialize, Serialize};

/// Observable gate state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroundingState {
    Grounded,
    /// Off the ground but still inside the grace window
    AirborneWithinCoyote,
    AirborneExpired,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundingGate {
    coyote_time: f32,
    remaining: f32,
    grounded: bool,
}

impl GroundingGate {
    pub fn new(coyote_time: f32) -> Self {
        Self {
            coyote_time: coyote_time.max(0.0),
            remaining: 0.0,
            grounded: false,
        }
    }

    /// Feed this tick's grounded probe (call before any jump check)
    pub fn update(&mut self, grounded: bool, dt: f32) {
        self.grounded = grounded;
        if grounded {
            self.remaining = self.coyote_time;
        } else {
            self.remaining = (self.remaining - dt).max(0.0);
        }
    }

    #[inline]
    pub fn can_jump(&self) -> bool {
        self.remaining > 0.0
    }

    /// Consume the jump window; true if the jump is honored
    pub fn try_jump(&mut self) -> bool {
        if !self.can_jump() {
            return false;
        }
        self.remaining = 0.0;
        true
    }

    #[inline]
    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn state(&self) -> GroundingState {
        if self.grounded {
            GroundingState::Grounded
        } else if self.remaining > 0.0 {
            GroundingState::AirborneWithinCoyote
        } else {
            GroundingState::AirborneExpired
        }
    }
}
