//! Sanity resource
//!
//! A clamped [0, 1] scalar. Every change is pushed synchronously to the
//! subscriber list, in subscription order; the run ends when it hits zero.

use std::fmt;

use crate::config::VitalityTuning;
use crate::lerp;

/// Anything that can absorb a sanity delta
pub trait VitalitySink {
    /// Apply `delta`; returns true if the stored value changed
    fn apply_delta(&mut self, delta: f32) -> bool;
    fn value(&self) -> f32;
}

/// Handle returned by [`Vitality::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u32);

type Subscriber = Box<dyn FnMut(f32)>;

pub struct Vitality {
    value: f32,
    min_move_multiplier: f32,
    min_jump_multiplier: f32,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u32,
}

impl fmt::Debug for Vitality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vitality")
            .field("value", &self.value)
            .field("min_move_multiplier", &self.min_move_multiplier)
            .field("min_jump_multiplier", &self.min_jump_multiplier)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl Vitality {
    pub fn new(tuning: &VitalityTuning) -> Self {
        Self {
            value: tuning.start.clamp(0.0, 1.0),
            min_move_multiplier: tuning.min_move_multiplier,
            min_jump_multiplier: tuning.min_jump_multiplier,
            subscribers: Vec::new(),
            next_subscription: 1,
        }
    }

    /// Register a change listener; it receives the new value
    pub fn subscribe(&mut self, f: impl FnMut(f32) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(f)));
        id
    }

    /// Remove a listener; unknown ids are ignored
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Zero sanity ends the run
    #[inline]
    pub fn is_depleted(&self) -> bool {
        self.value <= 0.0
    }

    /// Horizontal speed multiplier (never below the configured floor)
    pub fn move_multiplier(&self) -> f32 {
        lerp(self.min_move_multiplier, 1.0, self.value)
    }

    /// Jump speed multiplier (never below the configured floor)
    pub fn jump_multiplier(&self) -> f32 {
        lerp(self.min_jump_multiplier, 1.0, self.value)
    }

    /// Add `delta`, clamp, and notify if the value moved
    pub fn apply_delta(&mut self, delta: f32) -> bool {
        if delta.is_nan() {
            return false;
        }
        let before = self.value;
        self.value = (self.value + delta).clamp(0.0, 1.0);
        if self.value == before {
            return false;
        }

        let value = self.value;
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(value);
        }
        true
    }
}

impl VitalitySink for Vitality {
    fn apply_delta(&mut self, delta: f32) -> bool {
        Vitality::apply_delta(self, delta)
    }

    fn value(&self) -> f32 {
        Vitality::value(self)
    }
}
