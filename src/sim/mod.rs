//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only, one per run, lent to each component per call
//! - Stable iteration order (by ID)
//! - No rendering or physics-engine dependencies

pub mod contact;
pub mod decor;
pub mod grounding;
pub mod idle;
pub mod reach;
pub mod state;
pub mod survival;
pub mod tick;
pub mod track;
pub mod vitality;

#[cfg(test)]
mod testing;

pub use contact::{ActorId, ContactOutcome, ContactTracker};
pub use decor::{
    DecorationId, DecorationKind, DecorationRequest, DecorationScheduler, DecorationSlot,
    HazardStrip, StreakState,
};
pub use grounding::{GroundingGate, GroundingState};
pub use idle::{IdleDecayTimer, IdlePhase, IdleReport, IdleSample, RepeatingTimer};
pub use reach::Reach;
pub use state::{GameEvent, GameOverReason, GamePhase, RngState, RunState};
pub use survival::{SurvivalTimer, format_survival};
pub use tick::{GroundProbe, MotionCommand, TickInput, advance_track, tick};
pub use track::{Aabb, Platform, PlatformId, TrackGenerator};
pub use vitality::{SubscriptionId, Vitality, VitalitySink};
