//! Fixed timestep simulation tick
//!
//! Advances one run deterministically. Order within a tick is fixed:
//! grounding, jump, movement, idle decay, fall check, clock.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::idle::IdleSample;
use super::state::{GameEvent, GameOverReason, RunState};
use super::track::{Platform, PlatformId};
use crate::consts::*;

/// Input for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    /// Actor's feet, in world units
    pub actor_pos: Vec2,
    /// Run input in [-1, 1]
    pub horizontal_axis: f32,
    /// Jump pressed this tick (edge, not level)
    pub jump_pressed: bool,
}

/// What the physics collaborator should do with the actor this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionCommand {
    pub horizontal_velocity: f32,
    /// Upward launch speed when a jump was honored
    pub jump_velocity: Option<f32>,
}

/// Answers "which platform is under this point?"
pub trait GroundProbe {
    fn probe(&self, foot: Vec2, radius: f32) -> Option<PlatformId>;
}

impl<F> GroundProbe for F
where
    F: Fn(Vec2, f32) -> Option<PlatformId>,
{
    fn probe(&self, foot: Vec2, radius: f32) -> Option<PlatformId> {
        self(foot, radius)
    }
}

/// Circle-vs-top-face test against a set of platforms
impl GroundProbe for [Platform] {
    fn probe(&self, foot: Vec2, radius: f32) -> Option<PlatformId> {
        self.iter()
            .find(|p| {
                foot.x >= p.left() - radius
                    && foot.x <= p.right() + radius
                    && (foot.y - p.bounds().top()).abs() <= radius
            })
            .map(|p| p.id)
    }
}

/// Advance the run by one fixed timestep
pub fn tick<G: GroundProbe + ?Sized>(
    state: &mut RunState,
    input: &TickInput,
    ground: &G,
    dt: f32,
) -> MotionCommand {
    // Nothing moves once the run is over
    if state.is_over() {
        return MotionCommand::default();
    }
    state.time_ticks += 1;

    let platform = ground.probe(input.actor_pos, GROUND_PROBE_RADIUS);
    state.gate.update(platform.is_some(), dt);

    let mut command = MotionCommand {
        horizontal_velocity: input.horizontal_axis.clamp(-1.0, 1.0)
            * state.tuning.jump.base_move_speed
            * state.vitality.move_multiplier(),
        jump_velocity: None,
    };

    if input.jump_pressed && state.gate.try_jump() {
        let velocity = state.reach.jump_velocity() * state.vitality.jump_multiplier();
        command.jump_velocity = Some(velocity);
        state.events.push(GameEvent::Jumped { velocity });
    }

    // A launching actor has already left its platform
    let sample = IdleSample {
        platform: if command.jump_velocity.is_some() {
            None
        } else {
            platform
        },
        horizontal_velocity: command.horizontal_velocity,
    };
    let report = state.idle.update(sample, dt, &mut state.vitality);
    if report.started {
        state.events.push(GameEvent::IdleDrainStarted);
    }
    if report.stopped {
        state.events.push(GameEvent::IdleDrainStopped);
    }
    state.flush_vitality();

    let lost_below = state.track.floor_y() - state.tuning.track.fall_depth;
    if input.actor_pos.y < lost_below {
        log::debug!("Actor fell to {:.2} (limit {:.2})", input.actor_pos.y, lost_below);
        state.end_run(GameOverReason::Fell);
    }

    state.survival.advance(dt);

    if state.is_over() {
        return MotionCommand::default();
    }
    command
}

/// Extend the track ahead of the actor and decorate every new platform
///
/// Emits `PlatformPlaced` then, if any, `DecorationPlaced` for each platform.
pub fn advance_track(state: &mut RunState, actor_x: f32) {
    if state.is_over() {
        return;
    }

    let mut placed = Vec::new();
    state.track.advance(
        actor_x,
        state.tuning.track.spawn_ahead_distance,
        &mut state.rng,
        &mut placed,
    );

    for platform in placed {
        state.events.push(GameEvent::PlatformPlaced(platform));
        if let Some(request) = state.decor.decorate(&platform, &mut state.rng) {
            state.contacts.register(&request);
            state.events.push(GameEvent::DecorationPlaced(request));
        }
    }
}
