//! Run state and core simulation types
//!
//! One `RunState` owns every piece of per-run state plus the shared seeded
//! RNG, and is the only thing the driver talks to.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::contact::{ActorId, ContactOutcome, ContactTracker};
use super::decor::{DecorationId, DecorationRequest, DecorationScheduler};
use super::grounding::GroundingGate;
use super::idle::IdleDecayTimer;
use super::reach::Reach;
use super::survival::SurvivalTimer;
use super::track::{Platform, PlatformId, TrackGenerator};
use super::vitality::Vitality;
use crate::config::Tuning;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Running,
    GameOver,
}

/// Why the run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    /// Vitality reached zero
    VitalityDepleted,
    /// Actor dropped below the track
    Fell,
}

/// Everything collaborators need to react to, in emission order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PlatformPlaced(Platform),
    DecorationPlaced(DecorationRequest),
    /// A collectible was used up and should be despawned
    DecorationRemoved(DecorationId),
    VitalityChanged(f32),
    Jumped { velocity: f32 },
    IdleDrainStarted,
    IdleDrainStopped,
    GameOver(GameOverReason),
}

/// RNG state wrapper
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

/// Complete run state (deterministic for a given seed and input stream)
#[derive(Debug)]
pub struct RunState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub game_over: Option<GameOverReason>,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub reach: Reach,
    /// Shared RNG; every random draw in the run comes from here
    pub rng: Pcg32,
    pub track: TrackGenerator,
    pub decor: DecorationScheduler,
    pub contacts: ContactTracker,
    pub vitality: Vitality,
    pub gate: GroundingGate,
    pub idle: IdleDecayTimer,
    pub survival: SurvivalTimer,
    /// Pending events for collaborators
    pub events: Vec<GameEvent>,
    /// Values pushed by our own vitality subscription, not yet turned into events
    vitality_changes: Rc<RefCell<Vec<f32>>>,
}

impl RunState {
    /// Start a run with the actor standing at `actor_start`
    ///
    /// `tuning` is expected to be validated already.
    pub fn new(seed: u64, tuning: Tuning, actor_start: Vec2) -> Self {
        let mut rng = RngState::new(seed).to_rng();
        let reach = Reach::from_tuning(&tuning.jump);
        let track = TrackGenerator::new(tuning.track.clone(), &reach, actor_start.x);
        let decor = DecorationScheduler::new(tuning.decor.clone(), &mut rng);

        let mut vitality = Vitality::new(&tuning.vitality);
        let vitality_changes = Rc::new(RefCell::new(Vec::new()));
        let sink = vitality_changes.clone();
        vitality.subscribe(move |value| sink.borrow_mut().push(value));

        let mut state = Self {
            seed,
            phase: GamePhase::Running,
            game_over: None,
            time_ticks: 0,
            reach,
            rng,
            track,
            decor,
            contacts: ContactTracker::new(),
            vitality,
            gate: GroundingGate::new(tuning.jump.coyote_time),
            idle: IdleDecayTimer::new(tuning.idle.clone()),
            survival: SurvivalTimer::new(),
            events: Vec::new(),
            vitality_changes,
            tuning,
        };

        log::info!(
            "Run {} started: max step {:.2}, jump velocity {:.2}",
            seed,
            state.reach.max_step(),
            state.reach.jump_velocity()
        );

        // A run configured to start empty is over before it begins
        if state.vitality.is_depleted() {
            state.end_run(GameOverReason::VitalityDepleted);
        }
        state
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Actor began overlapping a decoration
    pub fn contact_enter(&mut self, id: DecorationId, actor: ActorId) -> ContactOutcome {
        if self.is_over() {
            return ContactOutcome::Ignored;
        }
        let outcome = self.contacts.contact_enter(id, actor, &mut self.vitality);
        match outcome {
            ContactOutcome::Applied { delta } => {
                log::debug!("Hazard {} hit actor {} ({:+.2})", id.0, actor.0, delta);
            }
            ContactOutcome::Consumed { delta } => {
                log::debug!("Collectible {} picked up ({:+.2})", id.0, delta);
                self.events.push(GameEvent::DecorationRemoved(id));
            }
            ContactOutcome::Ignored => {}
        }
        self.flush_vitality();
        outcome
    }

    /// Actor stopped overlapping a decoration
    pub fn contact_exit(&mut self, id: DecorationId, actor: ActorId) {
        self.contacts.contact_exit(id, actor);
    }

    /// The renderer destroyed a platform that scrolled out of view
    pub fn forget_platform(&mut self, id: PlatformId) {
        let gone = self.contacts.forget_platform(id);
        if !gone.is_empty() {
            log::debug!("Platform {} culled with {} decorations", id.0, gone.len());
        }
    }

    /// Turn pending vitality notifications into events; zero ends the run
    pub(crate) fn flush_vitality(&mut self) {
        let changes: Vec<f32> = self.vitality_changes.borrow_mut().drain(..).collect();
        for value in changes {
            self.events.push(GameEvent::VitalityChanged(value));
            if value <= 0.0 {
                self.end_run(GameOverReason::VitalityDepleted);
            }
        }
    }

    /// Latch the game-over state (later calls are ignored)
    pub fn end_run(&mut self, reason: GameOverReason) {
        if self.is_over() {
            return;
        }
        self.phase = GamePhase::GameOver;
        self.game_over = Some(reason);
        self.survival.stop();
        self.events.push(GameEvent::GameOver(reason));
        log::info!(
            "Game over ({:?}) after {}",
            reason,
            super::survival::format_survival(self.survival.elapsed_secs())
        );
    }
}
