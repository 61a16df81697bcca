//! Sanity Runner entry point
//!
//! Headless native driver: an autopilot runs a seeded course with a tiny
//! kinematic body standing in for the physics engine, then prints a summary.
//!
//! Usage: `sanity-runner [--seed N] [--seconds S] [--tuning tuning.json]`

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::collections::BTreeSet;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use clap::Parser;

    use glam::Vec2;
    use sanity_runner::consts::*;
    use sanity_runner::sim::{
        ActorId, ContactOutcome, DecorationId, DecorationKind, DecorationRequest, GameEvent,
        GroundProbe, MotionCommand, Platform, PlatformId, RunState, TickInput, advance_track,
        format_survival, tick,
    };
    use sanity_runner::{ConfigError, Tuning};

    const PLAYER: ActorId = ActorId(1);
    const ACTOR_SIZE: Vec2 = Vec2::new(0.5, 1.0);
    /// Host frame time; deliberately not a multiple of the sim step
    const FRAME_DT: f32 = 1.0 / 60.0;
    /// Platforms this far behind the actor are culled
    const CULL_BEHIND: f32 = 12.0;
    const START_PAD: PlatformId = PlatformId(0);

    #[derive(Debug, Default)]
    struct Stats {
        platforms: u32,
        hazards: u32,
        collectibles: u32,
        hits: u32,
        pickups: u32,
        jumps: u32,
    }

    /// Minimal kinematic body (feet position)
    #[derive(Debug, Clone, Copy)]
    struct Body {
        pos: Vec2,
        vel: Vec2,
    }

    impl Body {
        fn step(&mut self, cmd: MotionCommand, gravity: f32, dt: f32, platforms: &[Platform]) {
            self.vel.x = cmd.horizontal_velocity;
            if let Some(v) = cmd.jump_velocity {
                self.vel.y = v;
            }
            let prev_y = self.pos.y;
            self.vel.y -= gravity * dt;
            self.pos += self.vel * dt;

            if self.vel.y <= 0.0 {
                let landing = platforms.iter().find(|p| {
                    let top = p.bounds().top();
                    self.pos.x >= p.left()
                        && self.pos.x <= p.right()
                        && prev_y >= top - GROUND_PROBE_RADIUS
                        && self.pos.y <= top
                });
                if let Some(p) = landing {
                    self.pos.y = p.bounds().top();
                    self.vel.y = 0.0;
                }
            }
        }

        fn overlaps(&self, center: Vec2, size: Vec2) -> bool {
            let me = self.pos + Vec2::new(0.0, ACTOR_SIZE.y * 0.5);
            let d = (me - center).abs();
            d.x <= (ACTOR_SIZE.x + size.x) * 0.5 && d.y <= (ACTOR_SIZE.y + size.y) * 0.5
        }
    }

    struct Runner {
        state: RunState,
        body: Body,
        platforms: Vec<Platform>,
        decorations: Vec<DecorationRequest>,
        touching: BTreeSet<DecorationId>,
        accumulator: f32,
        stats: Stats,
    }

    impl Runner {
        fn new(seed: u64, tuning: Tuning) -> Self {
            let start = Platform {
                id: START_PAD,
                x_center: 0.0,
                width: 4.0,
                y: 0.0,
                thickness: tuning.track.platform_thickness,
            };
            let feet = Vec2::new(0.0, start.bounds().top());
            Self {
                state: RunState::new(seed, tuning, feet),
                body: Body {
                    pos: feet,
                    vel: Vec2::ZERO,
                },
                platforms: vec![start],
                decorations: Vec::new(),
                touching: BTreeSet::new(),
                accumulator: 0.0,
                stats: Stats::default(),
            }
        }

        /// Run simulation ticks for one host frame
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                self.step();
                self.accumulator -= SIM_DT;
                substeps += 1;
                if self.state.is_over() {
                    break;
                }
            }
        }

        fn step(&mut self) {
            advance_track(&mut self.state, self.body.pos.x);
            self.handle_events();

            let input = self.autopilot();
            let cmd = tick(&mut self.state, &input, &self.platforms[..], SIM_DT);
            self.body
                .step(cmd, self.state.reach.gravity, SIM_DT, &self.platforms);
            self.update_contacts();
            self.cull();
            self.handle_events();
        }

        /// Run right; jump near the edge or in front of spikes
        fn autopilot(&self) -> TickInput {
            let feet = self.body.pos;
            let under = self.platforms[..].probe(feet, GROUND_PROBE_RADIUS);
            let near_edge = under
                .and_then(|id| self.platforms.iter().find(|p| p.id == id))
                .is_some_and(|p| feet.x > p.right() - 0.35);
            let spikes_ahead = self.decorations.iter().any(|d| {
                matches!(d.kind, DecorationKind::Hazard { .. })
                    && Some(d.platform) == under
                    && d.world_anchor.x - d.size_hint.x * 0.5 - feet.x < 0.6
                    && d.world_anchor.x + d.size_hint.x * 0.5 > feet.x
            });

            TickInput {
                actor_pos: feet,
                horizontal_axis: 1.0,
                jump_pressed: near_edge || spikes_ahead,
            }
        }

        fn update_contacts(&mut self) {
            let overlapping: BTreeSet<DecorationId> = self
                .decorations
                .iter()
                .filter(|d| {
                    let (center, size) = match d.kind {
                        DecorationKind::Hazard { strip, .. } => {
                            (d.world_anchor + strip.collider_offset, strip.collider_size)
                        }
                        DecorationKind::Collectible { diameter, .. } => {
                            (d.world_anchor, Vec2::splat(diameter))
                        }
                    };
                    self.body.overlaps(center, size)
                })
                .map(|d| d.id)
                .collect();

            for id in self.touching.difference(&overlapping) {
                self.state.contact_exit(*id, PLAYER);
            }
            for id in overlapping.difference(&self.touching) {
                match self.state.contact_enter(*id, PLAYER) {
                    ContactOutcome::Applied { .. } => self.stats.hits += 1,
                    ContactOutcome::Consumed { .. } => self.stats.pickups += 1,
                    ContactOutcome::Ignored => {}
                }
            }
            self.touching = overlapping;
        }

        fn cull(&mut self) {
            let limit = self.body.pos.x - CULL_BEHIND;
            let (gone, kept): (Vec<Platform>, Vec<Platform>) =
                self.platforms.drain(..).partition(|p| p.right() < limit);
            self.platforms = kept;
            for platform in gone {
                self.decorations.retain(|d| d.platform != platform.id);
                self.state.forget_platform(platform.id);
            }
        }

        fn handle_events(&mut self) {
            for event in self.state.drain_events() {
                match event {
                    GameEvent::PlatformPlaced(platform) => {
                        log::debug!(
                            "Platform {} at x={:.2} y={:.2} w={:.2}",
                            platform.id.0,
                            platform.x_center,
                            platform.y,
                            platform.width
                        );
                        self.stats.platforms += 1;
                        self.platforms.push(platform);
                    }
                    GameEvent::DecorationPlaced(request) => {
                        match request.kind {
                            DecorationKind::Hazard { strip, .. } => {
                                log::debug!(
                                    "Spikes {} on platform {} ({} teeth)",
                                    request.id.0,
                                    request.platform.0,
                                    strip.teeth
                                );
                                self.stats.hazards += 1;
                            }
                            DecorationKind::Collectible { .. } => {
                                log::debug!(
                                    "Orb {} on platform {}",
                                    request.id.0,
                                    request.platform.0
                                );
                                self.stats.collectibles += 1;
                            }
                        }
                        self.decorations.push(request);
                    }
                    GameEvent::DecorationRemoved(id) => {
                        self.decorations.retain(|d| d.id != id);
                        self.touching.remove(&id);
                    }
                    GameEvent::VitalityChanged(value) => {
                        log::info!("Sanity {:.0}%", value * 100.0);
                    }
                    GameEvent::Jumped { .. } => self.stats.jumps += 1,
                    GameEvent::IdleDrainStarted => log::info!("Standing still: sanity draining"),
                    GameEvent::IdleDrainStopped => log::debug!("Idle drain stopped"),
                    GameEvent::GameOver(reason) => log::info!("Game over: {:?}", reason),
                }
            }
        }
    }

    fn default_seed() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(1)
    }

    /// Headless Sanity Runner: autopilot a seeded course and report the run
    #[derive(Debug, Parser)]
    #[command(author, version, about, long_about = None)]
    pub struct Args {
        /// Run seed (defaults to the wall clock)
        #[arg(short, long)]
        pub seed: Option<u64>,
        /// Simulated seconds to run for
        #[arg(short = 't', long, default_value_t = 60.0, value_parser = parse_seconds)]
        pub seconds: f32,
        /// Tuning JSON file; missing fields keep their defaults
        #[arg(long)]
        pub tuning: Option<PathBuf>,
    }

    fn parse_seconds(raw: &str) -> Result<f32, String> {
        let secs: f32 = raw.parse().map_err(|e| format!("{e}"))?;
        if secs.is_finite() && secs >= 0.0 {
            Ok(secs)
        } else {
            Err(format!("{raw} is not a non-negative number of seconds"))
        }
    }

    pub fn run(args: Args) -> Result<(), ConfigError> {
        let seed = args.seed.unwrap_or_else(default_seed);
        let seconds = args.seconds;
        let tuning = match args.tuning {
            Some(path) => Tuning::load(path)?,
            None => Tuning::default(),
        };
        tuning.validate()?;

        log::info!("Run seed: {}", seed);
        let mut runner = Runner::new(seed, tuning);
        let frames = (seconds / FRAME_DT).ceil() as u32;
        for _ in 0..frames {
            runner.update(FRAME_DT);
            if runner.state.is_over() {
                break;
            }
        }

        let s = &runner.stats;
        let outcome = match runner.state.game_over {
            Some(reason) => format!("{:?}", reason),
            None => "still running".to_string(),
        };
        println!(
            "seed {}: survived {} ({}), sanity {:.0}%",
            seed,
            format_survival(runner.state.survival.elapsed_secs()),
            outcome,
            runner.state.vitality.value() * 100.0
        );
        println!(
            "{} platforms, {} spike strips, {} orbs, {} jumps, {} hits, {} pickups",
            s.platforms, s.hazards, s.collectibles, s.jumps, s.hits, s.pickups
        );
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;

    let args = native::Args::parse();
    env_logger::init();
    log::info!("Sanity Runner (native) starting...");

    if let Err(e) = native::run(args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is the product on wasm; there is no native driver
}
