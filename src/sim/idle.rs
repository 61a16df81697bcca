//! Standing-still drain
//!
//! Standing motionless on the same platform for `drain_delay` seconds starts
//! a repeating sanity drain. Any horizontal motion, leaving the ground, or a
//! change of platform cancels it and restarts the idle clock.
//!
//! Timing rule: the first still tick on a platform sets the clock to zero
//! (no `dt` is added). The first drain fires on the tick the clock reaches
//! the delay; after that one drain fires per full `drain_interval`
//! accumulated by the repeating timer.

use serde::{Deserialize, Serialize};

use super::track::PlatformId;
use super::vitality::VitalitySink;
use crate::config::IdleTuning;

/// Cancellable repeating timer driven by simulation time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepeatingTimer {
    interval: f32,
    accumulated: f32,
    cancelled: bool,
}

impl RepeatingTimer {
    pub fn start(interval: f32) -> Self {
        Self {
            interval,
            accumulated: 0.0,
            cancelled: false,
        }
    }

    /// Advance by `dt`; returns how many periods elapsed
    pub fn advance(&mut self, dt: f32) -> u32 {
        if self.cancelled || self.interval <= 0.0 || !dt.is_finite() {
            return 0;
        }
        self.accumulated += dt.max(0.0);
        let periods = (self.accumulated / self.interval).floor();
        self.accumulated = self.accumulated.rem_euclid(self.interval);
        // Saturating float-to-int cast
        periods as u32
    }

    /// Stop firing; safe to call more than once
    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.accumulated = 0.0;
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// Idle state machine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum IdlePhase {
    Active { timer: f32 },
    Draining { timer: f32, drain: RepeatingTimer },
}

/// What the actor is doing this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdleSample {
    /// Platform under the actor, `None` when airborne
    pub platform: Option<PlatformId>,
    pub horizontal_velocity: f32,
}

/// Outcome of one idle update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdleReport {
    /// Drain applications made this tick
    pub drains: u32,
    pub started: bool,
    pub stopped: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdleDecayTimer {
    tuning: IdleTuning,
    phase: IdlePhase,
    last_platform: Option<PlatformId>,
}

impl IdleDecayTimer {
    pub fn new(tuning: IdleTuning) -> Self {
        Self {
            tuning,
            phase: IdlePhase::Active { timer: 0.0 },
            last_platform: None,
        }
    }

    #[inline]
    pub fn phase(&self) -> IdlePhase {
        self.phase
    }

    pub fn is_draining(&self) -> bool {
        matches!(self.phase, IdlePhase::Draining { .. })
    }

    /// Seconds spent still on the current platform
    pub fn timer(&self) -> f32 {
        match self.phase {
            IdlePhase::Active { timer } | IdlePhase::Draining { timer, .. } => timer,
        }
    }

    /// Run once per physics tick, after movement and jumping are resolved
    pub fn update<S: VitalitySink + ?Sized>(
        &mut self,
        sample: IdleSample,
        dt: f32,
        sink: &mut S,
    ) -> IdleReport {
        let mut report = IdleReport::default();
        let still = sample.horizontal_velocity.abs() <= self.tuning.speed_epsilon;
        let same_platform = sample.platform.is_some() && sample.platform == self.last_platform;

        if still && same_platform {
            match &mut self.phase {
                IdlePhase::Active { timer } => {
                    *timer += dt;
                    if *timer >= self.tuning.drain_delay {
                        let timer = *timer;
                        self.phase = IdlePhase::Draining {
                            timer,
                            drain: RepeatingTimer::start(self.tuning.drain_interval),
                        };
                        report.started = true;
                        // First drain lands on the tick the delay is reached
                        report.drains = 1;
                        log::debug!("Idle drain started after {:.2}s", timer);
                    }
                }
                IdlePhase::Draining { timer, drain } => {
                    *timer += dt;
                    report.drains = drain.advance(dt);
                }
            }
        } else {
            // Moving, airborne, or just arrived on this platform
            report.stopped = self.reset();
        }

        self.last_platform = sample.platform;

        for _ in 0..report.drains {
            sink.apply_delta(-self.tuning.loss_per_tick);
            // Further drains cannot change anything
            if sink.value() <= 0.0 || self.tuning.loss_per_tick <= 0.0 {
                break;
            }
        }
        report
    }

    /// Back to `Active(0)`; returns true if a drain was cancelled
    fn reset(&mut self) -> bool {
        let was_draining = match &mut self.phase {
            IdlePhase::Draining { drain, .. } => {
                drain.cancel();
                true
            }
            IdlePhase::Active { .. } => false,
        };
        if was_draining {
            log::debug!("Idle drain cancelled");
        }
        self.phase = IdlePhase::Active { timer: 0.0 };
        was_draining
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VitalityTuning;
    use crate::sim::vitality::Vitality;

    const HOME: Option<PlatformId> = Some(PlatformId(1));

    fn idle() -> IdleDecayTimer {
        IdleDecayTimer::new(IdleTuning {
            drain_delay: 10.0,
            drain_interval: 1.0,
            loss_per_tick: 0.01,
            speed_epsilon: 0.05,
        })
    }

    fn still(platform: Option<PlatformId>) -> IdleSample {
        IdleSample {
            platform,
            horizontal_velocity: 0.0,
        }
    }

    fn moving(platform: Option<PlatformId>) -> IdleSample {
        IdleSample {
            platform,
            horizontal_velocity: 3.0,
        }
    }

    /// Run samples at `dt`, returning total drains applied
    fn run(timer: &mut IdleDecayTimer, v: &mut Vitality, samples: &[IdleSample], dt: f32) -> u32 {
        samples
            .iter()
            .map(|sample| timer.update(*sample, dt, v).drains)
            .sum()
    }

    fn vitality() -> Vitality {
        Vitality::new(&VitalityTuning::default())
    }

    #[test]
    fn test_twelve_seconds_still_drains_twice() {
        let mut timer = idle();
        let mut v = vitality();
        let samples = vec![still(HOME); 24];
        assert_eq!(run(&mut timer, &mut v, &samples, 0.5), 2);
        assert!((v.value() - 0.98).abs() < 1e-6);
        assert!(timer.is_draining());
    }

    #[test]
    fn test_twelve_seconds_at_fixed_step() {
        let mut timer = idle();
        let mut v = vitality();
        let samples = vec![still(HOME); 600];
        assert_eq!(run(&mut timer, &mut v, &samples, crate::consts::SIM_DT), 2);
    }

    #[test]
    fn test_moving_before_delay_prevents_drain() {
        let mut timer = idle();
        let mut v = vitality();
        let mut samples = vec![still(HOME); 20];
        samples.push(moving(HOME));
        samples.extend(vec![still(HOME); 3]);
        assert_eq!(run(&mut timer, &mut v, &samples, 0.5), 0);
        assert_eq!(v.value(), 1.0);
        assert!(timer.timer() < 2.0);
    }

    #[test]
    fn test_fixed_step_drain_before_moving() {
        let mut timer = idle();
        let mut v = vitality();
        // 10.5 s of standing at 50 Hz: the delay is reached at 10.02 s
        let samples = vec![still(HOME); 525];
        assert_eq!(run(&mut timer, &mut v, &samples, crate::consts::SIM_DT), 1);
        assert!(timer.is_draining());

        let report = timer.update(moving(HOME), crate::consts::SIM_DT, &mut v);
        assert!(report.stopped);
        assert_eq!(report.drains, 0);
        assert!((v.value() - 0.99).abs() < 1e-6);
    }

    #[test]
    fn test_huge_dt_terminates() {
        let mut drain = RepeatingTimer::start(1e-3);
        assert_eq!(drain.advance(1.0e9), u32::MAX);
        assert!(drain.advance(1e-4) <= 1);
        assert_eq!(drain.advance(f32::INFINITY), 0);

        let mut timer = idle();
        let mut v = vitality();
        run(&mut timer, &mut v, &vec![still(HOME); 21], 0.5);
        assert!(timer.is_draining());
        timer.update(still(HOME), 1.0e12, &mut v);
        assert_eq!(v.value(), 0.0);
    }

    #[test]
    fn test_motion_cancels_drain() {
        let mut timer = idle();
        let mut v = vitality();
        let samples = vec![still(HOME); 21];
        assert_eq!(run(&mut timer, &mut v, &samples, 0.5), 1);
        assert!(timer.is_draining());

        let report = timer.update(moving(HOME), 0.5, &mut v);
        assert!(report.stopped);
        assert_eq!(report.drains, 0);
        assert_eq!(timer.phase(), IdlePhase::Active { timer: 0.0 });

        // Standing again restarts the full delay
        let samples = vec![still(HOME); 10];
        assert_eq!(run(&mut timer, &mut v, &samples, 0.5), 0);
    }

    #[test]
    fn test_airborne_clears_platform() {
        let mut timer = idle();
        let mut v = vitality();
        run(&mut timer, &mut v, &vec![still(HOME); 10], 0.5);
        assert!(timer.timer() > 0.0);

        // Hop straight up and land on the same platform: counts as a new arrival
        timer.update(still(None), 0.5, &mut v);
        timer.update(still(HOME), 0.5, &mut v);
        assert_eq!(timer.timer(), 0.0);
    }

    #[test]
    fn test_platform_change_resets() {
        let mut timer = idle();
        let mut v = vitality();
        run(&mut timer, &mut v, &vec![still(HOME); 22], 0.5);
        assert!(timer.is_draining());
        let report = timer.update(still(Some(PlatformId(2))), 0.5, &mut v);
        assert!(report.stopped);
        assert_eq!(timer.timer(), 0.0);
    }

    #[test]
    fn test_large_dt_catches_up() {
        let mut timer = idle();
        let mut v = vitality();
        run(&mut timer, &mut v, &vec![still(HOME); 21], 0.5);
        // One 3-second hitch while draining fires three periods at once
        assert_eq!(timer.update(still(HOME), 3.0, &mut v).drains, 3);
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let mut drain = RepeatingTimer::start(1.0);
        assert_eq!(drain.advance(0.5), 0);
        drain.cancel();
        drain.cancel();
        assert!(drain.is_cancelled());
        assert_eq!(drain.advance(10.0), 0);
    }
}
