//! Decoration scheduling
//!
//! Every freshly generated platform gets at most one decoration: a spike
//! strip, a sanity orb, or nothing. Two streak counters shape the mix:
//!
//! - `empty_streak`: platforms since any decoration; raises the roll chance
//! - `empties_since_forced_hazard`: platforms since the last spike; raises the
//!   roll chance and, once it reaches the current threshold, forces a spike
//!
//! Orbs bump the spike counter without resetting it so spikes stay on
//! schedule through a run of orbs.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::track::{Aabb, Platform, PlatformId};
use crate::config::{CollectibleSpec, DecorTuning, HazardSpec};
use crate::consts::{MIN_HAZARD_WIDTH, MIN_TOOTH_WIDTH, MIN_WEIGHT_TOTAL};
use crate::{clamp01, safe_inverse, uniform};

/// Stable decoration identifier (monotonic per run)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DecorationId(pub u32);

/// What a platform was decorated with
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DecorationSlot {
    None,
    /// Spike strip covering `width_factor` of the platform
    Hazard { width_factor: f32 },
    /// Orb floating `y_offset` above the platform top
    Collectible { y_offset: f32 },
}

/// Streak counters (mutated once per platform)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreakState {
    pub empty_streak: u32,
    pub empties_since_forced_hazard: u32,
    pub force_threshold: u32,
}

/// Spike strip layout: a row of teeth under a single trigger collider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HazardStrip {
    pub teeth: u32,
    pub tooth_size: Vec2,
    /// Local x of the leftmost tooth center
    pub first_tooth_x: f32,
    pub collider_size: Vec2,
    pub collider_offset: Vec2,
}

impl HazardStrip {
    /// Lay out teeth to approximate `target_width`
    pub fn build(target_width: f32, spec: &HazardSpec) -> Self {
        let unit = spec.tooth_width.max(MIN_TOOTH_WIDTH);
        let teeth = ((target_width / unit).round() as u32).max(1);
        let total = teeth as f32 * unit;
        let base_y = spec.tooth_height * 0.5 - spec.seat_skin;

        Self {
            teeth,
            tooth_size: Vec2::new(unit, spec.tooth_height),
            first_tooth_x: -total * 0.5 + unit * 0.5,
            collider_size: Vec2::new(total, spec.tooth_height),
            collider_offset: Vec2::new(0.0, base_y),
        }
    }

    /// Strip width actually covered by teeth
    #[inline]
    pub fn width(&self) -> f32 {
        self.collider_size.x
    }

    /// Local tooth centers, left to right
    pub fn tooth_positions(&self) -> impl Iterator<Item = Vec2> + '_ {
        (0..self.teeth).map(move |i| {
            Vec2::new(
                self.first_tooth_x + i as f32 * self.tooth_size.x,
                self.collider_offset.y,
            )
        })
    }
}

/// Decoration payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DecorationKind {
    Hazard { strip: HazardStrip, damage: f32 },
    Collectible { diameter: f32, heal: f32 },
}

/// Placement request handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecorationRequest {
    pub id: DecorationId,
    pub platform: PlatformId,
    pub slot: DecorationSlot,
    pub kind: DecorationKind,
    /// World position of the decoration origin
    pub world_anchor: Vec2,
    /// Offset from the platform center (world units)
    pub local_offset: Vec2,
    /// World-space footprint
    pub size_hint: Vec2,
    /// Multiply into the child's local scale to cancel the platform's stretch
    pub parent_scale_compensation: Vec2,
    /// Added to the platform's draw order
    pub draw_order_boost: i32,
}

/// Streak-aware decoration scheduler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecorationScheduler {
    tuning: DecorTuning,
    streak: StreakState,
    next_id: u32,
}

impl DecorationScheduler {
    pub fn new<R: Rng + ?Sized>(tuning: DecorTuning, rng: &mut R) -> Self {
        if tuning.hazard.is_none() {
            log::warn!("No hazard configured - spikes disabled, platforms stay empty instead");
        }
        if tuning.collectible.is_none() {
            log::warn!("No collectible configured - orbs disabled, platforms stay empty instead");
        }

        let mut scheduler = Self {
            tuning,
            streak: StreakState::default(),
            next_id: 1,
        };
        scheduler.streak.force_threshold = scheduler.roll_threshold(rng);
        scheduler
    }

    #[inline]
    pub fn streak(&self) -> StreakState {
        self.streak
    }

    /// Current roll chance for "any decoration"
    pub fn chance(&self) -> f32 {
        let t = &self.tuning;
        let s = &self.streak;
        clamp01(
            t.base_chance
                + t.streak_boost_per_empty * s.empty_streak as f32
                + t.hazard_boost_per_empty * s.empties_since_forced_hazard as f32,
        )
    }

    /// Decorate a freshly generated platform
    pub fn decorate<R: Rng + ?Sized>(
        &mut self,
        platform: &Platform,
        rng: &mut R,
    ) -> Option<DecorationRequest> {
        let slot = self.decide(rng);
        let request = match slot {
            DecorationSlot::None => return None,
            DecorationSlot::Hazard { width_factor } => {
                let spec = self.tuning.hazard.clone()?;
                self.place_hazard(platform, &spec, width_factor, slot)
            }
            DecorationSlot::Collectible { y_offset } => {
                let spec = self.tuning.collectible.clone()?;
                self.place_collectible(platform, &spec, y_offset, slot, rng)
            }
        };
        Some(request)
    }

    /// Run the streak rules for one platform and update the counters
    pub fn decide<R: Rng + ?Sized>(&mut self, rng: &mut R) -> DecorationSlot {
        let hazard_ok = self.tuning.hazard.is_some();
        let collectible_ok = self.tuning.collectible.is_some();

        // Spacing floor
        if self.streak.empty_streak < self.tuning.min_empty_between {
            self.stay_empty();
            return DecorationSlot::None;
        }

        // Forced hazard after a dry run
        if self.streak.empties_since_forced_hazard >= self.streak.force_threshold && hazard_ok {
            self.streak.empty_streak = 0;
            self.streak.empties_since_forced_hazard = 0;
            if self.tuning.reroll_force_threshold {
                self.streak.force_threshold = self.roll_threshold(rng);
            }
            log::debug!(
                "Forced hazard, next threshold {}",
                self.streak.force_threshold
            );
            return self.hazard_slot();
        }

        let chance = self.chance();
        let r: f32 = rng.random();
        if r > chance {
            self.stay_empty();
            return DecorationSlot::None;
        }

        let hazard_weight = self.tuning.hazard_weight;
        let total = (hazard_weight + self.tuning.collectible_weight).max(MIN_WEIGHT_TOTAL);
        let r2 = rng.random::<f32>() * total;

        let slot = if r2 < hazard_weight && hazard_ok {
            self.streak.empties_since_forced_hazard = 0;
            self.hazard_slot()
        } else if collectible_ok {
            self.streak.empties_since_forced_hazard += 1;
            DecorationSlot::Collectible {
                y_offset: self.tuning.collectible_y_offset,
            }
        } else {
            self.stay_empty();
            return DecorationSlot::None;
        };

        self.streak.empty_streak = 0;
        slot
    }

    fn hazard_slot(&self) -> DecorationSlot {
        DecorationSlot::Hazard {
            width_factor: self.tuning.hazard_width_factor,
        }
    }

    fn stay_empty(&mut self) {
        self.streak.empty_streak += 1;
        self.streak.empties_since_forced_hazard += 1;
    }

    fn roll_threshold<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        let lo = self.tuning.force_hazard_after_min;
        let hi = self.tuning.force_hazard_after_max.max(lo);
        rng.random_range(lo..=hi)
    }

    fn next_decoration_id(&mut self) -> DecorationId {
        let id = DecorationId(self.next_id);
        self.next_id += 1;
        id
    }

    fn place_hazard(
        &mut self,
        platform: &Platform,
        spec: &HazardSpec,
        width_factor: f32,
        slot: DecorationSlot,
    ) -> DecorationRequest {
        let bounds = platform.bounds();
        let target_width = (bounds.size().x * width_factor).max(MIN_HAZARD_WIDTH);
        let strip = HazardStrip::build(target_width, spec);

        // Sink the strip a hair into the platform so no seam shows
        let anchor = Vec2::new(bounds.center().x, bounds.top() - spec.seat_skin);

        DecorationRequest {
            id: self.next_decoration_id(),
            platform: platform.id,
            slot,
            kind: DecorationKind::Hazard {
                strip,
                damage: spec.damage,
            },
            world_anchor: anchor,
            local_offset: anchor - platform.center(),
            size_hint: strip.collider_size,
            parent_scale_compensation: parent_compensation(&bounds),
            draw_order_boost: self.tuning.render_order_boost,
        }
    }

    fn place_collectible<R: Rng + ?Sized>(
        &mut self,
        platform: &Platform,
        spec: &CollectibleSpec,
        y_offset: f32,
        slot: DecorationSlot,
        rng: &mut R,
    ) -> DecorationRequest {
        let bounds = platform.bounds();
        let inset = self.tuning.collectible_inset;
        let lo = bounds.min.x + inset;
        let hi = bounds.max.x - inset;
        let x = if lo <= hi {
            uniform(rng, lo, hi)
        } else {
            bounds.center().x
        };
        let anchor = Vec2::new(x, bounds.top() + y_offset);

        DecorationRequest {
            id: self.next_decoration_id(),
            platform: platform.id,
            slot,
            kind: DecorationKind::Collectible {
                diameter: spec.diameter,
                heal: spec.heal,
            },
            world_anchor: anchor,
            local_offset: anchor - platform.center(),
            size_hint: Vec2::splat(spec.diameter),
            parent_scale_compensation: parent_compensation(&bounds),
            draw_order_boost: self.tuning.render_order_boost,
        }
    }
}

/// Inverse of the platform's stretch (a unit prefab scaled to its width)
fn parent_compensation(bounds: &Aabb) -> Vec2 {
    Vec2::new(safe_inverse(bounds.size().x), 1.0)
}
