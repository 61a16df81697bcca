//! Decoration contact handling
//!
//! The physics side may report several overlap-enter events for one
//! continuous touch. Spikes hurt once per episode (enter..exit); orbs heal
//! once and are then removed.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::decor::{DecorationId, DecorationKind, DecorationRequest};
use super::track::PlatformId;
use super::vitality::VitalitySink;

/// Identifies an actor able to touch decorations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
enum Effect {
    Hazard { damage: f32 },
    Collectible { heal: f32 },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct LiveDecoration {
    platform: PlatformId,
    effect: Effect,
}

/// Result of a contact-enter event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContactOutcome {
    /// Unknown decoration or already touching
    Ignored,
    /// Hazard effect applied
    Applied { delta: f32 },
    /// Collectible used up; the renderer should remove it
    Consumed { delta: f32 },
}

/// Live decoration registry plus the set of ongoing touches
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactTracker {
    live: BTreeMap<DecorationId, LiveDecoration>,
    touching: BTreeSet<(DecorationId, ActorId)>,
}

impl ContactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a placed decoration
    pub fn register(&mut self, request: &DecorationRequest) {
        let effect = match request.kind {
            DecorationKind::Hazard { damage, .. } => Effect::Hazard { damage },
            DecorationKind::Collectible { heal, .. } => Effect::Collectible { heal },
        };
        self.live.insert(
            request.id,
            LiveDecoration {
                platform: request.platform,
                effect,
            },
        );
    }

    pub fn is_live(&self, id: DecorationId) -> bool {
        self.live.contains_key(&id)
    }

    pub fn is_touching(&self, id: DecorationId, actor: ActorId) -> bool {
        self.touching.contains(&(id, actor))
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Actor began overlapping a decoration
    pub fn contact_enter<S: VitalitySink + ?Sized>(
        &mut self,
        id: DecorationId,
        actor: ActorId,
        sink: &mut S,
    ) -> ContactOutcome {
        let Some(decoration) = self.live.get(&id).copied() else {
            return ContactOutcome::Ignored;
        };

        match decoration.effect {
            Effect::Hazard { damage } => {
                if !self.touching.insert((id, actor)) {
                    return ContactOutcome::Ignored;
                }
                sink.apply_delta(-damage);
                ContactOutcome::Applied { delta: -damage }
            }
            Effect::Collectible { heal } => {
                sink.apply_delta(heal);
                self.live.remove(&id);
                ContactOutcome::Consumed { delta: heal }
            }
        }
    }

    /// Actor stopped overlapping a decoration
    pub fn contact_exit(&mut self, id: DecorationId, actor: ActorId) {
        self.touching.remove(&(id, actor));
    }

    /// Drop everything attached to a platform that scrolled away
    pub fn forget_platform(&mut self, platform: PlatformId) -> Vec<DecorationId> {
        let gone: Vec<DecorationId> = self
            .live
            .iter()
            .filter(|(_, d)| d.platform == platform)
            .map(|(id, _)| *id)
            .collect();
        for id in &gone {
            self.live.remove(id);
        }
        self.touching.retain(|(id, _)| !gone.contains(id));
        gone
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HazardSpec, VitalityTuning};
    use crate::sim::decor::{DecorationSlot, HazardStrip};
    use crate::sim::vitality::Vitality;
    use glam::Vec2;

    const PLAYER: ActorId = ActorId(1);

    fn request(id: u32, platform: u32, kind: DecorationKind) -> DecorationRequest {
        DecorationRequest {
            id: DecorationId(id),
            platform: PlatformId(platform),
            slot: DecorationSlot::None,
            kind,
            world_anchor: Vec2::ZERO,
            local_offset: Vec2::ZERO,
            size_hint: Vec2::ONE,
            parent_scale_compensation: Vec2::ONE,
            draw_order_boost: 0,
        }
    }

    fn spikes(id: u32, platform: u32) -> DecorationRequest {
        let spec = HazardSpec::default();
        request(
            id,
            platform,
            DecorationKind::Hazard {
                strip: HazardStrip::build(2.0, &spec),
                damage: 0.1,
            },
        )
    }

    fn orb(id: u32, platform: u32) -> DecorationRequest {
        request(
            id,
            platform,
            DecorationKind::Collectible {
                diameter: 0.7,
                heal: 0.1,
            },
        )
    }

    fn vitality(start: f32) -> Vitality {
        Vitality::new(&VitalityTuning {
            start,
            ..VitalityTuning::default()
        })
    }

    #[test]
    fn test_continuous_touch_hurts_once() {
        let mut tracker = ContactTracker::new();
        let mut v = vitality(1.0);
        tracker.register(&spikes(1, 1));

        // Physics reports an enter every tick for ten ticks
        let applied = (0..10)
            .filter(|_| {
                tracker.contact_enter(DecorationId(1), PLAYER, &mut v) != ContactOutcome::Ignored
            })
            .count();
        assert_eq!(applied, 1);
        assert!((v.value() - 0.9).abs() < 1e-6);

        // Leave and come back: second hit
        tracker.contact_exit(DecorationId(1), PLAYER);
        assert_eq!(
            tracker.contact_enter(DecorationId(1), PLAYER, &mut v),
            ContactOutcome::Applied { delta: -0.1 }
        );
        assert!((v.value() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_touches_tracked_per_actor() {
        let mut tracker = ContactTracker::new();
        let mut v = vitality(1.0);
        tracker.register(&spikes(1, 1));
        tracker.contact_enter(DecorationId(1), PLAYER, &mut v);
        assert!(tracker.is_touching(DecorationId(1), PLAYER));
        assert!(!tracker.is_touching(DecorationId(1), ActorId(2)));
        assert_eq!(
            tracker.contact_enter(DecorationId(1), ActorId(2), &mut v),
            ContactOutcome::Applied { delta: -0.1 }
        );
    }

    #[test]
    fn test_exit_without_enter_is_harmless() {
        let mut tracker = ContactTracker::new();
        tracker.contact_exit(DecorationId(42), PLAYER);
        assert_eq!(tracker.live_count(), 0);
    }

    #[test]
    fn test_collectible_single_use() {
        let mut tracker = ContactTracker::new();
        let mut v = vitality(0.5);
        tracker.register(&orb(7, 3));

        assert_eq!(
            tracker.contact_enter(DecorationId(7), PLAYER, &mut v),
            ContactOutcome::Consumed { delta: 0.1 }
        );
        assert!(!tracker.is_live(DecorationId(7)));
        assert_eq!(
            tracker.contact_enter(DecorationId(7), PLAYER, &mut v),
            ContactOutcome::Ignored
        );
        assert!((v.value() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_forget_platform() {
        let mut tracker = ContactTracker::new();
        let mut v = vitality(1.0);
        tracker.register(&spikes(1, 1));
        tracker.register(&orb(2, 2));
        tracker.contact_enter(DecorationId(1), PLAYER, &mut v);

        assert_eq!(tracker.forget_platform(PlatformId(1)), vec![DecorationId(1)]);
        assert!(!tracker.is_touching(DecorationId(1), PLAYER));
        assert!(tracker.is_live(DecorationId(2)));
    }
}
