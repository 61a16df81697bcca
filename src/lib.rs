//! Sanity Runner - An endless side-scroller simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (track generation, decoration, sanity, movement gating)
//! - `config`: Data-driven game balance

pub mod config;
pub mod sim;

pub use config::{ConfigError, Tuning};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (50 Hz physics)
    pub const SIM_DT: f32 = 1.0 / 50.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Safety margin applied to the jump apex when bounding platform steps
    pub const REACH_SAFETY: f32 = 0.9;
    /// Smallest jump height used when deriving launch speed
    pub const MIN_JUMP_HEIGHT: f32 = 0.01;

    /// Floor for the hazard/collectible weight sum
    pub const MIN_WEIGHT_TOTAL: f32 = 0.0001;
    /// Narrowest hazard strip ever built
    pub const MIN_HAZARD_WIDTH: f32 = 0.1;
    /// Narrowest tooth width used when laying out a hazard strip
    pub const MIN_TOOTH_WIDTH: f32 = 0.01;

    /// Smallest distance one platform (width plus gap) may advance the track
    pub const MIN_PLATFORM_ADVANCE: f32 = 0.01;

    /// Platform collider thickness when none is configured
    pub const PLATFORM_THICKNESS: f32 = 0.25;
    /// Radius of the circle cast below the actor's feet for the grounded check
    pub const GROUND_PROBE_RADIUS: f32 = 0.1;
}

/// Clamp to [0, 1]
#[inline]
pub fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

/// Linear interpolation from `a` to `b` by `t` (t clamped to [0, 1])
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * clamp01(t)
}

/// Reciprocal that falls back to 1.0 for a zero divisor
///
/// Used when cancelling a parent scale; a collapsed parent must not push
/// infinities into child transforms.
#[inline]
pub fn safe_inverse(v: f32) -> f32 {
    if v != 0.0 && v.is_finite() { 1.0 / v } else { 1.0 }
}

/// Uniform draw in `[lo, hi]` that tolerates `lo == hi` and inverted bounds
#[inline]
pub fn uniform<R: rand::Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    let t: f32 = rng.random();
    (lo + (hi - lo) * t).clamp(lo, hi)
}
