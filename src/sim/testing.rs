//! Test-only RNG helpers

use rand::RngCore;

/// RNG that repeats one word forever
///
/// `FixedRng(0)` makes every `random::<f32>()` draw 0.0; `FixedRng(u32::MAX)`
/// draws just under 1.0.
pub struct FixedRng(pub u32);

impl FixedRng {
    pub fn low() -> Self {
        Self(0)
    }

    pub fn high() -> Self {
        Self(u32::MAX)
    }
}

impl RngCore for FixedRng {
    fn next_u32(&mut self) -> u32 {
        self.0
    }

    fn next_u64(&mut self) -> u64 {
        ((self.0 as u64) << 32) | self.0 as u64
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        let word = self.0.to_le_bytes();
        for chunk in dst.chunks_mut(4) {
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
    }
}
