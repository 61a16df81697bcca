//! Run clock
//!
//! Counts simulated seconds survived; freezes when the run ends.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SurvivalTimer {
    elapsed: f32,
    stopped: bool,
}

impl SurvivalTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, dt: f32) {
        if !self.stopped {
            self.elapsed += dt;
        }
    }

    /// Freeze the clock (idempotent)
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        !self.stopped
    }
}

/// Format seconds as `mm:ss` (whole seconds, truncated)
pub fn format_survival(seconds: f32) -> String {
    let total = seconds.max(0.0) as u32;
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_freezes_on_stop() {
        let mut timer = SurvivalTimer::new();
        timer.advance(1.5);
        timer.stop();
        timer.stop();
        timer.advance(10.0);
        assert_eq!(timer.elapsed_secs(), 1.5);
        assert!(!timer.is_running());

        timer.reset();
        assert!(timer.is_running());
        assert_eq!(timer.elapsed_secs(), 0.0);
    }

    #[test]
    fn test_format() {
        assert_eq!(format_survival(0.0), "00:00");
        assert_eq!(format_survival(59.9), "00:59");
        assert_eq!(format_survival(83.2), "01:23");
        assert_eq!(format_survival(-4.0), "00:00");
    }
}
