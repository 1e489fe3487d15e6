//! Periodic glitch bursts.
//!
//! The clock turns on once more than `interval` has passed since the last
//! burst started and turns off once more than `duration` has passed since
//! then. It is re-evaluated on every tick rather than scheduled.

use crate::{
    constants::{GLITCH_DURATION_MS, GLITCH_INTERVAL_MS, GLITCH_JITTER},
    keypoint::Keypoint,
};
use rand::Rng;
use std::time::Duration;

/// Wall-clock driven glitch toggle
#[derive(Debug, Clone)]
pub struct GlitchClock {
    interval: Duration,
    duration: Duration,
    jitter: f32,
    last_trigger: Duration,
    active: bool,
}

impl GlitchClock {
    /// Create a clock whose first burst starts after `interval`
    #[must_use]
    pub fn new(interval: Duration, duration: Duration, jitter: f32) -> Self {
        Self {
            interval,
            duration,
            jitter: jitter.abs(),
            last_trigger: Duration::ZERO,
            active: false,
        }
    }

    /// Advance to `now` and report whether a burst is in progress
    pub fn update(&mut self, now: Duration) -> bool {
        if now.saturating_sub(self.last_trigger) > self.interval {
            self.active = true;
            self.last_trigger = now;
            log::debug!("Glitch burst started at {:?}", now);
        }

        if self.active && now.saturating_sub(self.last_trigger) > self.duration {
            self.active = false;
        }

        self.active
    }

    /// Whether the last `update` left a burst running
    #[must_use]
    pub const fn is_glitching(&self) -> bool {
        self.active
    }

    /// When the most recent burst started
    #[must_use]
    pub const fn last_trigger(&self) -> Duration {
        self.last_trigger
    }

    /// Offset a point by a fresh random amount while glitching.
    ///
    /// Outside a burst the point is returned unchanged. Nothing is stored,
    /// so two calls jitter the same point differently.
    pub fn jitter<R: Rng + ?Sized>(&self, point: Keypoint, rng: &mut R) -> Keypoint {
        if !self.active || self.jitter == 0.0 {
            return point;
        }
        point.translate(
            rng.gen_range(-self.jitter..=self.jitter),
            rng.gen_range(-self.jitter..=self.jitter),
        )
    }
}

impl Default for GlitchClock {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(GLITCH_INTERVAL_MS),
            Duration::from_millis(GLITCH_DURATION_MS),
            GLITCH_JITTER,
        )
    }
}
