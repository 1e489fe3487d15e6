//! Scatter-and-return animation of a face's keypoints.
//!
//! The animator owns the last real detection, the scatter targets and the
//! transition clock. Each render tick it turns the live keypoints into the
//! positions to draw:
//!
//! - `Idle` passes live keypoints through.
//! - `Scattering` moves the previously rendered positions towards random
//!   targets inside the render bounds.
//! - `Returning` moves the previously rendered positions back to the last
//!   detection and re-enters `Idle` once the transition completes.
//!
//! Because the source of each step is the previous output rather than the
//! detected position, motion eases out instead of following a straight
//! fixed-speed path.

use crate::{
    constants::TRANSITION_DURATION_MS,
    keypoint::Keypoint,
    Error, Result,
};
use log::{debug, warn};
use rand::Rng;
use std::time::Duration;

/// Size of the area scatter targets are drawn from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderBounds {
    /// Width in canvas pixels
    pub width: f32,
    /// Height in canvas pixels
    pub height: f32,
}

impl RenderBounds {
    /// Create bounds
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Uniformly random position inside the bounds
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Keypoint {
        Keypoint::new(sample_axis(rng, self.width), sample_axis(rng, self.height))
    }
}

fn sample_axis<R: Rng + ?Sized>(rng: &mut R, extent: f32) -> f32 {
    if extent > 0.0 {
        rng.gen_range(0.0..extent)
    } else {
        0.0
    }
}

/// Where the animation currently is
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationState {
    /// No interaction; live keypoints render as detected
    Idle,
    /// Interaction held; keypoints fly towards `targets`
    Scattering {
        /// One random destination per keypoint index
        targets: Vec<Keypoint>,
        /// When the interaction started
        started: Duration,
    },
    /// Interaction released; keypoints fly back to the last detection
    Returning {
        /// When the interaction ended
        started: Duration,
    },
}

/// Fieldless view of [`AnimationState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationPhase {
    /// See [`AnimationState::Idle`]
    Idle,
    /// See [`AnimationState::Scattering`]
    Scattering,
    /// See [`AnimationState::Returning`]
    Returning,
}

/// Drives keypoints between detected, scattered and returning positions
#[derive(Debug, Clone)]
pub struct KeypointAnimator {
    state: AnimationState,
    last_detected: Vec<Keypoint>,
    rendered: Vec<Keypoint>,
    transition: Duration,
    bounds: RenderBounds,
    /// Set while consecutive ticks keep failing to line up
    mismatch_reported: bool,
}

impl KeypointAnimator {
    /// Create an idle animator
    #[must_use]
    pub fn new(transition: Duration, bounds: RenderBounds) -> Self {
        Self {
            state: AnimationState::Idle,
            last_detected: Vec::new(),
            rendered: Vec::new(),
            transition,
            bounds,
            mismatch_reported: false,
        }
    }

    /// Idle animator with the default transition length
    #[must_use]
    pub fn with_bounds(bounds: RenderBounds) -> Self {
        Self::new(Duration::from_millis(TRANSITION_DURATION_MS), bounds)
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> &AnimationState {
        &self.state
    }

    /// Current phase
    #[must_use]
    pub const fn phase(&self) -> AnimationPhase {
        match self.state {
            AnimationState::Idle => AnimationPhase::Idle,
            AnimationState::Scattering { .. } => AnimationPhase::Scattering,
            AnimationState::Returning { .. } => AnimationPhase::Returning,
        }
    }

    /// Scatter targets, empty unless scattering
    #[must_use]
    pub fn targets(&self) -> &[Keypoint] {
        match &self.state {
            AnimationState::Scattering { targets, .. } => targets,
            _ => &[],
        }
    }

    /// Most recent live detection
    #[must_use]
    pub fn last_detected(&self) -> &[Keypoint] {
        &self.last_detected
    }

    /// Positions produced by the last tick
    #[must_use]
    pub fn rendered(&self) -> &[Keypoint] {
        &self.rendered
    }

    /// Transition length
    #[must_use]
    pub const fn transition(&self) -> Duration {
        self.transition
    }

    /// Record a live detection.
    ///
    /// Ignored while scattering so the return trip heads for where the face
    /// was when the interaction began. Empty detections are ignored too.
    pub fn observe_detection(&mut self, keypoints: &[Keypoint]) {
        if keypoints.is_empty() || self.phase() == AnimationPhase::Scattering {
            return;
        }
        self.last_detected.clear();
        self.last_detected.extend_from_slice(keypoints);
    }

    /// Press or touch began: pick a random target per known keypoint.
    ///
    /// Does nothing if already scattering.
    pub fn interaction_start<R: Rng + ?Sized>(&mut self, now: Duration, rng: &mut R) {
        if self.phase() == AnimationPhase::Scattering {
            debug!("Interaction start ignored, already scattering");
            return;
        }

        let targets: Vec<Keypoint> = (0..self.last_detected.len())
            .map(|_| self.bounds.sample(rng))
            .collect();
        debug!("Scattering {} keypoints", targets.len());
        self.state = AnimationState::Scattering { targets, started: now };
    }

    /// Press or touch ended: head back to the last detection.
    ///
    /// Does nothing unless scattering.
    pub fn interaction_end(&mut self, now: Duration) {
        if self.phase() != AnimationPhase::Scattering {
            return;
        }
        debug!("Returning keypoints");
        self.state = AnimationState::Returning { started: now };
    }

    /// Positions to draw at `now` given the live keypoints of the first face.
    ///
    /// An empty `live` slice means no detection has arrived; the last
    /// detection stands in for it. If the held state does not line up with
    /// the live keypoints the live keypoints are returned for this tick.
    pub fn compute_render_positions(&mut self, now: Duration, live: &[Keypoint]) -> Vec<Keypoint> {
        self.observe_detection(live);

        let live: Vec<Keypoint> = if live.is_empty() {
            self.last_detected.clone()
        } else {
            live.to_vec()
        };

        let positions = match self.advance(now, &live) {
            Ok(positions) => {
                self.mismatch_reported = false;
                positions
            }
            Err(e) => {
                // Report once per run of mismatched ticks
                if self.mismatch_reported {
                    debug!("{e}; drawing live keypoints");
                } else {
                    warn!("{e}; drawing live keypoints");
                    self.mismatch_reported = true;
                }
                live
            }
        };

        self.rendered.clone_from(&positions);
        positions
    }

    fn advance(&mut self, now: Duration, live: &[Keypoint]) -> Result<Vec<Keypoint>> {
        match &self.state {
            AnimationState::Idle => Ok(live.to_vec()),
            AnimationState::Scattering { targets, started } => {
                let t = self.progress(now, *started);
                interpolate(self.source(live), targets, t)
            }
            AnimationState::Returning { started } => {
                let t = self.progress(now, *started);
                let positions = interpolate(self.source(live), &self.last_detected, t)?;
                if t >= 1.0 {
                    debug!("Return complete, idle");
                    self.state = AnimationState::Idle;
                }
                Ok(positions)
            }
        }
    }

    /// Previous output if it lines up with the live keypoints
    fn source<'a>(&'a self, live: &'a [Keypoint]) -> &'a [Keypoint] {
        if self.rendered.len() == live.len() {
            &self.rendered
        } else {
            live
        }
    }

    fn progress(&self, now: Duration, started: Duration) -> f32 {
        transition_progress(now.saturating_sub(started), self.transition)
    }
}

/// Fraction of a transition of length `total` completed after `elapsed`,
/// clamped to `[0, 1]`. A zero-length transition is always complete.
#[must_use]
pub fn transition_progress(elapsed: Duration, total: Duration) -> f32 {
    if total.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f32() / total.as_secs_f32()).clamp(0.0, 1.0)
}

/// Index-wise interpolation of two equally long keypoint sequences
///
/// # Errors
///
/// Returns [`Error::DataShapeMismatch`] if the lengths differ
pub fn interpolate(from: &[Keypoint], to: &[Keypoint], t: f32) -> Result<Vec<Keypoint>> {
    if from.len() != to.len() {
        return Err(Error::DataShapeMismatch {
            expected: to.len(),
            actual: from.len(),
        });
    }
    Ok(from.iter().zip(to).map(|(a, b)| a.lerp(b, t)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn face() -> Vec<Keypoint> {
        vec![
            Keypoint::new(100.0, 100.0),
            Keypoint::new(120.0, 100.0),
            Keypoint::new(110.0, 130.0),
        ]
    }

    fn animator() -> KeypointAnimator {
        KeypointAnimator::new(ms(2000), RenderBounds::new(640.0, 480.0))
    }

    #[test]
    fn test_progress_clamped() {
        assert_eq!(transition_progress(ms(0), ms(2000)), 0.0);
        assert_eq!(transition_progress(ms(1000), ms(2000)), 0.5);
        assert_eq!(transition_progress(ms(5000), ms(2000)), 1.0);
        assert_eq!(transition_progress(ms(10), Duration::ZERO), 1.0);
    }

    #[test]
    fn test_interpolate_rejects_mismatch() {
        let err = interpolate(&face(), &face()[..2], 0.5).unwrap_err();
        assert!(matches!(err, Error::DataShapeMismatch { expected: 2, actual: 3 }));
    }

    #[test]
    fn test_idle_passes_live_through() {
        let mut a = animator();
        for tick in 0..5 {
            assert_eq!(a.compute_render_positions(ms(tick * 16), &face()), face());
        }
        assert_eq!(a.phase(), AnimationPhase::Idle);
        assert_eq!(a.last_detected(), face().as_slice());
    }

    #[test]
    fn test_no_detection_renders_last_known() {
        let mut a = animator();
        assert!(a.compute_render_positions(ms(0), &[]).is_empty());
        a.compute_render_positions(ms(16), &face());
        assert_eq!(a.compute_render_positions(ms(32), &[]), face());
    }

    #[test]
    fn test_targets_inside_bounds() {
        let mut a = animator();
        let mut rng = StdRng::seed_from_u64(1);
        a.compute_render_positions(ms(0), &face());
        a.interaction_start(ms(0), &mut rng);
        assert_eq!(a.targets().len(), 3);
        for t in a.targets() {
            assert!((0.0..640.0).contains(&t.x));
            assert!((0.0..480.0).contains(&t.y));
        }
    }

    #[test]
    fn test_start_while_scattering_keeps_targets() {
        let mut a = animator();
        let mut rng = StdRng::seed_from_u64(2);
        a.compute_render_positions(ms(0), &face());
        a.interaction_start(ms(0), &mut rng);
        let targets = a.targets().to_vec();
        a.interaction_start(ms(500), &mut rng);
        assert_eq!(a.targets(), targets.as_slice());
        assert_eq!(a.state(), &AnimationState::Scattering { targets, started: ms(0) });
    }

    #[test]
    fn test_end_while_idle_is_noop() {
        let mut a = animator();
        a.interaction_end(ms(100));
        assert_eq!(a.phase(), AnimationPhase::Idle);
    }

    #[test]
    fn test_scattering_ignores_new_detections() {
        let mut a = animator();
        let mut rng = StdRng::seed_from_u64(3);
        a.compute_render_positions(ms(0), &face());
        a.interaction_start(ms(0), &mut rng);

        let moved: Vec<Keypoint> = face().iter().map(|p| p.translate(50.0, 0.0)).collect();
        a.compute_render_positions(ms(100), &moved);
        assert_eq!(a.last_detected(), face().as_slice());
    }

    #[test]
    fn test_mismatched_detection_falls_back_to_live() {
        let mut a = animator();
        let mut rng = StdRng::seed_from_u64(4);
        a.compute_render_positions(ms(0), &face());
        a.interaction_start(ms(0), &mut rng);

        let shorter = &face()[..2];
        assert_eq!(a.compute_render_positions(ms(1000), shorter), shorter.to_vec());
    }

    #[test]
    fn test_mismatch_reported_once_per_run() {
        let mut a = animator();
        let mut rng = StdRng::seed_from_u64(6);
        a.interaction_start(ms(0), &mut rng);

        // Face appears while the press with no targets is held
        for tick in 1..=5 {
            assert_eq!(a.compute_render_positions(ms(tick * 16), &face()), face());
            assert!(a.mismatch_reported);
        }

        a.interaction_end(ms(100));
        a.compute_render_positions(ms(100), &face());
        assert!(!a.mismatch_reported);
    }

    #[test]
    fn test_start_without_detection_scatters_nothing() {
        let mut a = animator();
        let mut rng = StdRng::seed_from_u64(5);
        a.interaction_start(ms(0), &mut rng);
        assert_eq!(a.phase(), AnimationPhase::Scattering);
        assert!(a.targets().is_empty());
        // First face arrives mid-interaction and is drawn as detected
        assert_eq!(a.compute_render_positions(ms(500), &face()), face());
    }
}
