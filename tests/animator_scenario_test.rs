//! End-to-end scatter and return timelines


use face_glow_mesh::{
    animator::{AnimationPhase, KeypointAnimator, RenderBounds},
    keypoint::Keypoint,
};
use rand::{rngs::StdRng, SeedableRng};
use std::time::Duration;
use test_helpers::{assert_close, five_points};

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn animator() -> KeypointAnimator {
    KeypointAnimator::new(ms(2000), RenderBounds::new(640.0, 480.0))
}

#[test]
fn test_scatter_then_return_timeline() {
    let face = five_points();
    let mut animator = animator();
    let mut rng = StdRng::seed_from_u64(42);

    assert_eq!(animator.compute_render_positions(ms(0), &face), face);

    animator.interaction_start(ms(0), &mut rng);
    let targets = animator.targets().to_vec();
    assert_eq!(targets.len(), face.len());

    // Progress 0 leaves the points where they were drawn last
    assert_eq!(animator.compute_render_positions(ms(0), &face), face);

    let halfway: Vec<Keypoint> = face.iter().zip(&targets).map(|(a, b)| a.lerp(b, 0.5)).collect();
    assert_close(&animator.compute_render_positions(ms(1000), &face), &halfway, 1e-3);

    assert_eq!(animator.compute_render_positions(ms(2000), &face), targets);

    animator.interaction_end(ms(2000));
    assert_eq!(animator.phase(), AnimationPhase::Returning);
    assert_eq!(animator.compute_render_positions(ms(2000), &face), targets);

    assert_eq!(animator.compute_render_positions(ms(4000), &face), face);
    assert_eq!(animator.phase(), AnimationPhase::Idle);
}

#[test]
fn test_scatter_targets_inside_bounds() {
    let face = five_points();
    let mut animator = animator();
    let mut rng = StdRng::seed_from_u64(3);

    animator.compute_render_positions(ms(0), &face);
    animator.interaction_start(ms(0), &mut rng);
    for target in animator.targets() {
        assert!((0.0..640.0).contains(&target.x), "{target:?}");
        assert!((0.0..480.0).contains(&target.y), "{target:?}");
    }
}

#[test]
fn test_same_seed_same_targets() {
    let face = five_points();
    let run = |seed| {
        let mut animator = animator();
        let mut rng = StdRng::seed_from_u64(seed);
        animator.compute_render_positions(ms(0), &face);
        animator.interaction_start(ms(0), &mut rng);
        animator.targets().to_vec()
    };
    assert_eq!(run(11), run(11));
    assert_ne!(run(11), run(12));
}

#[test]
fn test_detection_frozen_while_scattered_then_followed_on_return() {
    let face = five_points();
    let moved: Vec<Keypoint> = face.iter().map(|p| p.translate(50.0, 0.0)).collect();
    let mut animator = animator();
    let mut rng = StdRng::seed_from_u64(5);

    animator.compute_render_positions(ms(0), &face);
    animator.interaction_start(ms(0), &mut rng);
    animator.compute_render_positions(ms(2000), &moved);
    assert_eq!(animator.last_detected(), face.as_slice());

    animator.interaction_end(ms(2000));
    animator.compute_render_positions(ms(2000), &moved);
    assert_eq!(animator.last_detected(), moved.as_slice());
    assert_eq!(animator.compute_render_positions(ms(4000), &moved), moved);
}

#[test]
fn test_release_mid_scatter_returns_from_current_positions() {
    let face = five_points();
    let mut animator = animator();
    let mut rng = StdRng::seed_from_u64(8);

    animator.compute_render_positions(ms(0), &face);
    animator.interaction_start(ms(0), &mut rng);
    let mid = animator.compute_render_positions(ms(500), &face);

    animator.interaction_end(ms(500));
    assert_eq!(animator.compute_render_positions(ms(500), &face), mid);
    assert_eq!(animator.compute_render_positions(ms(2500), &face), face);
}

#[test]
fn test_press_again_while_returning_rescatters() {
    let face = five_points();
    let mut animator = animator();
    let mut rng = StdRng::seed_from_u64(9);

    animator.compute_render_positions(ms(0), &face);
    animator.interaction_start(ms(0), &mut rng);
    animator.compute_render_positions(ms(2000), &face);
    animator.interaction_end(ms(2000));
    animator.compute_render_positions(ms(2500), &face);

    animator.interaction_start(ms(2500), &mut rng);
    assert_eq!(animator.phase(), AnimationPhase::Scattering);
    let targets = animator.targets().to_vec();
    assert_eq!(animator.compute_render_positions(ms(4500), &face), targets);
}

#[test]
fn test_no_detection_yet() {
    let mut animator = animator();
    let mut rng = StdRng::seed_from_u64(1);

    assert!(animator.compute_render_positions(ms(0), &[]).is_empty());
    animator.interaction_start(ms(0), &mut rng);
    assert!(animator.targets().is_empty());
    assert!(animator.compute_render_positions(ms(1000), &[]).is_empty());
}

#[test]
fn test_face_count_change_falls_back_to_live() {
    let face = five_points();
    let mut animator = animator();
    let mut rng = StdRng::seed_from_u64(2);

    animator.compute_render_positions(ms(0), &face[..3]);
    animator.interaction_start(ms(0), &mut rng);
    assert_eq!(animator.targets().len(), 3);

    // Scattering keeps the three-point detection, so five live points do not line up
    assert_eq!(animator.compute_render_positions(ms(1000), &face), face);
}
