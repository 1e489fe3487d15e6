//! Detection feeding the animator and renderer


use face_glow_mesh::{
    animator::{KeypointAnimator, RenderBounds},
    config::Config,
    constants::NUM_FACIAL_LANDMARKS,
    detection::{DetectionWorker, FaceDetector, OnnxFaceDetector},
    glitch::GlitchClock,
    keypoint::{Detection, Keypoint},
    render::{Scene, SketchRenderer},
    Result,
};
use opencv::{
    core::{Mat, Vec3b, CV_8UC3},
    prelude::*,
};
use rand::{rngs::StdRng, SeedableRng};
use std::{
    thread,
    time::{Duration, Instant},
};
use test_helpers::{create_test_image, five_points};

/// Reports the same face for every frame
struct FixedFace(Vec<Keypoint>);

impl FaceDetector for FixedFace {
    fn detect(&mut self, _frame: &Mat) -> Result<Vec<Detection>> {
        Ok(vec![Detection::from_keypoints(self.0.clone())])
    }
}

fn first_detection(worker: &mut DetectionWorker, frame: &Mat) -> Vec<Detection> {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        worker.offer_frame(frame).unwrap();
        let latest = worker.latest();
        if !latest.is_empty() {
            return latest.to_vec();
        }
        thread::sleep(Duration::from_millis(5));
    }
    panic!("no detection within 5s");
}

#[test]
fn test_worker_to_canvas() {
    let frame = create_test_image(480, 640, CV_8UC3).unwrap();
    let mut worker = DetectionWorker::spawn(FixedFace(five_points())).unwrap();
    let detections = first_detection(&mut worker, &frame);
    assert_eq!(detections[0].keypoints, five_points());

    let mut config = Config::default();
    config.display.canvas_width = 640;
    config.display.canvas_height = 480;
    let renderer = SketchRenderer::new(&config);
    let mut animator = KeypointAnimator::new(config.animation.transition(), RenderBounds::new(640.0, 480.0));
    let glitch = GlitchClock::default();
    let mut rng = StdRng::seed_from_u64(0);

    let primary = animator.compute_render_positions(Duration::ZERO, &detections[0].keypoints);
    let mut canvas = Mat::default();
    renderer
        .draw(&mut canvas, &Scene { primary: &primary, others: &detections[1..] }, &glitch, &mut rng)
        .unwrap();

    let green = (0..canvas.rows())
        .flat_map(|y| (0..canvas.cols()).map(move |x| (y, x)))
        .filter(|&(y, x)| canvas.at_2d::<Vec3b>(y, x).unwrap()[1] > 0)
        .count();
    assert!(green > 0);
}

#[test]
fn test_worker_shuts_down_on_drop() {
    let frame = create_test_image(32, 32, CV_8UC3).unwrap();
    let mut worker = DetectionWorker::spawn(FixedFace(five_points())).unwrap();
    first_detection(&mut worker, &frame);
    drop(worker);
}

#[test]
#[ignore = "Requires ONNX models"]
fn test_onnx_detector_on_blank_frame() {
    let config = Config::default();
    let mut detector = OnnxFaceDetector::new(&config.models, &config.detection).expect("Failed to load models");
    let frame = create_test_image(480, 640, CV_8UC3).unwrap();

    let detections = detector.detect(&frame).expect("Detection failed");
    for detection in detections {
        assert_eq!(detection.keypoints.len(), NUM_FACIAL_LANDMARKS);
    }
}

#[test]
#[ignore = "Requires ONNX models and a face image at assets/face.jpg"]
fn test_onnx_detector_finds_face() {
    use opencv::imgcodecs;

    let config = Config::default();
    let mut detector = OnnxFaceDetector::new(&config.models, &config.detection).expect("Failed to load models");
    let image = imgcodecs::imread("assets/face.jpg", imgcodecs::IMREAD_COLOR).unwrap();

    let detections = detector.detect(&image).expect("Detection failed");
    assert!(!detections.is_empty());
    let face = &detections[0];
    assert_eq!(face.keypoints.len(), NUM_FACIAL_LANDMARKS);
    for p in &face.keypoints {
        assert!(p.x >= 0.0 && p.x <= image.cols() as f32);
        assert!(p.y >= 0.0 && p.y <= image.rows() as f32);
    }
}
