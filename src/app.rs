//! Main application module for the glow mesh sketch.

use crate::{
    animator::{KeypointAnimator, RenderBounds},
    config::Config,
    constants::WINDOW_NAME,
    detection::{DetectionWorker, FaceDetector, OnnxFaceDetector},
    error::Result,
    glitch::GlitchClock,
    input::{InputQueue, InteractionEvent},
    render::{Scene, SketchRenderer},
};
use log::{debug, info, warn};
use opencv::{
    core::{self, Mat, Size},
    highgui::{self, WINDOW_AUTOSIZE},
    imgproc::{self, INTER_LINEAR},
    prelude::*,
    videoio::{self, VideoCapture, CAP_PROP_BUFFERSIZE},
};
use rand::{rngs::StdRng, SeedableRng};
use std::time::{Duration, Instant};

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Camera index or video file path
    pub video_source: VideoSource,
    /// Sketch settings
    pub settings: Config,
}

/// Video source type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    /// Webcam index
    Camera(i32),
    /// Video file path
    File(String),
}

/// Main application struct
pub struct SketchApp {
    config: AppConfig,
    video_capture: VideoCapture,
    worker: DetectionWorker,
    input: InputQueue,
    animator: KeypointAnimator,
    glitch: GlitchClock,
    renderer: SketchRenderer,
    rng: StdRng,
    started: Instant,
}

impl SketchApp {
    /// Create the sketch with the ONNX face detector
    ///
    /// # Errors
    ///
    /// Returns an error if the models, the video source or the window
    /// cannot be opened
    pub fn new(config: AppConfig) -> Result<Self> {
        info!("Loading face models");
        let detector = OnnxFaceDetector::new(&config.settings.models, &config.settings.detection)?;
        Self::with_detector(config, detector)
    }

    /// Create the sketch around any face detector
    ///
    /// # Errors
    ///
    /// Returns an error if the video source or the window cannot be opened
    #[allow(clippy::cast_precision_loss)]
    pub fn with_detector<D: FaceDetector + 'static>(config: AppConfig, detector: D) -> Result<Self> {
        info!("Initializing Face Glow Mesh");

        let video_capture = match &config.video_source {
            VideoSource::Camera(index) => {
                info!("Opening camera {}", index);
                let mut cap = VideoCapture::new(*index, videoio::CAP_ANY)?;

                // Reduce buffer size for lower latency (webcam only)
                cap.set(CAP_PROP_BUFFERSIZE, 1.0)?;
                cap
            }
            VideoSource::File(path) => {
                info!("Opening video file: {}", path);
                VideoCapture::from_file(path, videoio::CAP_ANY)?
            }
        };

        let worker = DetectionWorker::spawn(detector)?;

        highgui::named_window(WINDOW_NAME, WINDOW_AUTOSIZE)?;
        let input = InputQueue::new();
        input.attach(WINDOW_NAME)?;

        let settings = &config.settings;
        let bounds = RenderBounds::new(
            settings.display.canvas_width as f32,
            settings.display.canvas_height as f32,
        );
        let animator = KeypointAnimator::new(settings.animation.transition(), bounds);
        let glitch = GlitchClock::new(
            settings.glitch.interval(),
            settings.glitch.duration(),
            settings.glitch.jitter,
        );
        let renderer = SketchRenderer::new(settings);

        Ok(Self {
            config,
            video_capture,
            worker,
            input,
            animator,
            glitch,
            renderer,
            rng: StdRng::from_entropy(),
            started: Instant::now(),
        })
    }

    /// Run until the video ends or ESC / `q` is pressed
    ///
    /// # Errors
    ///
    /// Returns an error if capture, drawing or display fails
    pub fn run(&mut self) -> Result<()> {
        info!("Starting main application loop");

        let mut frame = Mat::default();
        let mut canvas = Mat::default();
        let mut frame_count = 0u32;
        let mut last_fps_update = Instant::now();

        loop {
            if !self.video_capture.read(&mut frame)? || frame.empty() {
                if matches!(self.config.video_source, VideoSource::File(_)) {
                    info!("End of video file reached");
                    break;
                }
                warn!("Failed to read frame, retrying...");
                continue;
            }

            let resized = self.prepare_frame(&frame)?;
            if !self.worker.offer_frame(&resized)? {
                debug!("Detector busy, frame dropped");
            }

            self.tick(self.started.elapsed(), &mut canvas)?;
            highgui::imshow(WINDOW_NAME, &canvas)?;

            frame_count += 1;
            let since = last_fps_update.elapsed();
            if since >= Duration::from_secs(1) {
                debug!("{:.1} fps", f64::from(frame_count) / since.as_secs_f64());
                frame_count = 0;
                last_fps_update = Instant::now();
            }

            let key = highgui::wait_key(1)?;
            if key == 27 || key == i32::from(b'q') {
                info!("Exit requested by user");
                break;
            }
        }

        info!("Application shutting down");
        Ok(())
    }

    /// One render tick at `now` since start
    ///
    /// # Errors
    ///
    /// Returns an error if drawing fails
    pub fn tick(&mut self, now: Duration, canvas: &mut Mat) -> Result<()> {
        for event in self.input.drain() {
            match event {
                InteractionEvent::Start => self.animator.interaction_start(now, &mut self.rng),
                InteractionEvent::End => self.animator.interaction_end(now),
            }
        }

        let detections = self.worker.latest();
        let (live, others) = match detections.split_first() {
            Some((first, rest)) => (first.keypoints.as_slice(), rest),
            None => (&[][..], &[][..]),
        };

        let primary = self.animator.compute_render_positions(now, live);
        self.glitch.update(now);

        let scene = Scene { primary: &primary, others };
        self.renderer.draw(canvas, &scene, &self.glitch, &mut self.rng)
    }

    /// Scale the camera frame to the canvas, mirrored if configured
    fn prepare_frame(&self, frame: &Mat) -> Result<Mat> {
        let (width, height) = self.renderer.canvas_size();
        let mut resized = Mat::default();
        imgproc::resize(frame, &mut resized, Size::new(width, height), 0.0, 0.0, INTER_LINEAR)?;

        if self.config.settings.display.mirror {
            let mut flipped = Mat::default();
            core::flip(&resized, &mut flipped, 1)?;
            return Ok(flipped);
        }
        Ok(resized)
    }
}
