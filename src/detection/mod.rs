//! Face detection collaborator and the background detection loop.
//!
//! Detection runs on its own thread at whatever rate the model allows. The
//! render loop offers it frames and picks up whatever detections are newest;
//! frames offered while the detector is busy are dropped and a render tick
//! with no new result reuses the previous one.

/// SCRFD face bounding box detector
pub mod face_boxes;

/// 68-point landmark regression
pub mod landmarks;

/// ONNX Runtime implementation of [`FaceDetector`]
pub mod onnx;

use crate::{keypoint::Detection, Error, Result};
use crossbeam::channel::{bounded, unbounded, Receiver, Sender, TrySendError};
use log::{debug, error, info, warn};
use opencv::{core::Mat, prelude::*};
use std::thread::{self, JoinHandle};

pub use onnx::OnnxFaceDetector;

/// Anything that can turn a video frame into face detections.
///
/// Detections are ordered; the first one drives the animation.
pub trait FaceDetector: Send {
    /// Detect all faces in `frame`
    ///
    /// # Errors
    ///
    /// Returns an error if this detection attempt failed. The caller is
    /// expected to try again with a later frame.
    fn detect(&mut self, frame: &Mat) -> Result<Vec<Detection>>;
}

/// Owns the detection thread and the hand-off in both directions
pub struct DetectionWorker {
    frames: Option<Sender<Mat>>,
    results: Receiver<Vec<Detection>>,
    latest: Vec<Detection>,
    handle: Option<JoinHandle<()>>,
}

impl DetectionWorker {
    /// Start a detection thread around `detector`
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned
    pub fn spawn<D: FaceDetector + 'static>(detector: D) -> Result<Self> {
        let (frame_tx, frame_rx) = bounded::<Mat>(1);
        let (result_tx, result_rx) = unbounded();

        let handle = thread::Builder::new()
            .name("face-detector".to_string())
            .spawn(move || detection_loop(detector, &frame_rx, &result_tx))?;
        info!("Detection worker started");

        Ok(Self {
            frames: Some(frame_tx),
            results: result_rx,
            latest: Vec::new(),
            handle: Some(handle),
        })
    }

    /// Hand a frame to the detector if it is idle.
    ///
    /// Returns `false` when the frame was dropped because a previous frame
    /// is still waiting.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be copied or the detection
    /// thread has exited
    pub fn offer_frame(&self, frame: &Mat) -> Result<bool> {
        let frames = self.frames.as_ref().ok_or(Error::WorkerStopped)?;
        if frames.is_full() {
            return Ok(false);
        }

        match frames.try_send(frame.try_clone()?) {
            Ok(()) => Ok(true),
            Err(TrySendError::Full(_)) => Ok(false),
            Err(TrySendError::Disconnected(_)) => Err(Error::WorkerStopped),
        }
    }

    /// Newest non-empty set of detections, or the previous one if nothing
    /// new has arrived. Empty until the first face is found.
    pub fn latest(&mut self) -> &[Detection] {
        while let Ok(detections) = self.results.try_recv() {
            if !detections.is_empty() {
                self.latest = detections;
            }
        }
        &self.latest
    }
}

impl Drop for DetectionWorker {
    fn drop(&mut self) {
        // Closing the frame channel ends the loop
        self.frames.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Detection thread panicked");
            }
        }
        debug!("Detection worker stopped");
    }
}

fn detection_loop<D: FaceDetector>(mut detector: D, frames: &Receiver<Mat>, results: &Sender<Vec<Detection>>) {
    for frame in frames {
        match detector.detect(&frame) {
            Ok(detections) => {
                if results.send(detections).is_err() {
                    break;
                }
            }
            Err(e) => error!("Face detection failed: {e}"),
        }
    }
}
