use super::{
    face_boxes::FaceBoxDetector,
    landmarks::LandmarkDetector,
    FaceDetector,
};
use crate::{
    config::{DetectionConfig, ModelConfig},
    constants::NUM_FACIAL_LANDMARKS,
    keypoint::Detection,
    utils::expand_face_box,
    Error, Result,
};
use log::debug;
use opencv::{core::Mat, prelude::*};

/// Face boxes from SCRFD, then 68 landmarks per box
pub struct OnnxFaceDetector {
    boxes: FaceBoxDetector,
    landmarks: LandmarkDetector,
    box_expansion: f32,
    max_faces: usize,
}

impl OnnxFaceDetector {
    /// Load both models
    ///
    /// # Errors
    ///
    /// Returns an error if either model cannot be loaded
    pub fn new(models: &ModelConfig, detection: &DetectionConfig) -> Result<Self> {
        Ok(Self {
            boxes: FaceBoxDetector::new(&models.face_detector, detection.score_threshold, detection.nms_threshold)?,
            landmarks: LandmarkDetector::new(&models.face_landmarks)?,
            box_expansion: detection.box_expansion,
            max_faces: detection.max_faces,
        })
    }
}

impl FaceDetector for OnnxFaceDetector {
    #[allow(clippy::cast_precision_loss)]
    fn detect(&mut self, frame: &Mat) -> Result<Vec<Detection>> {
        let faces = self.boxes.detect(frame)?;
        debug!("{} face boxes", faces.len());

        let mut detections = Vec::with_capacity(faces.len().min(self.max_faces));
        for face in faces.into_iter().take(self.max_faces) {
            let Some(region) = expand_face_box(face.rect, frame.cols(), frame.rows(), self.box_expansion) else {
                continue;
            };

            let crop = Mat::roi(frame, region)?.try_clone()?;
            let marks = self.landmarks.detect(&crop)?;
            if marks.len() != NUM_FACIAL_LANDMARKS {
                return Err(Error::DetectorError(format!(
                    "Landmark model returned {} points",
                    marks.len()
                )));
            }

            let (ox, oy) = (region.x as f32, region.y as f32);
            detections.push(Detection {
                bbox: face.rect,
                score: face.score,
                keypoints: marks.into_iter().map(|p| p.translate(ox, oy)).collect(),
            });
        }

        Ok(detections)
    }
}
