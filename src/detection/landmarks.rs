use crate::{constants::NUM_FACIAL_LANDMARKS, keypoint::Keypoint, utils::safe_cast::usize_to_i32, Error, Result};
use ndarray::{Array4, CowArray};
use opencv::core::{Mat, Size, Vec3f, CV_32F};
use opencv::imgproc::{self, InterpolationFlags};
use opencv::prelude::*;
use ort::{Environment, GraphOptimizationLevel, LoggingLevel, Session, SessionBuilder, Value};
use std::path::Path;
use std::sync::Arc;

/// Default landmark model input size
const DEFAULT_LANDMARK_INPUT_SIZE: usize = 128;

/// Facial landmark regressor running on ONNX Runtime
pub struct LandmarkDetector {
    session: Session,
    input_size: usize,
}

impl LandmarkDetector {
    /// Load the landmark model
    ///
    /// # Errors
    ///
    /// Returns an error if the ONNX environment or model cannot be loaded
    pub fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        log::info!("Loading landmark model: {}", model_path.as_ref().display());
        let environment = Arc::new(
            Environment::builder()
                .with_name("landmarks")
                .with_log_level(LoggingLevel::Warning)
                .build()?,
        );

        let session = SessionBuilder::new(&environment)?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_model_from_file(model_path)?;

        if session.outputs.is_empty() {
            return Err(Error::ModelError("Landmark model has no outputs".to_string()));
        }

        Ok(Self {
            session,
            input_size: DEFAULT_LANDMARK_INPUT_SIZE,
        })
    }

    /// Landmarks of a cropped face, in pixel coordinates of `face`
    ///
    /// # Errors
    ///
    /// Returns an error if preprocessing or inference fails, or if the model
    /// returns too few values
    #[allow(clippy::cast_precision_loss)]
    pub fn detect(&self, face: &Mat) -> Result<Vec<Keypoint>> {
        let tensor = self.preprocess(face)?;
        let input = CowArray::from(tensor.into_dyn());
        let outputs = self
            .session
            .run(vec![Value::from_array(self.session.allocator(), &input)?])?;

        let output = outputs
            .first()
            .ok_or_else(|| Error::ModelOutputError("No output from landmark model".to_string()))?;
        let tensor = output.try_extract::<f32>()?;
        let values: Vec<f32> = tensor.view().iter().copied().collect();

        decode_marks(&values, face.cols() as f32, face.rows() as f32, self.input_size as f32)
    }

    /// Resize, convert to RGB in `[0, 1]` and lay out as NHWC
    fn preprocess(&self, face: &Mat) -> Result<Array4<f32>> {
        let side = usize_to_i32(self.input_size)?;
        let mut resized = Mat::default();
        imgproc::resize(
            face,
            &mut resized,
            Size::new(side, side),
            0.0,
            0.0,
            InterpolationFlags::INTER_LINEAR as i32,
        )?;

        let mut rgb = Mat::default();
        imgproc::cvt_color(&resized, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;
        let mut float_image = Mat::default();
        rgb.convert_to(&mut float_image, CV_32F, 1.0 / 255.0, 0.0)?;

        let data: Vec<f32> = float_image
            .data_typed::<Vec3f>()?
            .iter()
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();

        Array4::from_shape_vec((1, self.input_size, self.input_size, 3), data)
            .map_err(|e| Error::ModelError(format!("Failed to build landmark input: {e}")))
    }
}

/// Scale raw `x, y` pairs from model input space to a `width × height` face crop
///
/// # Errors
///
/// Returns an error if fewer than [`NUM_FACIAL_LANDMARKS`] pairs are present
pub fn decode_marks(values: &[f32], width: f32, height: f32, input_size: f32) -> Result<Vec<Keypoint>> {
    if values.len() < NUM_FACIAL_LANDMARKS * 2 {
        return Err(Error::ModelOutputError(format!(
            "Expected {} landmark values, got {}",
            NUM_FACIAL_LANDMARKS * 2,
            values.len()
        )));
    }

    Ok(values
        .chunks_exact(2)
        .take(NUM_FACIAL_LANDMARKS)
        .map(|xy| Keypoint::new(xy[0] * width / input_size, xy[1] * height / input_size))
        .collect())
}
