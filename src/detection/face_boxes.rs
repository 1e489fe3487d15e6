use crate::{
    constants::{IMAGE_NORMALIZATION_OFFSET, IMAGE_NORMALIZATION_SCALE},
    Error, Result,
};
use ndarray::{Array4, CowArray};
use opencv::core::{self, Mat, Rect, Scalar, Size, Vec3f, BORDER_CONSTANT, CV_32F};
use opencv::imgproc::{self, InterpolationFlags};
use opencv::prelude::*;
use ort::{Environment, GraphOptimizationLevel, LoggingLevel, Session, SessionBuilder, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Default SCRFD input resolution
const DEFAULT_INPUT_SIZE: i32 = 640;

/// A detected face region
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceBox {
    /// Bounding box in source image coordinates
    pub rect: Rect,
    /// Confidence score
    pub score: f32,
}

/// Decoded box before suppression, corners as `[x1, y1, x2, y2]`
#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    score: f32,
    corners: [f32; 4],
}

/// Output layout of an SCRFD export, inferred from its output count
#[derive(Debug, Clone)]
struct AnchorLayout {
    strides: Vec<i32>,
    anchors_per_cell: usize,
    /// Number of output tensors per head (scores, boxes, optional keypoints)
    branches: usize,
}

impl AnchorLayout {
    fn for_output_count(outputs: usize) -> Self {
        match outputs {
            6 | 9 => Self {
                strides: vec![8, 16, 32],
                anchors_per_cell: 2,
                branches: 3,
            },
            10 | 15 => Self {
                strides: vec![8, 16, 32, 64, 128],
                anchors_per_cell: 1,
                branches: 5,
            },
            _ => {
                log::warn!("Unknown SCRFD layout with {outputs} outputs, assuming 3 strides");
                Self::for_output_count(6)
            }
        }
    }
}

/// SCRFD face detector running on ONNX Runtime
pub struct FaceBoxDetector {
    session: Session,
    input_size: (i32, i32),
    score_threshold: f32,
    nms_threshold: f32,
    layout: AnchorLayout,
    anchor_cache: HashMap<(i32, i32, i32), Vec<(f32, f32)>>,
}

impl FaceBoxDetector {
    /// Load the detector model
    ///
    /// # Errors
    ///
    /// Returns an error if the ONNX environment or model cannot be loaded
    pub fn new<P: AsRef<Path>>(model_path: P, score_threshold: f32, nms_threshold: f32) -> Result<Self> {
        log::info!("Loading face detector: {}", model_path.as_ref().display());
        let environment = Arc::new(
            Environment::builder()
                .with_name("face_boxes")
                .with_log_level(LoggingLevel::Warning)
                .build()?,
        );

        let session = SessionBuilder::new(&environment)?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_model_from_file(model_path)?;

        let input = session
            .inputs
            .first()
            .ok_or_else(|| Error::ModelError("Face detector has no inputs".to_string()))?;

        // [batch, channels, height, width], dynamic axes fall back to the default
        let dim = |i: usize| {
            input
                .dimensions
                .get(i)
                .copied()
                .flatten()
                .and_then(|d| i32::try_from(d).ok())
                .unwrap_or(DEFAULT_INPUT_SIZE)
        };
        let input_size = (dim(3), dim(2));
        let layout = AnchorLayout::for_output_count(session.outputs.len());

        Ok(Self {
            session,
            input_size,
            score_threshold,
            nms_threshold,
            layout,
            anchor_cache: HashMap::new(),
        })
    }

    /// Detect faces, highest score first
    ///
    /// # Errors
    ///
    /// Returns an error if the image is empty, preprocessing fails or
    /// inference fails
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn detect(&mut self, image: &Mat) -> Result<Vec<FaceBox>> {
        let (rows, cols) = (image.rows(), image.cols());
        if rows <= 0 || cols <= 0 {
            return Err(Error::InvalidInput("Empty image".to_string()));
        }

        // Letterbox into the model input, keeping aspect ratio
        let (in_w, in_h) = self.input_size;
        let image_ratio = rows as f32 / cols as f32;
        let (new_w, new_h) = if image_ratio > in_h as f32 / in_w as f32 {
            (((in_h as f32 / image_ratio) as i32).max(1), in_h)
        } else {
            (in_w, ((in_w as f32 * image_ratio) as i32).max(1))
        };
        let scale = new_h as f32 / rows as f32;

        let mut resized = Mat::default();
        imgproc::resize(
            image,
            &mut resized,
            Size::new(new_w, new_h),
            0.0,
            0.0,
            InterpolationFlags::INTER_LINEAR as i32,
        )?;
        let mut padded = Mat::default();
        core::copy_make_border(
            &resized,
            &mut padded,
            0,
            in_h - new_h,
            0,
            in_w - new_w,
            BORDER_CONSTANT,
            Scalar::all(0.0),
        )?;

        let tensor = self.preprocess(&padded)?;
        let candidates = self.forward(tensor)?;

        let scaled: Vec<Candidate> = candidates
            .into_iter()
            .map(|c| Candidate {
                score: c.score,
                corners: c.corners.map(|v| v / scale),
            })
            .collect();

        Ok(suppress(scaled, self.nms_threshold)
            .into_iter()
            .map(|c| FaceBox {
                rect: Rect::new(
                    c.corners[0] as i32,
                    c.corners[1] as i32,
                    (c.corners[2] - c.corners[0]) as i32,
                    (c.corners[3] - c.corners[1]) as i32,
                ),
                score: c.score,
            })
            .collect())
    }

    /// BGR image to normalized NCHW tensor
    #[allow(clippy::cast_sign_loss)] // OpenCV dimensions are positive
    fn preprocess(&self, image: &Mat) -> Result<Array4<f32>> {
        let mut rgb = Mat::default();
        imgproc::cvt_color(image, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;
        let mut float_image = Mat::default();
        rgb.convert_to(&mut float_image, CV_32F, 1.0, 0.0)?;

        let width = float_image.cols() as usize;
        let height = float_image.rows() as usize;
        let mut tensor = Array4::<f32>::zeros((1, 3, height, width));
        for (i, pixel) in float_image.data_typed::<Vec3f>()?.iter().enumerate() {
            let (y, x) = (i / width, i % width);
            for c in 0..3 {
                tensor[[0, c, y, x]] = (pixel[c] - IMAGE_NORMALIZATION_OFFSET) / IMAGE_NORMALIZATION_SCALE;
            }
        }
        Ok(tensor)
    }

    /// Run the model and decode every anchor above the score threshold
    #[allow(clippy::cast_precision_loss)]
    fn forward(&mut self, tensor: Array4<f32>) -> Result<Vec<Candidate>> {
        let input = CowArray::from(tensor.into_dyn());
        let outputs = self
            .session
            .run(vec![Value::from_array(self.session.allocator(), &input)?])?;

        let (in_w, in_h) = self.input_size;
        let mut candidates = Vec::new();

        for (head, &stride) in self.layout.strides.iter().enumerate() {
            let scores = tensor_values(&outputs, head)?;
            let distances = tensor_values(&outputs, head + self.layout.branches)?;
            let centers = anchor_centers(
                &mut self.anchor_cache,
                in_h / stride,
                in_w / stride,
                stride,
                self.layout.anchors_per_cell,
            );

            for (i, &score) in scores.iter().enumerate() {
                if score < self.score_threshold {
                    continue;
                }
                let (Some(&(cx, cy)), Some(d)) = (centers.get(i), distances.get(i * 4..i * 4 + 4)) else {
                    break;
                };
                let s = stride as f32;
                candidates.push(Candidate {
                    score,
                    corners: [cx - d[0] * s, cy - d[1] * s, cx + d[2] * s, cy + d[3] * s],
                });
            }
        }

        Ok(candidates)
    }
}

fn tensor_values(outputs: &[Value<'_>], index: usize) -> Result<Vec<f32>> {
    let value = outputs
        .get(index)
        .ok_or_else(|| Error::ModelOutputError(format!("Missing output tensor {index}")))?;
    let tensor = value.try_extract::<f32>()?;
    let values = tensor.view().iter().copied().collect();
    Ok(values)
}

/// Anchor centers for one stride, row-major with `per_cell` copies per cell
#[allow(clippy::cast_precision_loss)]
fn anchor_centers(
    cache: &mut HashMap<(i32, i32, i32), Vec<(f32, f32)>>,
    rows: i32,
    cols: i32,
    stride: i32,
    per_cell: usize,
) -> Vec<(f32, f32)> {
    cache
        .entry((rows, cols, stride))
        .or_insert_with(|| {
            let mut centers = Vec::new();
            for y in 0..rows {
                for x in 0..cols {
                    let center = ((x * stride) as f32, (y * stride) as f32);
                    centers.extend(std::iter::repeat(center).take(per_cell.max(1)));
                }
            }
            centers
        })
        .clone()
}

/// Intersection over union with inclusive pixel extents
fn iou(a: &[f32; 4], b: &[f32; 4]) -> f32 {
    let area = |r: &[f32; 4]| (r[2] - r[0] + 1.0) * (r[3] - r[1] + 1.0);
    let w = (a[2].min(b[2]) - a[0].max(b[0]) + 1.0).max(0.0);
    let h = (a[3].min(b[3]) - a[1].max(b[1]) + 1.0).max(0.0);
    let inter = w * h;
    inter / (area(a) + area(b) - inter)
}

/// Greedy non-maximum suppression, returns survivors by descending score
fn suppress(mut candidates: Vec<Candidate>, threshold: f32) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    let mut keep: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        if keep.iter().all(|k| iou(&k.corners, &candidate.corners) <= threshold) {
            keep.push(candidate);
        }
    }
    keep
}
