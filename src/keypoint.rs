//! Keypoints and per-face detections.

use opencv::core::{Point2f, Rect};

/// A 2D landmark position. Keypoints are always handled as ordered
/// sequences; index `i` of one sequence corresponds to index `i` of another.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Keypoint {
    /// Horizontal position in canvas pixels
    pub x: f32,
    /// Vertical position in canvas pixels
    pub y: f32,
}

impl Keypoint {
    /// Create a keypoint
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another keypoint
    #[must_use]
    pub fn distance(&self, other: &Self) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Linear interpolation towards `target`.
    ///
    /// Written as `a * (1 - t) + b * t` so that `t == 0` yields `self` and
    /// `t == 1` yields `target` bit for bit.
    #[must_use]
    pub fn lerp(&self, target: &Self, t: f32) -> Self {
        Self {
            x: self.x * (1.0 - t) + target.x * t,
            y: self.y * (1.0 - t) + target.y * t,
        }
    }

    /// Shift by an offset
    #[must_use]
    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl From<Point2f> for Keypoint {
    fn from(p: Point2f) -> Self {
        Self::new(p.x, p.y)
    }
}

impl From<Keypoint> for Point2f {
    fn from(k: Keypoint) -> Self {
        Point2f::new(k.x, k.y)
    }
}

impl From<(f32, f32)> for Keypoint {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

/// One detected face: its bounding box and ordered landmark sequence
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Face bounding box in canvas coordinates
    pub bbox: Rect,
    /// Detector confidence
    pub score: f32,
    /// Ordered landmarks in canvas coordinates
    pub keypoints: Vec<Keypoint>,
}

impl Detection {
    /// Build a detection from landmarks alone
    #[must_use]
    pub fn from_keypoints(keypoints: Vec<Keypoint>) -> Self {
        Self {
            bbox: Rect::default(),
            score: 1.0,
            keypoints,
        }
    }
}
