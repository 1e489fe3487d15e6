//! Checked numeric conversions between model, keypoint and pixel space

use crate::{keypoint::Keypoint, Error, Result};
use opencv::core::Point;

/// Furthest off-canvas a drawn coordinate may land; OpenCV clips beyond it
pub const PIXEL_LIMIT: i32 = 1 << 20;

/// Safely convert usize to i32 with overflow checking
///
/// # Errors
///
/// Returns an error if the value exceeds `i32::MAX`
pub fn usize_to_i32(value: usize) -> Result<i32> {
    value
        .try_into()
        .map_err(|_| Error::InvalidInput(format!("Value {value} too large to fit in i32")))
}

/// Clamp and convert f32 to i32. Non-finite input maps to `min`.
#[must_use]
#[allow(clippy::cast_precision_loss)] // Acceptable for clamping bounds
#[allow(clippy::cast_possible_truncation)] // Clamping ensures safe truncation
pub fn f32_to_i32_clamp(value: f32, min: i32, max: i32) -> i32 {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };

    if !value.is_finite() {
        return min;
    }

    let result = value.round().clamp(min as f32, max as f32) as i32;
    result.clamp(min, max)
}

/// Nearest pixel to a keypoint, clamped to `±PIXEL_LIMIT`
#[must_use]
pub fn keypoint_to_pixel(point: Keypoint) -> Point {
    Point::new(
        f32_to_i32_clamp(point.x, -PIXEL_LIMIT, PIXEL_LIMIT),
        f32_to_i32_clamp(point.y, -PIXEL_LIMIT, PIXEL_LIMIT),
    )
}
