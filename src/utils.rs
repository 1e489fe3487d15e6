//! Geometry helpers shared by detection and rendering.

pub mod safe_cast;

use opencv::core::Rect;
use safe_cast::f32_to_i32_clamp;

/// Grow a face box by `shift` of its size on every side, square it and keep
/// it inside a `max_width × max_height` image.
///
/// Returns `None` if nothing of the box lies inside the image.
#[must_use]
#[allow(clippy::cast_precision_loss)] // Precision loss acceptable for box dimensions
pub fn expand_face_box(bbox: Rect, max_width: i32, max_height: i32, shift: f32) -> Option<Rect> {
    let dx = f32_to_i32_clamp(bbox.width as f32 * shift, -bbox.width / 2, max_width);
    let dy = f32_to_i32_clamp(bbox.height as f32 * shift, -bbox.height / 2, max_height);

    let x = bbox.x - dx;
    let y = bbox.y - dy;
    let side = (bbox.width + 2 * dx).max(bbox.height + 2 * dy);

    // Center the square on the expanded box, then pull it back inside
    let cx = x + (bbox.width + 2 * dx) / 2;
    let cy = y + (bbox.height + 2 * dy) / 2;
    let side = side.min(max_width).min(max_height);
    if side <= 0 {
        return None;
    }
    let left = (cx - side / 2).clamp(0, max_width - side);
    let top = (cy - side / 2).clamp(0, max_height - side);

    Some(Rect::new(left, top, side, side))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inside(r: &Rect, w: i32, h: i32) -> bool {
        r.x >= 0 && r.y >= 0 && r.x + r.width <= w && r.y + r.height <= h
    }

    #[test]
    fn test_expand_is_square_and_larger() {
        let r = expand_face_box(Rect::new(50, 50, 40, 60), 400, 400, 0.2).unwrap();
        assert_eq!(r.width, r.height);
        assert!(r.width > 60);
        assert!(inside(&r, 400, 400));
    }

    #[test]
    fn test_expand_at_image_edges() {
        for bbox in [Rect::new(190, 190, 20, 20), Rect::new(0, 0, 10, 10), Rect::new(-5, 180, 30, 30)] {
            let r = expand_face_box(bbox, 200, 200, 0.5).unwrap();
            assert!(inside(&r, 200, 200), "{r:?} escapes the image");
            assert_eq!(r.width, r.height);
        }
    }

    #[test]
    fn test_expand_larger_than_image() {
        let r = expand_face_box(Rect::new(0, 0, 300, 100), 200, 120, 0.2).unwrap();
        assert_eq!(r.width, 120);
        assert!(inside(&r, 200, 120));
    }

    #[test]
    fn test_negative_shift_contracts() {
        let r = expand_face_box(Rect::new(50, 50, 40, 40), 200, 200, -0.1).unwrap();
        assert!(r.width > 0 && r.width < 40);
    }

    #[test]
    fn test_empty_image() {
        assert!(expand_face_box(Rect::new(0, 0, 10, 10), 0, 0, 0.2).is_none());
    }
}
