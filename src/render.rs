//! Drawing the sketch onto an OpenCV canvas.
//!
//! Each frame is drawn from scratch: black background, caption, then the
//! faces translated so the animated face's centroid sits in the middle of
//! the canvas. The animated face gets a translucent fill; every face gets
//! a glowing nearest-neighbour mesh and a point cloud.

use crate::{
    config::Config,
    constants::{CAPTION_MARGIN, FACE_FILL_ALPHA, POINT_DIAMETER},
    glitch::GlitchClock,
    keypoint::{Detection, Keypoint},
    mesh::{face_centroid, MeshBuilder},
    utils::safe_cast::keypoint_to_pixel,
    Result,
};
use opencv::{
    core::{self, Mat, Point, Scalar, Size, Vector, BORDER_DEFAULT, CV_8UC3},
    imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_AA},
    prelude::*,
};
use rand::Rng;

const GREEN: Scalar = Scalar::new(0.0, 255.0, 0.0, 0.0);
const WHITE: Scalar = Scalar::new(255.0, 255.0, 255.0, 0.0);
const CAPTION_SCALE: f64 = 0.6;

/// What to draw this tick
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    /// Render positions of the animated face
    pub primary: &'a [Keypoint],
    /// Further faces, drawn where they were detected
    pub others: &'a [Detection],
}

/// Offset that moves the centroid of `points` to the canvas centre
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn centering_offset(points: &[Keypoint], width: i32, height: i32) -> Option<(f32, f32)> {
    let c = face_centroid(points)?;
    Some((width as f32 / 2.0 - c.x, height as f32 / 2.0 - c.y))
}

/// Draws scenes onto a fixed-size canvas
pub struct SketchRenderer {
    mesh: MeshBuilder,
    caption: String,
    glow_radius: i32,
    width: i32,
    height: i32,
}

impl SketchRenderer {
    /// Create a renderer from configuration
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            mesh: MeshBuilder::new(config.mesh.neighbors),
            caption: config.display.caption.clone(),
            glow_radius: config.mesh.glow_radius,
            width: config.display.canvas_width,
            height: config.display.canvas_height,
        }
    }

    /// Canvas size as `(width, height)`
    #[must_use]
    pub const fn canvas_size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    /// Redraw `canvas` for one tick
    ///
    /// # Errors
    ///
    /// Returns an error if an OpenCV drawing call fails
    pub fn draw<R: Rng + ?Sized>(
        &self,
        canvas: &mut Mat,
        scene: &Scene<'_>,
        glitch: &GlitchClock,
        rng: &mut R,
    ) -> Result<()> {
        *canvas = Mat::new_rows_cols_with_default(self.height, self.width, CV_8UC3, Scalar::all(0.0))?;
        self.draw_caption(canvas)?;

        let Some((dx, dy)) = centering_offset(scene.primary, self.width, self.height) else {
            return Ok(());
        };
        let shift = |points: &[Keypoint]| -> Vec<Keypoint> { points.iter().map(|p| p.translate(dx, dy)).collect() };

        let mut faces = vec![shift(scene.primary)];
        faces.extend(scene.others.iter().map(|d| shift(&d.keypoints)));

        self.draw_face_fill(canvas, &faces[0])?;

        let lines: Vec<(Point, Point)> = faces
            .iter()
            .flat_map(|face| self.mesh.build(face))
            .map(|s| {
                (
                    keypoint_to_pixel(glitch.jitter(s.from, rng)),
                    keypoint_to_pixel(glitch.jitter(s.to, rng)),
                )
            })
            .collect();
        self.draw_mesh(canvas, &lines)?;

        for point in faces.iter().flatten() {
            imgproc::circle(
                canvas,
                keypoint_to_pixel(glitch.jitter(*point, rng)),
                POINT_DIAMETER / 2,
                GREEN,
                -1,
                LINE_AA,
                0,
            )?;
        }

        Ok(())
    }

    fn draw_caption(&self, canvas: &mut Mat) -> Result<()> {
        if self.caption.is_empty() {
            return Ok(());
        }
        let mut baseline = 0;
        let size = imgproc::get_text_size(&self.caption, FONT_HERSHEY_SIMPLEX, CAPTION_SCALE, 1, &mut baseline)?;
        imgproc::put_text(
            canvas,
            &self.caption,
            Point::new((self.width - size.width) / 2, self.height - CAPTION_MARGIN),
            FONT_HERSHEY_SIMPLEX,
            CAPTION_SCALE,
            WHITE,
            1,
            LINE_AA,
            false,
        )?;
        Ok(())
    }

    /// Translucent silhouette through the keypoints in landmark order
    fn draw_face_fill(&self, canvas: &mut Mat, points: &[Keypoint]) -> Result<()> {
        if points.len() < 3 {
            return Ok(());
        }
        let polygon: Vector<Point> = points.iter().map(|&p| keypoint_to_pixel(p)).collect();
        let mut polygons = Vector::<Vector<Point>>::new();
        polygons.push(polygon);

        let base = canvas.try_clone()?;
        let mut overlay = canvas.try_clone()?;
        imgproc::fill_poly(&mut overlay, &polygons, GREEN, LINE_AA, 0, Point::default())?;
        core::add_weighted(&overlay, FACE_FILL_ALPHA, &base, 1.0 - FACE_FILL_ALPHA, 0.0, canvas, -1)?;
        Ok(())
    }

    /// Blurred copy of the lines underneath, then the lines themselves
    fn draw_mesh(&self, canvas: &mut Mat, lines: &[(Point, Point)]) -> Result<()> {
        if lines.is_empty() {
            return Ok(());
        }

        if self.glow_radius > 0 {
            let mut glow = Mat::new_rows_cols_with_default(self.height, self.width, CV_8UC3, Scalar::all(0.0))?;
            for &(a, b) in lines {
                imgproc::line(&mut glow, a, b, GREEN, 3, LINE_AA, 0)?;
            }
            let mut blurred = Mat::default();
            let sigma = f64::from(self.glow_radius) / 2.0;
            imgproc::gaussian_blur(&glow, &mut blurred, Size::new(0, 0), sigma, sigma, BORDER_DEFAULT)?;
            let base = canvas.try_clone()?;
            core::add(&base, &blurred, canvas, &Mat::default(), -1)?;
        }

        for &(a, b) in lines {
            imgproc::line(canvas, a, b, GREEN, 1, LINE_AA, 0)?;
        }
        Ok(())
    }
}
