//! Face glow mesh: a webcam sketch that draws detected facial keypoints as
//! a glowing nearest-neighbour mesh.
//!
//! The pipeline consists of:
//! 1. Face detection and 68-point landmark regression with ONNX Runtime,
//!    running on a background thread
//! 2. A scatter-and-return animation of the first face's keypoints, driven
//!    by press and release in the sketch window
//! 3. A k-nearest-neighbour mesh with glow, translucent face fill and
//!    periodic glitch bursts, drawn with `OpenCV`
//!
//! # Examples
//!
//! ## Animating keypoints
//!
//! ```
//! use face_glow_mesh::animator::{AnimationPhase, KeypointAnimator, RenderBounds};
//! use face_glow_mesh::keypoint::Keypoint;
//! use rand::{rngs::StdRng, SeedableRng};
//! use std::time::Duration;
//!
//! let mut animator = KeypointAnimator::new(Duration::from_millis(2000), RenderBounds::new(640.0, 480.0));
//! let mut rng = StdRng::seed_from_u64(7);
//! let face = vec![Keypoint::new(100.0, 100.0), Keypoint::new(120.0, 110.0)];
//!
//! let at_rest = animator.compute_render_positions(Duration::ZERO, &face);
//! assert_eq!(at_rest, face);
//!
//! animator.interaction_start(Duration::ZERO, &mut rng);
//! assert_eq!(animator.phase(), AnimationPhase::Scattering);
//! let scattered = animator.compute_render_positions(Duration::from_millis(2000), &face);
//! assert_eq!(scattered, animator.targets());
//! ```
//!
//! ## Building a mesh
//!
//! ```
//! use face_glow_mesh::keypoint::Keypoint;
//! use face_glow_mesh::mesh::{k_nearest_neighbors, MeshBuilder};
//!
//! # fn main() -> face_glow_mesh::Result<()> {
//! let points = [
//!     Keypoint::new(0.0, 0.0),
//!     Keypoint::new(1.0, 0.0),
//!     Keypoint::new(2.0, 0.0),
//!     Keypoint::new(10.0, 10.0),
//! ];
//! let nearest = k_nearest_neighbors(&points, 0, 2)?;
//! assert_eq!(nearest, vec![Keypoint::new(1.0, 0.0), Keypoint::new(2.0, 0.0)]);
//!
//! let segments = MeshBuilder::new(3).build(&points);
//! assert_eq!(segments.len(), 12);
//! # Ok(())
//! # }
//! ```
//!
//! ## Running the sketch
//!
//! ```no_run
//! use face_glow_mesh::app::{AppConfig, SketchApp, VideoSource};
//! use face_glow_mesh::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig {
//!     video_source: VideoSource::Camera(0),
//!     settings: Config::default(),
//! };
//! let mut app = SketchApp::new(config)?;
//! app.run()?;
//! # Ok(())
//! # }
//! ```

/// Keypoints and detections
pub mod keypoint;

/// Nearest-neighbour mesh construction
pub mod mesh;

/// Scatter and return animation state machine
pub mod animator;

/// Periodic glitch bursts
pub mod glitch;

/// Face and landmark detection
pub mod detection;

/// Pointer interaction from the sketch window
pub mod input;

/// Canvas drawing
pub mod render;

/// Utility functions for geometry and numeric conversions
pub mod utils;

/// Error types and result handling
pub mod error;

/// Main application module
pub mod app;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
