//! Constants used throughout the application

/// Number of facial landmarks produced by the landmark model
pub const NUM_FACIAL_LANDMARKS: usize = 68;

/// Duration of a scatter or return transition in milliseconds
pub const TRANSITION_DURATION_MS: u64 = 2000;

/// Time between glitch bursts in milliseconds
pub const GLITCH_INTERVAL_MS: u64 = 10_000;

/// How long a glitch burst lasts in milliseconds
pub const GLITCH_DURATION_MS: u64 = 500;

/// Maximum per-axis jitter applied to points and lines while glitching
pub const GLITCH_JITTER: f32 = 10.0;

/// Number of nearest neighbours each keypoint is connected to
pub const MESH_NEIGHBORS: usize = 3;

/// Blur radius of the mesh glow
pub const GLOW_RADIUS: i32 = 10;

/// Face fill opacity (25 out of 255)
pub const FACE_FILL_ALPHA: f64 = 25.0 / 255.0;

/// Diameter of a rendered keypoint
pub const POINT_DIAMETER: i32 = 5;

/// Default canvas size
pub const DEFAULT_CANVAS_WIDTH: i32 = 1280;
pub const DEFAULT_CANVAS_HEIGHT: i32 = 700;

/// Caption drawn at the bottom of the canvas
pub const TAP_MESSAGE: &str = "Tap the screen...";

/// Caption distance from the bottom edge
pub const CAPTION_MARGIN: i32 = 20;

/// Image normalization constants for face detection
pub const IMAGE_NORMALIZATION_OFFSET: f32 = 127.5;
pub const IMAGE_NORMALIZATION_SCALE: f32 = 128.0;

/// Face box expansion applied before landmark regression
pub const FACE_BOX_EXPANSION: f32 = 0.2;

/// Window title
pub const WINDOW_NAME: &str = "Face Glow Mesh";
