//! Configuration management for the sketch
//!
//! Every setting defaults to the built-in constant, so a config file only
//! needs the keys it changes.

use crate::{constants, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model configuration
    pub models: ModelConfig,

    /// Face detection configuration
    pub detection: DetectionConfig,

    /// Scatter and return animation
    pub animation: AnimationConfig,

    /// Glitch bursts
    pub glitch: GlitchConfig,

    /// Glow mesh
    pub mesh: MeshConfig,

    /// Display configuration
    pub display: DisplayConfig,
}

/// Model file paths configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the SCRFD face detection ONNX model
    pub face_detector: PathBuf,

    /// Path to the facial landmarks ONNX model
    pub face_landmarks: PathBuf,
}

/// Face detection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Minimum face score (0.0-1.0)
    pub score_threshold: f32,

    /// IOU threshold for non-maximum suppression (0.0-1.0)
    pub nms_threshold: f32,

    /// Maximum number of faces to detect
    pub max_faces: usize,

    /// Face box expansion before landmark regression
    pub box_expansion: f32,
}

/// Animation timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Length of the scatter and return transitions
    pub transition_ms: u64,
}

/// Glitch timing and strength
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlitchConfig {
    /// Time between bursts
    pub interval_ms: u64,

    /// Burst length
    pub duration_ms: u64,

    /// Maximum per-axis offset while glitching
    pub jitter: f32,
}

/// Mesh appearance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Neighbours per keypoint
    pub neighbors: usize,

    /// Glow blur radius, 0 disables the glow
    pub glow_radius: i32,
}

/// Display configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Canvas width
    pub canvas_width: i32,

    /// Canvas height
    pub canvas_height: i32,

    /// Mirror the camera horizontally
    pub mirror: bool,

    /// Caption shown at the bottom
    pub caption: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            face_detector: PathBuf::from("assets/face_detector.onnx"),
            face_landmarks: PathBuf::from("assets/face_landmarks.onnx"),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            score_threshold: 0.5,
            nms_threshold: 0.4,
            max_faces: 10,
            box_expansion: constants::FACE_BOX_EXPANSION,
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            transition_ms: constants::TRANSITION_DURATION_MS,
        }
    }
}

impl Default for GlitchConfig {
    fn default() -> Self {
        Self {
            interval_ms: constants::GLITCH_INTERVAL_MS,
            duration_ms: constants::GLITCH_DURATION_MS,
            jitter: constants::GLITCH_JITTER,
        }
    }
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            neighbors: constants::MESH_NEIGHBORS,
            glow_radius: constants::GLOW_RADIUS,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            canvas_width: constants::DEFAULT_CANVAS_WIDTH,
            canvas_height: constants::DEFAULT_CANVAS_HEIGHT,
            mirror: false,
            caption: constants::TAP_MESSAGE.to_string(),
        }
    }
}

impl AnimationConfig {
    /// Transition length as a duration
    #[must_use]
    pub const fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }
}

impl GlitchConfig {
    /// Time between bursts
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Burst length
    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid configuration
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate value ranges. Model paths are checked when the models load.
    ///
    /// # Errors
    ///
    /// Returns a [`Error::ConfigError`] naming the first invalid setting
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.detection.score_threshold) {
            return Err(Error::ConfigError(
                "Score threshold must be between 0.0 and 1.0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.detection.nms_threshold) {
            return Err(Error::ConfigError(
                "NMS threshold must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.detection.max_faces == 0 {
            return Err(Error::ConfigError("Max faces must be greater than 0".to_string()));
        }
        if self.display.canvas_width <= 0 || self.display.canvas_height <= 0 {
            return Err(Error::ConfigError("Canvas size must be positive".to_string()));
        }
        if self.glitch.duration_ms > self.glitch.interval_ms {
            return Err(Error::ConfigError(
                "Glitch duration must not exceed the glitch interval".to_string(),
            ));
        }
        if !self.glitch.jitter.is_finite() || self.glitch.jitter < 0.0 {
            return Err(Error::ConfigError("Glitch jitter must be non-negative".to_string()));
        }
        if !(1..=constants::NUM_FACIAL_LANDMARKS).contains(&self.mesh.neighbors) {
            return Err(Error::ConfigError(format!(
                "Mesh neighbors must be between 1 and {}",
                constants::NUM_FACIAL_LANDMARKS
            )));
        }
        if self.mesh.glow_radius < 0 {
            return Err(Error::ConfigError("Glow radius must be non-negative".to_string()));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Face Glow Mesh Configuration

# Model paths
models:
  face_detector: "assets/face_detector.onnx"
  face_landmarks: "assets/face_landmarks.onnx"

# Face detection parameters
detection:
  score_threshold: 0.5
  nms_threshold: 0.4
  max_faces: 10
  box_expansion: 0.2

# Scatter / return transition
animation:
  transition_ms: 2000

# Periodic glitch bursts
glitch:
  interval_ms: 10000
  duration_ms: 500
  jitter: 10.0

# Glow mesh
mesh:
  neighbors: 3
  glow_radius: 10

# Display settings
display:
  canvas_width: 1280
  canvas_height: 700
  mirror: false
  caption: "Tap the screen..."
"#;
