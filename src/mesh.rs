//! Nearest-neighbour mesh over a face's keypoints.
//!
//! Every keypoint is joined to its `k` closest keypoints by a line segment.
//! Ranking is a full stable sort per source point, so a frame costs
//! `O(n² log n)` for `n` keypoints. With the fixed 68-point landmark model
//! this is a few thousand comparisons per face.

use crate::{keypoint::Keypoint, Error, Result};

/// A line segment of the glow mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Keypoint the segment starts at
    pub from: Keypoint,
    /// One of its nearest neighbours
    pub to: Keypoint,
}

/// Indices of the `k` keypoints closest to `points[source]`.
///
/// Results are ordered by ascending distance; equal distances keep their
/// index order. The source itself is never returned, so fewer
/// than `k + 1` points yields every other index.
///
/// # Errors
///
/// Returns an error if `source` is out of bounds
pub fn nearest_indices(points: &[Keypoint], source: usize, k: usize) -> Result<Vec<usize>> {
    let origin = points.get(source).ok_or_else(|| {
        Error::InvalidInput(format!(
            "Source index {source} out of bounds for {} keypoints",
            points.len()
        ))
    })?;

    let mut ranked: Vec<(usize, f32)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| (i, origin.distance(p)))
        .collect();

    // `sort_by` is stable, which gives the index tie-break
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));

    Ok(ranked
        .into_iter()
        .filter(|&(i, _)| i != source)
        .take(k)
        .map(|(i, _)| i)
        .collect())
}

/// The `k` keypoints closest to `points[source]`, nearest first.
///
/// # Errors
///
/// Returns an error if `source` is out of bounds
pub fn k_nearest_neighbors(points: &[Keypoint], source: usize, k: usize) -> Result<Vec<Keypoint>> {
    Ok(nearest_indices(points, source, k)?
        .into_iter()
        .map(|i| points[i])
        .collect())
}

/// Arithmetic mean of all keypoints, `None` for an empty set
#[must_use]
#[allow(clippy::cast_precision_loss)] // Landmark counts are tiny
pub fn face_centroid(points: &[Keypoint]) -> Option<Keypoint> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f32;
    let (sx, sy) = points
        .iter()
        .fold((0.0_f32, 0.0_f32), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some(Keypoint::new(sx / n, sy / n))
}

/// Builds mesh segments for one detection
#[derive(Debug, Clone, Copy)]
pub struct MeshBuilder {
    neighbors: usize,
}

impl MeshBuilder {
    /// Create a builder connecting each keypoint to `neighbors` others
    #[must_use]
    pub const fn new(neighbors: usize) -> Self {
        Self { neighbors }
    }

    /// Neighbour count per keypoint
    #[must_use]
    pub const fn neighbors(&self) -> usize {
        self.neighbors
    }

    /// One segment from every keypoint to each of its nearest neighbours.
    ///
    /// Mutual neighbours produce two segments, one in each direction.
    #[must_use]
    pub fn build(&self, points: &[Keypoint]) -> Vec<Segment> {
        let per_point = self.neighbors.min(points.len().saturating_sub(1));
        let mut segments = Vec::with_capacity(points.len() * per_point);
        for (source, &from) in points.iter().enumerate() {
            // Index is always in range here
            if let Ok(indices) = nearest_indices(points, source, self.neighbors) {
                segments.extend(indices.into_iter().map(|i| Segment { from, to: points[i] }));
            }
        }
        segments
    }
}

impl Default for MeshBuilder {
    fn default() -> Self {
        Self::new(crate::constants::MESH_NEIGHBORS)
    }
}
