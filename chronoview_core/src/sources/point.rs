//! 3D point frames: each body drawn as a white marker.

use super::trajectory::{Interpolate, TrajectorySample, TrajectorySource};
use crate::chronoview_space::{draw_marker, project, Normalization};
use crate::options::RenderConfig;
use crate::raster::RasterFrame;
use crate::series::PointSample;

/// Renders point trajectories.
pub type PointFrameSource = TrajectorySource<PointSample>;

impl Interpolate for PointSample {
    fn interpolate(&self, other: &Self, fraction: f64) -> Self {
        PointSample(self.0 * (1.0 - fraction) + other.0 * fraction)
    }
}

impl TrajectorySample for PointSample {
    fn draw(&self, canvas: &mut RasterFrame, normalization: &Normalization, config: &RenderConfig) {
        let p = normalization.apply(&self.0, config.z_offset);
        if let Some(px) = project(p.x, p.y, p.z, config.projection_scale()) {
            draw_marker(canvas, px, config.marker_half_size, u8::MAX);
        }
    }
}
