//! 6-DoF pose frames: each body drawn as its three coordinate axes.
//!
//! Axes are coloured by channel: X red, Y green, Z blue.

use super::trajectory::{Interpolate, TrajectorySample, TrajectorySource};
use crate::chronoview_space::{draw_line, project, slerp, Normalization};
use crate::options::RenderConfig;
use crate::raster::RasterFrame;
use crate::series::Pose6q;

/// Renders pose trajectories.
pub type PoseFrameSource = TrajectorySource<Pose6q>;

impl Interpolate for Pose6q {
    /// Linear in translation, slerp in orientation.
    fn interpolate(&self, other: &Self, fraction: f64) -> Self {
        let translation = self.translation * (1.0 - fraction) + other.translation * fraction;
        let rotation = slerp(&self.orientation(), &other.orientation(), fraction);
        Pose6q::new(translation, rotation.into_inner())
    }
}

impl TrajectorySample for Pose6q {
    fn draw(&self, canvas: &mut RasterFrame, normalization: &Normalization, config: &RenderConfig) {
        let scale = config.projection_scale();
        let origin = normalization.apply(&self.translation, config.z_offset);
        let Some(origin_px) = project(origin.x, origin.y, origin.z, scale) else {
            return;
        };

        let rotation = self.orientation().to_rotation_matrix();
        for axis in 0..3 {
            let tip = origin + rotation.matrix().column(axis) * config.axis_length;
            if let Some(tip_px) = project(tip.x, tip.y, tip.z, scale) {
                draw_line(canvas, axis, origin_px, tip_px, u8::MAX);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::FrameOptions;
    use crate::raster::ColorFormat;
    use crate::series::{TimeSeries, Trajectory};
    use crate::source::FrameSynth;
    use approx::assert_relative_eq;
    use nalgebra::{UnitQuaternion, Vector3};

    fn two_samples() -> PoseFrameSource {
        let series = TimeSeries::new(
            vec![0.0, 10.0],
            vec![Pose6q::at(0.0, 0.0, 0.0), Pose6q::at(1.0, 0.0, 0.0)],
        )
        .unwrap();
        PoseFrameSource::with_data(Trajectory::new(series))
    }

    fn lit_pixels(frame: &RasterFrame, channel: usize) -> usize {
        let (w, h) = frame.dims();
        (0..h)
            .flat_map(|y| (0..w).map(move |x| (x, y)))
            .filter(|&(x, y)| frame.get(x, y, channel).unwrap_or(0) > 0)
            .count()
    }

    #[test]
    fn test_interpolated_translation() {
        let source = two_samples();
        let resolved = source.resolve_all(5.0, 1.0, true);
        assert_eq!(resolved.len(), 1);

        let pose = resolved[0].1.unwrap();
        assert_relative_eq!(pose.translation, Vector3::new(0.5, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(pose.orientation().angle(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_nearest_without_interpolation_prefers_earlier() {
        let source = two_samples();
        let pose = source.resolve_all(5.0, 1.0, false)[0].1.unwrap();
        assert_relative_eq!(pose.translation, Vector3::zeros());

        let pose = source.resolve_all(6.0, 1.0, false)[0].1.unwrap();
        assert_relative_eq!(pose.translation, Vector3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_orientation_is_slerped() {
        let qa = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.0);
        let qb = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 1.0);
        let a = Pose6q::new(Vector3::zeros(), qa.into_inner());
        let b = Pose6q::new(Vector3::zeros(), qb.into_inner());

        let mid = a.interpolate(&b, 0.25);
        assert_relative_eq!(mid.orientation().angle(), 0.25, epsilon = 1e-9);
    }

    #[test]
    fn test_outside_range_draws_nothing() {
        let source = two_samples();
        let options = FrameOptions::default();

        assert!(source.get_frame(-1.0, 1.0, &options).is_uniform(0));
        assert!(source.get_frame(10.5, 1.0, &options).is_uniform(0));

        // The last sample itself is an exact match and is drawn
        assert!(!source.get_frame(10.0, 1.0, &options).is_uniform(0));
    }

    #[test]
    fn test_axes_drawn_per_channel() {
        let source = two_samples();
        let frame = source.get_frame(0.0, 1.0, &FrameOptions::default());

        assert_eq!(frame.format(), ColorFormat::Rgb);
        assert_eq!(frame.dims(), (300, 300));
        for channel in 0..3 {
            assert!(lit_pixels(&frame, channel) > 0, "axis {} not drawn", channel);
        }

        // Origin of the first pose: normalised (-0.5, 0, 2) -> (75, 150)
        assert_eq!(frame.get(75, 150, 0), Some(255));
    }

    #[test]
    fn test_stale_interpolation_marker() {
        let source = two_samples();

        // Samples are 10 apart: a window of 1 is stale, 20 is not
        let stale = source.get_frame(5.0, 1.0, &FrameOptions::default());
        assert_eq!(stale.get(0, 0, 0), Some(255));
        assert_eq!(stale.get(29, 29, 0), Some(255));
        assert_eq!(stale.get(0, 0, 1), Some(0));

        let fresh = source.get_frame(5.0, 20.0, &FrameOptions::default());
        assert_eq!(fresh.get(0, 0, 0), Some(0));

        // No marker without interpolation
        let nearest = source.get_frame(5.0, 1.0, &FrameOptions::default().with_interpolate(false));
        assert_eq!(nearest.get(0, 0, 0), Some(0));
    }

    #[test]
    fn test_multi_body_shares_normalization() {
        let series = TimeSeries::new(
            vec![0.0, 0.0, 1.0, 1.0],
            vec![
                Pose6q::at(0.0, 0.0, 0.0),
                Pose6q::at(4.0, 0.0, 0.0),
                Pose6q::at(0.0, 2.0, 0.0),
                Pose6q::at(4.0, 2.0, 0.0),
            ],
        )
        .unwrap();
        let trajectory = Trajectory::with_bodies(series, vec![1, 2, 1, 2]).unwrap();
        let source = PoseFrameSource::with_data(trajectory);

        let norm = source.normalization().unwrap();
        assert_relative_eq!(norm.largest_extent, 4.0);
        assert_relative_eq!(norm.centre, Vector3::new(2.0, 1.0, 0.0));

        let resolved = source.resolve_all(0.5, 1.0, true);
        assert_eq!(resolved.len(), 2);
        assert_relative_eq!(resolved[0].1.unwrap().translation, Vector3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(resolved[1].1.unwrap().translation, Vector3::new(4.0, 1.0, 0.0));
    }

    #[test]
    fn test_degenerate_data_renders() {
        let series = TimeSeries::new(vec![0.0, 1.0], vec![Pose6q::at(2.0, 2.0, 2.0); 2]).unwrap();
        let source = PoseFrameSource::with_data(Trajectory::new(series));
        assert_eq!(source.normalization().unwrap().largest_extent, 1.0);

        let frame = source.get_frame(0.5, 1.0, &FrameOptions::default());
        assert_eq!(frame.get(150, 150, 0), Some(255));
    }

    #[test]
    fn test_unset_and_repeat_queries() {
        let unset = PoseFrameSource::new();
        assert_eq!(unset.get_frame(0.0, 1.0, &FrameOptions::default()), RasterFrame::unset());
        assert_eq!(unset.get_dims(), (300, 300));

        let source = two_samples();
        let options = FrameOptions::default();
        let a = source.get_frame(3.3, 0.5, &options);
        let _ = source.get_frame(9.9, 0.5, &options);
        let _ = source.get_frame(-2.0, 0.5, &options);
        let b = source.get_frame(3.3, 0.5, &options);
        assert_eq!(a, b);
        assert_eq!(source.get_dims(), (300, 300));
    }
}
