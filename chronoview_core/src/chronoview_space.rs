//! The "SPACE" Engine - Orientation interpolation and 3D-to-2D rendering
//!
//! Pose and point sources render into a small virtual camera:
//! 1. Every translation is normalised into a unit volume centred on the
//!    optical axis and pushed `z_offset` in front of the camera
//! 2. Points are projected with a pinhole model (division by z)
//! 3. Lines between projected points are rasterised with Bresenham,
//!    clipped to the canvas

use crate::raster::RasterFrame;
use crate::series::Located;
use nalgebra::{Quaternion, UnitQuaternion, Vector3};

/// Above this cosine the two orientations are treated as coincident and
/// interpolated linearly
const SLERP_LINEAR_THRESHOLD: f64 = 0.9995;

/// Points closer to the camera plane than this are not projectable
const MIN_DEPTH: f64 = 1e-6;

/// Spherical linear interpolation along the shortest arc.
///
/// `t` is clamped to `[0, 1]`. `t = 0` yields `qa`; `t = 1` yields `qb`, or
/// `-qb` when that is the nearer representation of the same rotation.
pub fn slerp(qa: &UnitQuaternion<f64>, qb: &UnitQuaternion<f64>, t: f64) -> UnitQuaternion<f64> {
    let t = t.clamp(0.0, 1.0);
    let a = qa.quaternion();
    let mut b: Quaternion<f64> = *qb.quaternion();

    let mut dot = a.dot(&b);
    if dot < 0.0 {
        // q and -q are the same rotation; take the short way round
        b = -b;
        dot = -dot;
    }

    if dot > SLERP_LINEAR_THRESHOLD {
        let lerp = a * (1.0 - t) + b * t;
        return UnitQuaternion::new_normalize(lerp);
    }

    let theta = dot.min(1.0).acos();
    let sin_theta = theta.sin();
    let s0 = ((1.0 - t) * theta).sin() / sin_theta;
    let s1 = (t * theta).sin() / sin_theta;
    UnitQuaternion::new_normalize(a * s0 + b * s1)
}

/// Projects a camera-space point onto a square canvas of side `scale`.
///
/// Returns `None` for points at or behind the camera plane.
pub fn project(x: f64, y: f64, z: f64, scale: f64) -> Option<(i64, i64)> {
    if !(z > MIN_DEPTH) {
        return None;
    }
    let px = x / z * scale + scale / 2.0;
    let py = y / z * scale + scale / 2.0;
    if !px.is_finite() || !py.is_finite() {
        return None;
    }
    Some((px.floor() as i64, py.floor() as i64))
}

/// Rasterises a line into one channel with Bresenham's algorithm, adding
/// `value` (saturating) to every covered pixel.
///
/// Pixels outside the frame are skipped. The walk is bounded by the clipped
/// extent, so far off-canvas endpoints cost no more than on-canvas ones.
pub fn draw_line(
    frame: &mut RasterFrame,
    channel: usize,
    from: (i64, i64),
    to: (i64, i64),
    value: u8,
) {
    let Some((from, to)) = clip_segment(frame, from, to) else {
        return;
    };
    let (mut x, mut y) = from;
    let (x1, y1) = to;

    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        frame.add(x, y, channel, value);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Cohen-Sutherland clip of a segment to a margin around the frame. The
/// margin keeps rounding of the clipped endpoints from shifting visible
/// pixels; `put` drops whatever still falls outside.
fn clip_segment(
    frame: &RasterFrame,
    from: (i64, i64),
    to: (i64, i64),
) -> Option<((i64, i64), (i64, i64))> {
    const MARGIN: f64 = 2.0;
    let xmin = -MARGIN;
    let ymin = -MARGIN;
    let xmax = frame.width() as f64 + MARGIN;
    let ymax = frame.height() as f64 + MARGIN;

    let code = |x: f64, y: f64| -> u8 {
        let mut c = 0;
        if x < xmin {
            c |= 1;
        } else if x > xmax {
            c |= 2;
        }
        if y < ymin {
            c |= 4;
        } else if y > ymax {
            c |= 8;
        }
        c
    };

    let (mut x0, mut y0) = (from.0 as f64, from.1 as f64);
    let (mut x1, mut y1) = (to.0 as f64, to.1 as f64);
    let mut c0 = code(x0, y0);
    let mut c1 = code(x1, y1);

    loop {
        if c0 | c1 == 0 {
            return Some((
                (x0.round() as i64, y0.round() as i64),
                (x1.round() as i64, y1.round() as i64),
            ));
        }
        if c0 & c1 != 0 {
            return None;
        }
        let out = if c0 != 0 { c0 } else { c1 };
        let (x, y) = if out & 8 != 0 {
            (x0 + (x1 - x0) * (ymax - y0) / (y1 - y0), ymax)
        } else if out & 4 != 0 {
            (x0 + (x1 - x0) * (ymin - y0) / (y1 - y0), ymin)
        } else if out & 2 != 0 {
            (xmax, y0 + (y1 - y0) * (xmax - x0) / (x1 - x0))
        } else {
            (xmin, y0 + (y1 - y0) * (xmin - x0) / (x1 - x0))
        };
        if out == c0 {
            x0 = x;
            y0 = y;
            c0 = code(x0, y0);
        } else {
            x1 = x;
            y1 = y;
            c1 = code(x1, y1);
        }
    }
}

/// Draws a plus-shaped marker on every channel.
pub fn draw_marker(frame: &mut RasterFrame, centre: (i64, i64), half_size: i64, value: u8) {
    let (cx, cy) = centre;
    for channel in 0..frame.channels() {
        draw_line(frame, channel, (cx - half_size, cy), (cx + half_size, cy), value);
        draw_line(frame, channel, (cx, cy - half_size), (cx, cy + half_size), value);
    }
}

/// Offset and scale that fit every translation into the volume
/// x, y in [-0.5, 0.5], z in [z_offset - 0.5, z_offset + 0.5].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    pub centre: Vector3<f64>,
    /// Largest per-axis extent; never zero
    pub largest_extent: f64,
}

impl Default for Normalization {
    fn default() -> Self {
        Self {
            centre: Vector3::zeros(),
            largest_extent: 1.0,
        }
    }
}

impl Normalization {
    /// Derives the frame from every sample; degenerate (zero extent) data
    /// gets a unit scale.
    pub fn from_samples<'a, S, I>(samples: I) -> Self
    where
        S: Located + 'a,
        I: IntoIterator<Item = &'a S>,
    {
        let mut iter = samples.into_iter().map(Located::translation);
        let first = match iter.next() {
            Some(first) => first,
            None => return Self::default(),
        };
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.inf(&p), max.sup(&p)));

        let largest = (max - min).max();
        let largest_extent = if largest > 0.0 && largest.is_finite() {
            largest
        } else {
            1.0
        };
        Self {
            centre: (min + max) / 2.0,
            largest_extent,
        }
    }

    /// Maps a translation into camera space.
    pub fn apply(&self, p: &Vector3<f64>, z_offset: f64) -> Vector3<f64> {
        let mut n = (p - self.centre) / self.largest_extent;
        n.z += z_offset;
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::ColorFormat;
    use crate::series::PointSample;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use std::f64::consts::FRAC_PI_2;

    fn yaw(angle: f64) -> UnitQuaternion<f64> {
        UnitQuaternion::from_axis_angle(&Vector3::z_axis(), angle)
    }

    #[test]
    fn test_slerp_endpoints() {
        let qa = yaw(0.2);
        let qb = yaw(1.4);

        assert_relative_eq!(slerp(&qa, &qb, 0.0), qa, epsilon = 1e-12);
        assert_relative_eq!(slerp(&qa, &qb, 1.0), qb, epsilon = 1e-12);
        assert_relative_eq!(slerp(&qa, &qb, 0.5).angle(), 0.8, epsilon = 1e-9);
    }

    #[test]
    fn test_slerp_identity() {
        let q = UnitQuaternion::from_euler_angles(0.3, -0.2, 1.1);
        for t in [0.0, 0.25, 0.5, 0.9, 1.0] {
            assert_relative_eq!(slerp(&q, &q, t), q, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_slerp_takes_short_arc() {
        let qa = yaw(0.0);
        // Same rotation as yaw(FRAC_PI_2) but in the opposite hemisphere
        let qb = UnitQuaternion::new_unchecked(-*yaw(FRAC_PI_2).quaternion());

        let mid = slerp(&qa, &qb, 0.5);
        assert_relative_eq!(mid.angle(), FRAC_PI_2 / 2.0, epsilon = 1e-9);
        assert_relative_eq!(mid.quaternion().norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_slerp_near_identical_stays_unit() {
        let qa = yaw(0.5);
        let qb = yaw(0.5 + 1e-9);
        let q = slerp(&qa, &qb, 0.3);
        assert!(q.quaternion().coords.iter().all(|c| c.is_finite()));
        assert_relative_eq!(q.quaternion().norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_project_centre_and_depth() {
        assert_eq!(project(0.0, 0.0, 2.0, 300.0), Some((150, 150)));
        assert_eq!(project(0.5, -0.5, 2.0, 300.0), Some((225, 75)));
        assert_eq!(project(1.0, 1.0, 0.0, 300.0), None);
        assert_eq!(project(1.0, 1.0, -1.0, 300.0), None);
    }

    #[test]
    fn test_draw_line_endpoints_and_clipping() {
        let mut frame = RasterFrame::zeros(10, 10, ColorFormat::Rgb);
        draw_line(&mut frame, 1, (0, 0), (9, 9), 255);
        for i in 0..10 {
            assert_eq!(frame.get(i, i, 1), Some(255));
            assert_eq!(frame.get(i, i, 0), Some(0));
        }

        // Far outside: only the visible part is written, nothing panics
        let mut frame = RasterFrame::zeros(10, 10, ColorFormat::Luminance);
        draw_line(&mut frame, 0, (-1_000_000, 5), (1_000_000, 5), 255);
        for x in 0..10 {
            assert_eq!(frame.get(x, 5, 0), Some(255));
        }
        assert_eq!(frame.get(0, 4, 0), Some(0));

        let mut frame = RasterFrame::zeros(10, 10, ColorFormat::Luminance);
        draw_line(&mut frame, 0, (-50, -50), (-20, -80), 255);
        assert!(frame.is_uniform(0));
    }

    #[test]
    fn test_draw_marker() {
        let mut frame = RasterFrame::zeros(9, 9, ColorFormat::Rgb);
        draw_marker(&mut frame, (4, 4), 2, 255);
        assert_eq!(frame.get(2, 4, 2), Some(255));
        assert_eq!(frame.get(4, 6, 0), Some(255));
        assert_eq!(frame.get(2, 2, 0), Some(0));
    }

    #[test]
    fn test_normalization() {
        let samples = [
            PointSample::new(0.0, 0.0, 0.0),
            PointSample::new(4.0, 1.0, -2.0),
        ];
        let norm = Normalization::from_samples(samples.iter());
        assert_relative_eq!(norm.centre, Vector3::new(2.0, 0.5, -1.0));
        assert_relative_eq!(norm.largest_extent, 4.0);

        let p = norm.apply(&Vector3::new(4.0, 0.5, -1.0), 2.0);
        assert_relative_eq!(p, Vector3::new(0.5, 0.0, 2.0));
    }

    #[test]
    fn test_normalization_degenerate_extent() {
        let samples = [PointSample::new(3.0, 3.0, 3.0); 4];
        let norm = Normalization::from_samples(samples.iter());
        assert_eq!(norm.largest_extent, 1.0);

        let empty: [PointSample; 0] = [];
        assert_eq!(Normalization::from_samples(empty.iter()), Normalization::default());
    }

    fn arb_orientation() -> impl Strategy<Value = UnitQuaternion<f64>> {
        (-1.0f64..1.0, -1.0f64..1.0, -1.0f64..1.0, -1.0f64..1.0)
            .prop_filter("degenerate quaternion", |(w, i, j, k)| w * w + i * i + j * j + k * k > 1e-3)
            .prop_map(|(w, i, j, k)| UnitQuaternion::new_normalize(Quaternion::new(w, i, j, k)))
    }

    proptest! {
        #[test]
        fn prop_slerp_unit_norm_and_endpoints(
            qa in arb_orientation(),
            qb in arb_orientation(),
            negate in any::<bool>(),
            t in 0.0f64..=1.0,
        ) {
            let qb = if negate { UnitQuaternion::new_unchecked(-*qb.quaternion()) } else { qb };

            let q = slerp(&qa, &qb, t);
            prop_assert!((q.quaternion().norm() - 1.0).abs() < 1e-9);

            let start = slerp(&qa, &qb, 0.0);
            prop_assert!((start.quaternion() - qa.quaternion()).norm() < 1e-9);

            // q and -q are the same rotation
            let end = slerp(&qa, &qb, 1.0);
            let same = (end.quaternion() - qb.quaternion()).norm();
            let flipped = (end.quaternion() + qb.quaternion()).norm();
            prop_assert!(same.min(flipped) < 1e-9);
        }
    }
}
