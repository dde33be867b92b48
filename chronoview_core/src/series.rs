//! Input records: time series and the per-modality data they carry.
//!
//! Records are validated once on construction and never mutated afterwards,
//! so frame sources can rely on their invariants without re-checking.

use crate::error::SeriesError;
use crate::raster::sample_count;
use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Timestamps paired index-aligned with samples.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries<T> {
    timestamps: Vec<f64>,
    samples: Vec<T>,
}

impl<T> TimeSeries<T> {
    /// Builds a series, checking equal lengths and non-decreasing, finite
    /// timestamps.
    pub fn new(timestamps: Vec<f64>, samples: Vec<T>) -> Result<Self, SeriesError> {
        if samples.len() != timestamps.len() {
            return Err(SeriesError::length("samples", timestamps.len(), samples.len()));
        }
        check_timestamps(&timestamps)?;
        Ok(Self { timestamps, samples })
    }

    /// An empty series.
    pub fn empty() -> Self {
        Self {
            timestamps: Vec::new(),
            samples: Vec::new(),
        }
    }

    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }

    pub fn samples(&self) -> &[T] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn first_time(&self) -> Option<f64> {
        self.timestamps.first().copied()
    }

    pub fn last_time(&self) -> Option<f64> {
        self.timestamps.last().copied()
    }

    /// Converts every sample, keeping the timestamps.
    pub fn map<U, F>(&self, f: F) -> TimeSeries<U>
    where
        F: FnMut(&T) -> U,
    {
        TimeSeries {
            timestamps: self.timestamps.clone(),
            samples: self.samples.iter().map(f).collect(),
        }
    }
}

impl<T> Default for TimeSeries<T> {
    fn default() -> Self {
        Self::empty()
    }
}

fn check_timestamps(timestamps: &[f64]) -> Result<(), SeriesError> {
    for (index, &t) in timestamps.iter().enumerate() {
        if !t.is_finite() {
            return Err(SeriesError::NonFinite(index));
        }
        if index > 0 && t < timestamps[index - 1] {
            return Err(SeriesError::NonMonotonic {
                index,
                previous: timestamps[index - 1],
                current: t,
            });
        }
    }
    Ok(())
}

// =============================================================================
// EVENTS
// =============================================================================

/// A single event-camera event; its timestamp lives in the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DvsEvent {
    pub x: u16,
    pub y: u16,
    /// true = ON (brightness increase), false = OFF
    pub polarity: bool,
}

/// Time-ordered events plus the declared sensor size, if known.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventStream {
    pub events: TimeSeries<DvsEvent>,
    pub dim_x: Option<usize>,
    pub dim_y: Option<usize>,
}

impl EventStream {
    pub fn new(events: TimeSeries<DvsEvent>) -> Self {
        Self {
            events,
            dim_x: None,
            dim_y: None,
        }
    }

    /// Builds a stream from the usual column layout.
    pub fn from_columns(
        x: Vec<u16>,
        y: Vec<u16>,
        polarity: Vec<bool>,
        ts: Vec<f64>,
    ) -> Result<Self, SeriesError> {
        if y.len() != x.len() {
            return Err(SeriesError::length("y", x.len(), y.len()));
        }
        if polarity.len() != x.len() {
            return Err(SeriesError::length("polarity", x.len(), polarity.len()));
        }
        let events = x
            .into_iter()
            .zip(y)
            .zip(polarity)
            .map(|((x, y), polarity)| DvsEvent { x, y, polarity })
            .collect();
        Ok(Self::new(TimeSeries::new(ts, events)?))
    }

    /// Declares the sensor size instead of inferring it from the events.
    pub fn with_dims(mut self, dim_x: usize, dim_y: usize) -> Self {
        self.dim_x = Some(dim_x);
        self.dim_y = Some(dim_y);
        self
    }
}

// =============================================================================
// IMAGE FRAMES
// =============================================================================

/// Pixel storage of an input image.
#[derive(Debug, Clone, PartialEq)]
pub enum Pixels {
    /// Already 8-bit
    U8(Vec<u8>),
    /// Floating point, nominally in `[0, 1]`
    Float(Vec<f32>),
}

impl Pixels {
    pub fn len(&self) -> usize {
        match self {
            Pixels::U8(v) => v.len(),
            Pixels::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 8-bit copy; float samples are clamped to `[0, 1]` and scaled by 255.
    pub fn to_u8(&self) -> Vec<u8> {
        match self {
            Pixels::U8(v) => v.clone(),
            Pixels::Float(v) => v
                .iter()
                .map(|&p| (p.clamp(0.0, 1.0) * 255.0).round() as u8)
                .collect(),
        }
    }
}

/// A row-major, channel-interleaved input image.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceImage {
    width: usize,
    height: usize,
    channels: usize,
    pixels: Pixels,
}

impl SourceImage {
    /// Builds an image; channels must be 1 or 3 and the buffer must match
    /// the shape.
    pub fn new(width: usize, height: usize, channels: usize, pixels: Pixels) -> Result<Self, SeriesError> {
        if channels != 1 && channels != 3 {
            return Err(SeriesError::shape(format!(
                "{} channels (expected 1 or 3)",
                channels
            )));
        }
        let expected = sample_count(width, height, channels).ok_or_else(|| {
            SeriesError::shape(format!("{}x{}x{} overflows the addressable size", height, width, channels))
        })?;
        if pixels.len() != expected {
            return Err(SeriesError::shape(format!(
                "{}x{}x{} needs {} samples, got {}",
                height,
                width,
                channels,
                expected,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            pixels,
        })
    }

    /// Single channel 8-bit image.
    pub fn gray8(width: usize, height: usize, data: Vec<u8>) -> Result<Self, SeriesError> {
        Self::new(width, height, 1, Pixels::U8(data))
    }

    /// Three channel 8-bit image.
    pub fn rgb8(width: usize, height: usize, data: Vec<u8>) -> Result<Self, SeriesError> {
        Self::new(width, height, 3, Pixels::U8(data))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn pixels(&self) -> &Pixels {
        &self.pixels
    }

    /// `(height, width, channels)`
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height, self.width, self.channels)
    }
}

/// Image frames over time, optionally gated by per-frame end times.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameSequence {
    frames: TimeSeries<SourceImage>,
    ts_end: Option<Vec<f64>>,
    /// Declared `(width, height)`; agrees with the frames when there are any
    dims: Option<(usize, usize)>,
}

impl FrameSequence {
    /// Builds a sequence; every frame must share the first frame's shape.
    pub fn new(frames: TimeSeries<SourceImage>) -> Result<Self, SeriesError> {
        if let Some(first) = frames.samples().first() {
            let expected = first.shape();
            for (index, frame) in frames.samples().iter().enumerate().skip(1) {
                if frame.shape() != expected {
                    return Err(SeriesError::InconsistentShape {
                        index,
                        expected,
                        actual: frame.shape(),
                    });
                }
            }
        }
        Ok(Self {
            frames,
            ts_end: None,
            dims: None,
        })
    }

    /// Declares the sensor size, which sizes the placeholder of a sequence
    /// with no frames. Frames already present must have this size.
    pub fn with_dims(mut self, dim_x: usize, dim_y: usize) -> Result<Self, SeriesError> {
        if dim_x == 0 || dim_y == 0 || sample_count(dim_x, dim_y, 3).is_none() {
            return Err(SeriesError::shape(format!("cannot declare {}x{} frames", dim_x, dim_y)));
        }
        if let Some(first) = self.frames.samples().first() {
            if (first.width(), first.height()) != (dim_x, dim_y) {
                return Err(SeriesError::InconsistentShape {
                    index: 0,
                    expected: (dim_y, dim_x, first.channels()),
                    actual: first.shape(),
                });
            }
        }
        self.dims = Some((dim_x, dim_y));
        Ok(self)
    }

    /// Frames are then only valid within `[ts, ts_end)`.
    pub fn with_ts_end(mut self, ts_end: Vec<f64>) -> Result<Self, SeriesError> {
        if ts_end.len() != self.frames.len() {
            return Err(SeriesError::length("ts_end", self.frames.len(), ts_end.len()));
        }
        if let Some(index) = ts_end.iter().position(|t| t.is_nan()) {
            return Err(SeriesError::NonFinite(index));
        }
        self.ts_end = Some(ts_end);
        Ok(self)
    }

    pub fn frames(&self) -> &TimeSeries<SourceImage> {
        &self.frames
    }

    pub fn ts_end(&self) -> Option<&[f64]> {
        self.ts_end.as_deref()
    }

    pub fn dims(&self) -> Option<(usize, usize)> {
        self.dims
    }
}

// =============================================================================
// TRAJECTORIES
// =============================================================================

/// Identifier of one rigid body in multi-body trajectories
pub type BodyId = u32;

/// Anything with a 3D location.
pub trait Located {
    fn translation(&self) -> Vector3<f64>;
}

/// A 6-DoF pose: translation plus orientation quaternion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose6q {
    pub translation: Vector3<f64>,
    /// Not required to be normalised
    pub rotation: Quaternion<f64>,
}

impl Pose6q {
    pub fn new(translation: Vector3<f64>, rotation: Quaternion<f64>) -> Self {
        Self { translation, rotation }
    }

    /// From a row `[x, y, z, qx, qy, qz, qw]`.
    pub fn from_row(row: [f64; 7]) -> Self {
        Self {
            translation: Vector3::new(row[0], row[1], row[2]),
            rotation: Quaternion::new(row[6], row[3], row[4], row[5]),
        }
    }

    /// Pose at `translation` with identity orientation.
    pub fn at(x: f64, y: f64, z: f64) -> Self {
        Self::from_row([x, y, z, 0.0, 0.0, 0.0, 1.0])
    }

    /// Row layout `[x, y, z, qx, qy, qz, qw]`.
    pub fn to_row(&self) -> [f64; 7] {
        let q = &self.rotation;
        [
            self.translation.x,
            self.translation.y,
            self.translation.z,
            q.i,
            q.j,
            q.k,
            q.w,
        ]
    }

    /// Normalised orientation; a degenerate quaternion maps to identity.
    pub fn orientation(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::try_new(self.rotation, 1e-12).unwrap_or_else(UnitQuaternion::identity)
    }
}

impl Located for Pose6q {
    fn translation(&self) -> Vector3<f64> {
        self.translation
    }
}

/// A 3D point sample with no orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointSample(pub Vector3<f64>);

impl PointSample {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self(Vector3::new(x, y, z))
    }
}

impl Located for PointSample {
    fn translation(&self) -> Vector3<f64> {
        self.0
    }
}

/// Samples over time, optionally tagged per sample with a body id.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory<S> {
    samples: TimeSeries<S>,
    body_ids: Option<Vec<BodyId>>,
}

pub type PoseTrajectory = Trajectory<Pose6q>;
pub type PointTrajectory = Trajectory<PointSample>;

impl<S: Clone> Trajectory<S> {
    /// Single-body trajectory.
    pub fn new(samples: TimeSeries<S>) -> Self {
        Self {
            samples,
            body_ids: None,
        }
    }

    /// Multi-body trajectory; `body_ids` is index-aligned with the samples.
    pub fn with_bodies(samples: TimeSeries<S>, body_ids: Vec<BodyId>) -> Result<Self, SeriesError> {
        if body_ids.len() != samples.len() {
            return Err(SeriesError::length("body_ids", samples.len(), body_ids.len()));
        }
        Ok(Self {
            samples,
            body_ids: Some(body_ids),
        })
    }

    pub fn samples(&self) -> &TimeSeries<S> {
        &self.samples
    }

    pub fn body_ids(&self) -> Option<&[BodyId]> {
        self.body_ids.as_deref()
    }

    /// Partitions the samples into one series per body, ordered by body id.
    /// Without body ids the whole trajectory is body 0.
    pub fn split_by_body(&self) -> BTreeMap<BodyId, TimeSeries<S>> {
        let mut split = BTreeMap::new();
        let ids = match &self.body_ids {
            Some(ids) => ids,
            None => {
                split.insert(0, self.samples.clone());
                return split;
            }
        };

        let mut parts: BTreeMap<BodyId, (Vec<f64>, Vec<S>)> = BTreeMap::new();
        for ((&id, &t), sample) in ids
            .iter()
            .zip(self.samples.timestamps())
            .zip(self.samples.samples())
        {
            let part = parts.entry(id).or_default();
            part.0.push(t);
            part.1.push(sample.clone());
        }
        for (id, (timestamps, samples)) in parts {
            // Subsequences of a sorted series stay sorted
            split.insert(id, TimeSeries { timestamps, samples });
        }
        split
    }
}

impl<S> Default for Trajectory<S> {
    fn default() -> Self {
        Self {
            samples: TimeSeries::empty(),
            body_ids: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_series_rejects_bad_input() {
        assert_eq!(
            TimeSeries::new(vec![0.0, 1.0], vec![1]).unwrap_err(),
            SeriesError::length("samples", 2, 1)
        );
        assert!(matches!(
            TimeSeries::new(vec![0.0, 2.0, 1.0], vec![1, 2, 3]),
            Err(SeriesError::NonMonotonic { index: 2, .. })
        ));
        assert_eq!(
            TimeSeries::new(vec![0.0, f64::NAN], vec![1, 2]).unwrap_err(),
            SeriesError::NonFinite(1)
        );

        // Repeated timestamps are allowed
        assert!(TimeSeries::new(vec![0.0, 0.0, 1.0], vec![1, 2, 3]).is_ok());
    }

    #[test]
    fn test_event_columns() {
        let stream = EventStream::from_columns(
            vec![1, 2],
            vec![3, 4],
            vec![true, false],
            vec![0.1, 0.2],
        )
        .unwrap();
        assert_eq!(stream.events.samples()[1], DvsEvent { x: 2, y: 4, polarity: false });

        assert!(EventStream::from_columns(vec![1], vec![], vec![true], vec![0.0]).is_err());
    }

    #[test]
    fn test_float_pixels_rescale() {
        let pixels = Pixels::Float(vec![0.0, 0.5, 1.0, 2.0, -1.0]);
        assert_eq!(pixels.to_u8(), vec![0, 128, 255, 255, 0]);
    }

    #[test]
    fn test_source_image_shape_checks() {
        assert!(SourceImage::gray8(2, 2, vec![0; 4]).is_ok());
        assert!(SourceImage::gray8(2, 2, vec![0; 3]).is_err());
        assert!(SourceImage::new(1, 1, 2, Pixels::U8(vec![0, 0])).is_err());
    }

    #[test]
    fn test_source_image_overflowing_shape() {
        let err = SourceImage::new(usize::MAX, 2, 1, Pixels::U8(vec![])).unwrap_err();
        assert!(matches!(err, SeriesError::InvalidShape(_)));
        assert!(SourceImage::rgb8(usize::MAX / 2, 1, vec![]).is_err());
    }

    #[test]
    fn test_frame_sequence_validation() {
        let a = SourceImage::gray8(2, 2, vec![0; 4]).unwrap();
        let b = SourceImage::gray8(1, 4, vec![0; 4]).unwrap();
        let series = TimeSeries::new(vec![0.0, 1.0], vec![a.clone(), b]).unwrap();
        assert!(matches!(
            FrameSequence::new(series),
            Err(SeriesError::InconsistentShape { index: 1, .. })
        ));

        let series = TimeSeries::new(vec![0.0, 1.0], vec![a.clone(), a]).unwrap();
        let seq = FrameSequence::new(series).unwrap();
        assert!(seq.clone().with_ts_end(vec![0.5]).is_err());
        assert!(seq.with_ts_end(vec![0.5, 1.5]).is_ok());
    }

    #[test]
    fn test_frame_sequence_declared_dims() {
        let empty = FrameSequence::default().with_dims(640, 480).unwrap();
        assert_eq!(empty.dims(), Some((640, 480)));

        assert!(FrameSequence::default().with_dims(0, 480).is_err());
        assert!(matches!(
            FrameSequence::default().with_dims(usize::MAX, 2),
            Err(SeriesError::InvalidShape(_))
        ));

        let image = SourceImage::gray8(3, 2, vec![0; 6]).unwrap();
        let seq = FrameSequence::new(TimeSeries::new(vec![0.0], vec![image]).unwrap()).unwrap();
        assert_eq!(seq.clone().with_dims(3, 2).unwrap().dims(), Some((3, 2)));
        assert!(matches!(
            seq.with_dims(2, 3),
            Err(SeriesError::InconsistentShape { index: 0, .. })
        ));
    }

    #[test]
    fn test_pose_row_layout() {
        let pose = Pose6q::from_row([1.0, 2.0, 3.0, 0.0, 0.0, 1.0, 0.0]);
        assert_eq!(pose.rotation.w, 0.0);
        assert_eq!(pose.rotation.k, 1.0);
        assert_eq!(pose.to_row(), [1.0, 2.0, 3.0, 0.0, 0.0, 1.0, 0.0]);

        let degenerate = Pose6q::from_row([0.0; 7]);
        assert_relative_eq!(degenerate.orientation().angle(), 0.0);
    }

    #[test]
    fn test_split_by_body() {
        let samples = TimeSeries::new(
            vec![0.0, 1.0, 2.0, 3.0],
            vec![
                PointSample::new(0.0, 0.0, 0.0),
                PointSample::new(1.0, 0.0, 0.0),
                PointSample::new(2.0, 0.0, 0.0),
                PointSample::new(3.0, 0.0, 0.0),
            ],
        )
        .unwrap();
        let trajectory = Trajectory::with_bodies(samples, vec![7, 3, 7, 3]).unwrap();
        let split = trajectory.split_by_body();

        assert_eq!(split.keys().copied().collect::<Vec<_>>(), vec![3, 7]);
        assert_eq!(split[&3].timestamps(), &[1.0, 3.0]);
        assert_eq!(split[&7].samples()[1], PointSample::new(2.0, 0.0, 0.0));
    }
}
