//! Frame synthesis contract and the closed set of frame sources.
//!
//! A caller holds one [`FrameSource`] per data channel and asks it for a
//! frame on every playback tick. Each call is a pure function of the stored
//! data and the query, so callers may seek in any order.
//!
//! # Usage
//!
//! ```ignore
//! use chronoview_core::{FrameOptions, FrameSource, FrameSynth, SourceData};
//!
//! let source = FrameSource::from_data(SourceData::Poses(trajectory));
//! let frame = source.get_frame(12.5, 0.1, &FrameOptions::default());
//! assert_eq!(frame.dims(), source.get_dims());
//! ```

use crate::options::{FrameContext, FrameOptions, RenderConfig};
use crate::raster::{ColorFormat, RasterFrame};
use crate::series::{EventStream, FrameSequence, PointTrajectory, PoseTrajectory};
use crate::sources::{EventFrameSource, PointFrameSource, PoseFrameSource, RasterFrameSource};

/// The capability set shared by every frame source.
pub trait FrameSynth {
    /// Record consumed by `set_data`
    type Data;

    /// Replaces the stored data and recomputes derived state.
    fn set_data(&mut self, data: Self::Data);

    /// Computes the frame for `time`, before post-processing.
    fn render(&self, time: f64, window: f64, options: &FrameOptions) -> RasterFrame;

    /// `(width, height)` of every frame this source returns.
    fn get_dims(&self) -> (usize, usize);

    /// Pixel encoding of every frame this source returns.
    fn get_colorfmt(&self) -> ColorFormat;

    /// Frame for `time`, with the options' post-processing hook applied.
    fn get_frame(&self, time: f64, window: f64, options: &FrameOptions) -> RasterFrame {
        let frame = self.render(time, window, options);
        match &options.callback {
            Some(callback) => {
                let ctx = FrameContext {
                    time,
                    window,
                    options,
                };
                callback(frame, &ctx)
            }
            None => frame,
        }
    }
}

/// Input for any modality.
#[derive(Debug, Clone)]
pub enum SourceData {
    Events(EventStream),
    Frames(FrameSequence),
    Poses(PoseTrajectory),
    Points(PointTrajectory),
}

/// The source behind a [`FrameSource`], one variant per data modality.
#[derive(Debug, Clone)]
pub enum SourceKind {
    Event(EventFrameSource),
    Raster(RasterFrameSource),
    Pose(PoseFrameSource),
    Point(PointFrameSource),
}

/// A frame source for any modality. Keeps the pose/point canvas across
/// `set_data` calls, including calls that switch modality.
#[derive(Debug, Clone)]
pub struct FrameSource {
    config: RenderConfig,
    kind: SourceKind,
}

impl FrameSource {
    /// Builds the source matching the data's modality.
    pub fn from_data(data: SourceData) -> Self {
        Self::from_data_with_config(data, RenderConfig::default())
    }

    /// Like `from_data`, with a custom canvas for pose and point data.
    pub fn from_data_with_config(data: SourceData, config: RenderConfig) -> Self {
        let kind = Self::build(data, &config);
        Self { config, kind }
    }

    fn build(data: SourceData, config: &RenderConfig) -> SourceKind {
        match data {
            SourceData::Events(stream) => SourceKind::Event(EventFrameSource::with_data(stream)),
            SourceData::Frames(sequence) => SourceKind::Raster(RasterFrameSource::with_data(sequence)),
            SourceData::Poses(trajectory) => {
                let mut source = PoseFrameSource::with_config(config.clone());
                source.set_data(trajectory);
                SourceKind::Pose(source)
            }
            SourceData::Points(trajectory) => {
                let mut source = PointFrameSource::with_config(config.clone());
                source.set_data(trajectory);
                SourceKind::Point(source)
            }
        }
    }

    pub fn kind(&self) -> &SourceKind {
        &self.kind
    }

    /// Canvas used whenever pose or point data is loaded.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Short modality name, for logs.
    pub fn modality(&self) -> &'static str {
        match self.kind {
            SourceKind::Event(_) => "events",
            SourceKind::Raster(_) => "frames",
            SourceKind::Pose(_) => "poses",
            SourceKind::Point(_) => "points",
        }
    }
}

impl FrameSynth for FrameSource {
    type Data = SourceData;

    /// Data of the same modality is loaded in place; other data replaces
    /// the inner source, built with this source's canvas.
    fn set_data(&mut self, data: SourceData) {
        let data = match (&mut self.kind, data) {
            (SourceKind::Event(source), SourceData::Events(stream)) => return source.set_data(stream),
            (SourceKind::Raster(source), SourceData::Frames(sequence)) => return source.set_data(sequence),
            (SourceKind::Pose(source), SourceData::Poses(trajectory)) => return source.set_data(trajectory),
            (SourceKind::Point(source), SourceData::Points(trajectory)) => return source.set_data(trajectory),
            (_, data) => data,
        };
        self.kind = Self::build(data, &self.config);
    }

    fn render(&self, time: f64, window: f64, options: &FrameOptions) -> RasterFrame {
        match &self.kind {
            SourceKind::Event(source) => source.render(time, window, options),
            SourceKind::Raster(source) => source.render(time, window, options),
            SourceKind::Pose(source) => source.render(time, window, options),
            SourceKind::Point(source) => source.render(time, window, options),
        }
    }

    fn get_dims(&self) -> (usize, usize) {
        match &self.kind {
            SourceKind::Event(source) => source.get_dims(),
            SourceKind::Raster(source) => source.get_dims(),
            SourceKind::Pose(source) => source.get_dims(),
            SourceKind::Point(source) => source.get_dims(),
        }
    }

    fn get_colorfmt(&self) -> ColorFormat {
        match &self.kind {
            SourceKind::Event(source) => source.get_colorfmt(),
            SourceKind::Raster(source) => source.get_colorfmt(),
            SourceKind::Pose(source) => source.get_colorfmt(),
            SourceKind::Point(source) => source.get_colorfmt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{PointSample, Pose6q, SourceImage, TimeSeries, Trajectory};

    fn poses() -> PoseTrajectory {
        let series = TimeSeries::new(
            vec![0.0, 10.0],
            vec![Pose6q::at(0.0, 0.0, 0.0), Pose6q::at(1.0, 0.0, 0.0)],
        )
        .unwrap();
        Trajectory::new(series)
    }

    fn frames() -> FrameSequence {
        let image = SourceImage::gray8(4, 3, vec![10; 12]).unwrap();
        FrameSequence::new(TimeSeries::new(vec![0.0], vec![image]).unwrap()).unwrap()
    }

    fn small_canvas() -> RenderConfig {
        RenderConfig {
            width: 64,
            height: 48,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn test_dispatch_by_modality() {
        let pose = FrameSource::from_data(SourceData::Poses(poses()));
        assert_eq!(pose.modality(), "poses");
        assert!(matches!(pose.kind(), SourceKind::Pose(_)));
        assert_eq!(pose.get_dims(), (300, 300));
        assert_eq!(pose.get_colorfmt(), ColorFormat::Rgb);

        let raster = FrameSource::from_data(SourceData::Frames(frames()));
        assert_eq!(raster.get_dims(), (4, 3));
        assert_eq!(raster.get_colorfmt(), ColorFormat::Luminance);
    }

    #[test]
    fn test_set_data_switches_modality() {
        let mut source = FrameSource::from_data(SourceData::Poses(poses()));
        source.set_data(SourceData::Frames(frames()));
        assert_eq!(source.modality(), "frames");
        assert_eq!(source.get_dims(), (4, 3));
    }

    #[test]
    fn test_callback_replaces_frame() {
        let source = FrameSource::from_data(SourceData::Frames(frames()));
        let options = FrameOptions::default().with_callback(|frame, ctx| {
            assert_eq!(ctx.time, 0.0);
            assert!(ctx.options.polarised);
            RasterFrame::filled(frame.width(), frame.height(), frame.format(), 99)
        });

        let frame = source.get_frame(0.0, 1.0, &options);
        assert!(frame.is_uniform(99));

        // render() skips the hook
        let raw = source.render(0.0, 1.0, &options);
        assert!(raw.is_uniform(10));
    }

    #[test]
    fn test_custom_canvas_survives_reload() {
        let mut source = FrameSource::from_data_with_config(SourceData::Poses(poses()), small_canvas());
        source.set_data(SourceData::Poses(poses()));
        assert_eq!(source.get_dims(), (64, 48));
        assert_eq!(source.get_frame(5.0, 1.0, &FrameOptions::default()).dims(), (64, 48));
    }

    #[test]
    fn test_canvas_survives_modality_switch() {
        let points = Trajectory::new(TimeSeries::new(vec![0.0], vec![PointSample::new(0.0, 0.0, 0.0)]).unwrap());
        let mut source = FrameSource::from_data_with_config(SourceData::Points(points), small_canvas());

        source.set_data(SourceData::Poses(poses()));
        assert_eq!(source.modality(), "poses");
        assert_eq!(source.get_dims(), (64, 48));

        // Through a modality without a canvas and back
        source.set_data(SourceData::Frames(frames()));
        assert_eq!(source.get_dims(), (4, 3));
        source.set_data(SourceData::Poses(poses()));
        assert_eq!(source.get_dims(), (64, 48));
        assert_eq!(source.config(), &small_canvas());
        assert_eq!(source.get_frame(5.0, 1.0, &FrameOptions::default()).dims(), (64, 48));
    }
}
