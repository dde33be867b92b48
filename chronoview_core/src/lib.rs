//! ChronoView Core - Time-Indexed Frame Synthesis
//!
//! Renders time-indexed sensor data into single frames for an arbitrary
//! query time, for video-like scrubbing and playback:
//! 1. **Event streams**: events inside a time window accumulated into a contrast image
//! 2. **Image frames**: nearest frame in time, or the frame whose validity interval contains the query
//! 3. **Pose / point trajectories**: interpolated samples projected into a small 3D canvas
//!
//! Every `get_frame` call is a pure function of the stored data and the
//! query, so callers may seek in any order.

pub mod accumulate;
pub mod chronoview_space;
pub mod chronoview_time;
pub mod error;
pub mod options;
pub mod raster;
pub mod series;
pub mod source;
pub mod sources;

// Re-export key types for convenience
pub use chronoview_time::{bracket, nearest_index, Bracket};
pub use error::SeriesError;
pub use options::{FrameContext, FrameOptions, PostProcess, RenderConfig};
pub use raster::{ColorFormat, RasterFrame};
pub use series::{
    BodyId, DvsEvent, EventStream, FrameSequence, Pixels, PointSample, PointTrajectory, Pose6q,
    PoseTrajectory, SourceImage, TimeSeries, Trajectory,
};
pub use source::{FrameSource, FrameSynth, SourceData, SourceKind};
pub use sources::{EventFrameSource, PointFrameSource, PoseFrameSource, RasterFrameSource};
