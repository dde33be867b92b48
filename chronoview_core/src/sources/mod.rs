//! Frame sources, one per data modality.

mod event;
mod frame;
mod point;
mod pose;
mod trajectory;

pub use event::EventFrameSource;
pub use frame::RasterFrameSource;
pub use point::PointFrameSource;
pub use pose::PoseFrameSource;
pub use trajectory::{Interpolate, TrajectorySample, TrajectorySource};
