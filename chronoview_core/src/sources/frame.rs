//! Image frames: the frame nearest in time, or the frame whose validity
//! interval contains the query.

use crate::chronoview_time::{nearest_index, rightmost_at_or_before};
use crate::options::FrameOptions;
use crate::raster::{ColorFormat, RasterFrame, MID_GREY};
use crate::series::{FrameSequence, TimeSeries};
use crate::source::FrameSynth;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
struct LoadedFrames {
    frames: TimeSeries<RasterFrame>,
    ts_end: Option<Vec<f64>>,
    dims: Option<(usize, usize)>,
}

/// Serves stored frames; falls back to a mid-grey placeholder whenever no
/// frame is valid for the query.
#[derive(Debug, Clone, Default)]
pub struct RasterFrameSource {
    loaded: Option<LoadedFrames>,
}

impl RasterFrameSource {
    pub fn new() -> Self {
        Self { loaded: None }
    }

    pub fn with_data(sequence: FrameSequence) -> Self {
        let mut source = Self::new();
        source.set_data(sequence);
        source
    }

    /// Mid-grey frame in this source's shape.
    pub fn placeholder(&self) -> RasterFrame {
        let (width, height) = self.get_dims();
        RasterFrame::filled(width, height, self.get_colorfmt(), MID_GREY)
    }

    fn select(loaded: &LoadedFrames, time: f64, window: f64) -> Option<usize> {
        let timestamps = loaded.frames.timestamps();
        match &loaded.ts_end {
            Some(ts_end) => {
                rightmost_at_or_before(timestamps, time).filter(|&i| time < ts_end[i])
            }
            None => {
                let first = loaded.frames.first_time()?;
                let last = loaded.frames.last_time()?;
                if time < first - window / 2.0 || time > last + window / 2.0 {
                    return None;
                }
                nearest_index(timestamps, time)
            }
        }
    }
}

impl FrameSynth for RasterFrameSource {
    type Data = FrameSequence;

    fn set_data(&mut self, sequence: FrameSequence) {
        let frames = sequence.frames().map(|image| RasterFrame::from(image));
        debug!(
            "Loaded {} frames{}",
            frames.len(),
            if sequence.ts_end().is_some() { " with end times" } else { "" }
        );
        self.loaded = Some(LoadedFrames {
            frames,
            ts_end: sequence.ts_end().map(<[f64]>::to_vec),
            dims: sequence.dims(),
        });
    }

    fn render(&self, time: f64, window: f64, _options: &FrameOptions) -> RasterFrame {
        let loaded = match &self.loaded {
            Some(loaded) => loaded,
            None => {
                warn!("Image frame requested before data was set");
                return RasterFrame::unset();
            }
        };

        match Self::select(loaded, time, window) {
            Some(index) => loaded.frames.samples()[index].clone(),
            None => self.placeholder(),
        }
    }

    fn get_dims(&self) -> (usize, usize) {
        let loaded = match &self.loaded {
            Some(loaded) => loaded,
            None => return (1, 1),
        };
        loaded
            .dims
            .or_else(|| loaded.frames.samples().first().map(RasterFrame::dims))
            .unwrap_or((1, 1))
    }

    fn get_colorfmt(&self) -> ColorFormat {
        self.loaded
            .as_ref()
            .and_then(|loaded| loaded.frames.samples().first())
            .map(RasterFrame::format)
            .unwrap_or(ColorFormat::Luminance)
    }
}
