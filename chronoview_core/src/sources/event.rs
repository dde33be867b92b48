//! Event-camera frames: events inside the window accumulated into a
//! contrast image.

use crate::accumulate::{event_image, to_intensity};
use crate::options::FrameOptions;
use crate::raster::{ColorFormat, RasterFrame};
use crate::series::EventStream;
use crate::source::FrameSynth;
use tracing::{debug, warn};

/// Event coordinates are u16, so no sensor side exceeds this
const MAX_SENSOR_SIDE: usize = u16::MAX as usize + 1;

/// Largest declared sensor accepted
const MAX_SENSOR_PIXELS: usize = 1 << 26;

/// Renders the events within `[time - window/2, time + window/2]`.
#[derive(Debug, Clone)]
pub struct EventFrameSource {
    stream: Option<EventStream>,
    /// Declared sensor size, or inferred from the events on load
    dims: (usize, usize),
}

impl EventFrameSource {
    /// A source with no data; renders the 1x1 unset frame.
    pub fn new() -> Self {
        Self {
            stream: None,
            dims: (1, 1),
        }
    }

    pub fn with_data(stream: EventStream) -> Self {
        let mut source = Self::new();
        source.set_data(stream);
        source
    }

    fn inferred(stream: &EventStream) -> (usize, usize) {
        let events = stream.events.samples();
        let width = events.iter().map(|e| e.x as usize + 1).max().unwrap_or(1);
        let height = events.iter().map(|e| e.y as usize + 1).max().unwrap_or(1);
        (width, height)
    }

    /// Declared dims where valid, else inferred from the events. A declared
    /// side must lie in the u16 coordinate range and the declared sensor
    /// must fit `MAX_SENSOR_PIXELS`.
    fn infer_dims(stream: &EventStream) -> (usize, usize) {
        let (width, height) = Self::inferred(stream);
        let dims = (
            Self::declared_or(stream.dim_x, width),
            Self::declared_or(stream.dim_y, height),
        );
        if dims.0.saturating_mul(dims.1) > MAX_SENSOR_PIXELS {
            warn!("Ignoring declared sensor {}x{} (more than {} pixels)", dims.0, dims.1, MAX_SENSOR_PIXELS);
            return (width, height);
        }
        dims
    }

    fn declared_or(declared: Option<usize>, inferred: usize) -> usize {
        match declared {
            Some(side) if (1..=MAX_SENSOR_SIDE).contains(&side) => side,
            Some(side) => {
                warn!("Ignoring declared sensor side {} (expected 1..={})", side, MAX_SENSOR_SIDE);
                inferred
            }
            None => inferred,
        }
    }
}

impl Default for EventFrameSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSynth for EventFrameSource {
    type Data = EventStream;

    fn set_data(&mut self, stream: EventStream) {
        self.dims = Self::infer_dims(&stream);
        debug!(
            "Loaded {} events, sensor {}x{}",
            stream.events.len(),
            self.dims.0,
            self.dims.1
        );
        self.stream = Some(stream);
    }

    fn render(&self, time: f64, window: f64, options: &FrameOptions) -> RasterFrame {
        let stream = match &self.stream {
            Some(stream) => stream,
            None => {
                warn!("Event frame requested before data was set");
                return RasterFrame::unset();
            }
        };

        let contrast = options.effective_contrast();
        let polarised = options.polarised;
        let counts = event_image(
            stream,
            self.dims,
            time - window / 2.0,
            time + window / 2.0,
            polarised,
            contrast,
        );

        let (width, height) = self.dims;
        let data = counts
            .into_iter()
            .map(|count| to_intensity(count, polarised, contrast))
            .collect();
        RasterFrame::from_raw(width, height, ColorFormat::Luminance, data).unwrap_or_else(RasterFrame::unset)
    }

    fn get_dims(&self) -> (usize, usize) {
        self.dims
    }

    fn get_colorfmt(&self) -> ColorFormat {
        ColorFormat::Luminance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream() -> EventStream {
        EventStream::from_columns(
            vec![0, 3, 3, 1],
            vec![0, 1, 1, 2],
            vec![true, true, false, false],
            vec![1.0, 2.0, 2.5, 9.0],
        )
        .unwrap()
    }

    #[test]
    fn test_unset_source() {
        let source = EventFrameSource::new();
        assert_eq!(source.get_dims(), (1, 1));
        assert_eq!(source.get_frame(0.0, 1.0, &FrameOptions::default()), RasterFrame::unset());
    }

    #[test]
    fn test_dims_inferred_or_declared() {
        let source = EventFrameSource::with_data(stream());
        assert_eq!(source.get_dims(), (4, 3));

        let source = EventFrameSource::with_data(stream().with_dims(640, 480));
        assert_eq!(source.get_dims(), (640, 480));
    }

    #[test]
    fn test_empty_window_is_mid_grey_or_black() {
        let source = EventFrameSource::with_data(stream());

        let polarised = source.get_frame(50.0, 1.0, &FrameOptions::default());
        assert!(polarised.is_uniform(127));

        let unpolarised = FrameOptions::default().with_polarised(false);
        assert!(source.get_frame(50.0, 1.0, &unpolarised).is_uniform(0));

        let high_contrast = FrameOptions::default().with_contrast(10.0);
        assert!(source.get_frame(50.0, 1.0, &high_contrast).is_uniform(127));
    }

    #[test]
    fn test_window_selects_events() {
        let source = EventFrameSource::with_data(stream());
        let options = FrameOptions::default().with_contrast(1.0);

        // Window [1.5, 2.5]: ON and OFF at (3,1) cancel out
        let frame = source.get_frame(2.0, 1.0, &options);
        assert!(frame.is_uniform(127));

        // Window [0.5, 2.1]: ON at (0,0) and (3,1)
        let frame = source.get_frame(1.3, 1.6, &options);
        assert_eq!(frame.get(0, 0, 0), Some(255));
        assert_eq!(frame.get(3, 1, 0), Some(255));
        assert_eq!(frame.get(1, 2, 0), Some(127));

        // Window [8.5, 9.5]: OFF at (1,2)
        let frame = source.get_frame(9.0, 1.0, &options);
        assert_eq!(frame.get(1, 2, 0), Some(0));
    }

    #[test]
    fn test_repeat_queries_are_identical() {
        let source = EventFrameSource::with_data(stream());
        let options = FrameOptions::default();
        let dims = source.get_dims();

        let a = source.get_frame(2.0, 3.0, &options);
        let _ = source.get_frame(-4.0, 1.0, &options);
        let b = source.get_frame(2.0, 3.0, &options);
        assert_eq!(a, b);
        assert_eq!(source.get_dims(), dims);
        assert_eq!(a.dims(), dims);
    }

    #[test]
    fn test_oversized_declared_dims_fall_back() {
        let source = EventFrameSource::with_data(stream().with_dims(usize::MAX, 2));
        assert_eq!(source.get_dims(), (4, 2));

        let frame = source.get_frame(2.0, 3.0, &FrameOptions::default());
        assert_eq!(frame.dims(), (4, 2));

        let source = EventFrameSource::with_data(stream().with_dims(0, usize::MAX));
        assert_eq!(source.get_dims(), (4, 3));
        assert!(source.get_frame(50.0, 1.0, &FrameOptions::default()).is_uniform(127));

        // Widest valid side is accepted, an oversized area is not
        let source = EventFrameSource::with_data(stream().with_dims(65536, 1));
        assert_eq!(source.get_dims(), (65536, 1));
        let source = EventFrameSource::with_data(stream().with_dims(65536, 65536));
        assert_eq!(source.get_dims(), (4, 3));
    }
}
