//! Event accumulation: turns the events inside a time range into a
//! per-pixel count image.

use crate::chronoview_time::window_range;
use crate::series::EventStream;

/// Accumulates the events in `[start, stop]` into a row-major `width x height`
/// count image.
///
/// Polarised images add +1 per ON event and -1 per OFF event and are clipped
/// to `[-contrast, contrast]`; unpolarised images count every event and are
/// clipped to `[0, contrast]`. Events outside the sensor are ignored.
pub fn event_image(
    stream: &EventStream,
    dims: (usize, usize),
    start: f64,
    stop: f64,
    polarised: bool,
    contrast: f64,
) -> Vec<f64> {
    let (width, height) = dims;
    let mut image = vec![0.0f64; width * height];

    let range = window_range(stream.events.timestamps(), start, stop);
    for event in &stream.events.samples()[range] {
        let (x, y) = (event.x as usize, event.y as usize);
        if x >= width || y >= height {
            continue;
        }
        let contribution = if !polarised || event.polarity { 1.0 } else { -1.0 };
        image[y * width + x] += contribution;
    }

    let floor = if polarised { -contrast } else { 0.0 };
    for value in image.iter_mut() {
        *value = value.clamp(floor, contrast);
    }
    image
}

/// Maps a clipped count to 8 bits: polarised counts are centred on
/// mid-grey, unpolarised counts start at black.
pub fn to_intensity(value: f64, polarised: bool, contrast: f64) -> u8 {
    let scaled = if polarised {
        (value + contrast) / contrast / 2.0 * 255.0
    } else {
        value / contrast * 255.0
    };
    scaled.clamp(0.0, 255.0) as u8
}
