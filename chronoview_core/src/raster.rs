//! 8-bit raster frames returned by every frame source.

use crate::series::SourceImage;
use serde::{Deserialize, Serialize};

/// Mid-grey intensity used for placeholder frames
pub const MID_GREY: u8 = 128;

/// `width * height * channels`, or `None` on overflow.
pub fn sample_count(width: usize, height: usize, channels: usize) -> Option<usize> {
    width.checked_mul(height)?.checked_mul(channels)
}

/// Pixel encoding of a returned frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorFormat {
    /// One channel per pixel
    Luminance,
    /// Three interleaved channels per pixel (red, green, blue)
    Rgb,
}

impl ColorFormat {
    /// Number of interleaved channels for this format.
    pub fn channels(&self) -> usize {
        match self {
            ColorFormat::Luminance => 1,
            ColorFormat::Rgb => 3,
        }
    }

    /// Format implied by a channel count; anything but 3 is luminance.
    pub fn from_channels(channels: usize) -> Self {
        if channels == 3 {
            ColorFormat::Rgb
        } else {
            ColorFormat::Luminance
        }
    }
}

impl std::fmt::Display for ColorFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorFormat::Luminance => write!(f, "luminance"),
            ColorFormat::Rgb => write!(f, "rgb"),
        }
    }
}

/// A row-major, channel-interleaved 8-bit image.
///
/// Luminance frames have shape `(height, width)`, rgb frames
/// `(height, width, 3)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterFrame {
    width: usize,
    height: usize,
    format: ColorFormat,
    data: Vec<u8>,
}

impl RasterFrame {
    /// Creates a frame with every sample set to `value`.
    ///
    /// # Panics
    ///
    /// If `width * height * channels` overflows `usize`; use
    /// [`RasterFrame::from_raw`] for untrusted shapes.
    pub fn filled(width: usize, height: usize, format: ColorFormat, value: u8) -> Self {
        Self {
            width,
            height,
            format,
            data: vec![value; width * height * format.channels()],
        }
    }

    /// Creates a black frame.
    pub fn zeros(width: usize, height: usize, format: ColorFormat) -> Self {
        Self::filled(width, height, format, 0)
    }

    /// The 1x1 black frame returned when no data has been set.
    pub fn unset() -> Self {
        Self::zeros(1, 1, ColorFormat::Luminance)
    }

    /// Wraps an existing buffer; returns `None` if its length does not
    /// match the shape.
    pub fn from_raw(width: usize, height: usize, format: ColorFormat, data: Vec<u8>) -> Option<Self> {
        if sample_count(width, height, format.channels())? != data.len() {
            return None;
        }
        Some(Self {
            width,
            height,
            format,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn format(&self) -> ColorFormat {
        self.format
    }

    pub fn channels(&self) -> usize {
        self.format.channels()
    }

    /// `(width, height)`
    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Array shape: `[height, width]` or `[height, width, 3]`.
    pub fn shape(&self) -> Vec<usize> {
        match self.format {
            ColorFormat::Luminance => vec![self.height, self.width],
            ColorFormat::Rgb => vec![self.height, self.width, 3],
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    fn offset(&self, x: usize, y: usize, channel: usize) -> Option<usize> {
        let channels = self.channels();
        if x >= self.width || y >= self.height || channel >= channels {
            return None;
        }
        Some((y * self.width + x) * channels + channel)
    }

    /// Reads one sample; `None` outside the frame.
    pub fn get(&self, x: usize, y: usize, channel: usize) -> Option<u8> {
        self.offset(x, y, channel).map(|i| self.data[i])
    }

    /// Writes one sample with signed coordinates. Out-of-bounds writes are
    /// dropped; returns whether the pixel was inside the frame.
    pub fn put(&mut self, x: i64, y: i64, channel: usize, value: u8) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        match self.offset(x as usize, y as usize, channel) {
            Some(i) => {
                self.data[i] = value;
                true
            }
            None => false,
        }
    }

    /// Saturating add onto one sample, clipped to the frame.
    pub fn add(&mut self, x: i64, y: i64, channel: usize, value: u8) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        match self.offset(x as usize, y as usize, channel) {
            Some(i) => {
                self.data[i] = self.data[i].saturating_add(value);
                true
            }
            None => false,
        }
    }

    /// Sets a `size x size` block in the top-left corner of one channel.
    pub fn stamp_corner(&mut self, size: usize, channel: usize, value: u8) {
        for y in 0..size.min(self.height) {
            for x in 0..size.min(self.width) {
                self.put(x as i64, y as i64, channel, value);
            }
        }
    }

    /// Returns true if every sample equals `value`.
    pub fn is_uniform(&self, value: u8) -> bool {
        self.data.iter().all(|&v| v == value)
    }
}

impl From<&SourceImage> for RasterFrame {
    /// Loads an input image, rescaling float pixels to 8 bits.
    fn from(image: &SourceImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            format: ColorFormat::from_channels(image.channels()),
            data: image.pixels().to_u8(),
        }
    }
}
