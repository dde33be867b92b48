//! Per-call frame options and the pose/point canvas configuration.

use crate::raster::RasterFrame;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Post-processing hook: receives the computed frame and the call context,
/// returns the frame handed back to the caller.
pub type PostProcess = Arc<dyn Fn(RasterFrame, &FrameContext<'_>) -> RasterFrame + Send + Sync>;

/// Default event contrast divisor
pub const DEFAULT_CONTRAST: f64 = 3.0;

/// Options recognised by `get_frame`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameOptions {
    /// Event count divisor mapping accumulated events into 8 bits
    pub contrast: f64,

    /// Signed event contribution around mid-grey (true) or unsigned (false)
    #[serde(alias = "polarized")]
    pub polarised: bool,

    /// Interpolate trajectories between samples (pose and point sources)
    pub interpolate: bool,

    /// Optional transform applied to every returned frame
    #[serde(skip)]
    pub callback: Option<PostProcess>,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            contrast: DEFAULT_CONTRAST,
            polarised: true,
            interpolate: true,
            callback: None,
        }
    }
}

impl FrameOptions {
    pub fn with_contrast(mut self, contrast: f64) -> Self {
        self.contrast = contrast;
        self
    }

    pub fn with_polarised(mut self, polarised: bool) -> Self {
        self.polarised = polarised;
        self
    }

    pub fn with_interpolate(mut self, interpolate: bool) -> Self {
        self.interpolate = interpolate;
        self
    }

    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(RasterFrame, &FrameContext<'_>) -> RasterFrame + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(callback));
        self
    }

    /// Contrast actually applied; non-positive or non-finite values fall
    /// back to the default.
    pub fn effective_contrast(&self) -> f64 {
        if self.contrast.is_finite() && self.contrast > 0.0 {
            self.contrast
        } else {
            DEFAULT_CONTRAST
        }
    }
}

impl fmt::Debug for FrameOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameOptions")
            .field("contrast", &self.contrast)
            .field("polarised", &self.polarised)
            .field("interpolate", &self.interpolate)
            .field("callback", &self.callback.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Everything a `get_frame` call was given, passed to the post-processing
/// hook alongside the frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    pub time: f64,
    pub window: f64,
    pub options: &'a FrameOptions,
}

/// Canvas used by the pose and point sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Canvas width in pixels (default: 300)
    pub width: usize,

    /// Canvas height in pixels (default: 300)
    pub height: usize,

    /// Length of drawn pose axes in normalised units (default: 1.0)
    pub axis_length: f64,

    /// Depth offset placing the normalised volume in front of the camera (default: 2.0)
    pub z_offset: f64,

    /// Side of the stale-interpolation marker in pixels (default: 30)
    pub warning_size: usize,

    /// Half size of point markers in pixels (default: 3)
    pub marker_half_size: i64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 300,
            height: 300,
            axis_length: 1.0,
            z_offset: 2.0,
            warning_size: 30,
            marker_half_size: 3,
        }
    }
}

impl RenderConfig {
    /// Projection scale: the smaller canvas side.
    pub fn projection_scale(&self) -> f64 {
        self.width.min(self.height) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::ColorFormat;

    #[test]
    fn test_defaults() {
        let options = FrameOptions::default();
        assert_eq!(options.contrast, 3.0);
        assert!(options.polarised);
        assert!(options.interpolate);
        assert!(options.callback.is_none());
    }

    #[test]
    fn test_deserialize_with_alias_and_defaults() {
        let options: FrameOptions =
            serde_json::from_str(r#"{ "polarized": false, "contrast": 5 }"#).unwrap();
        assert!(!options.polarised);
        assert_eq!(options.contrast, 5.0);
        assert!(options.interpolate);

        let config: RenderConfig = serde_json::from_str(r#"{ "width": 640 }"#).unwrap();
        assert_eq!(config.width, 640);
        assert_eq!(config.height, 300);
        assert_eq!(config.projection_scale(), 300.0);
    }

    #[test]
    fn test_effective_contrast_falls_back() {
        assert_eq!(FrameOptions::default().with_contrast(0.0).effective_contrast(), 3.0);
        assert_eq!(FrameOptions::default().with_contrast(f64::NAN).effective_contrast(), 3.0);
        assert_eq!(FrameOptions::default().with_contrast(2.0).effective_contrast(), 2.0);
    }

    #[test]
    fn test_callback_receives_context() {
        let options = FrameOptions::default().with_callback(|frame, ctx| {
            let value = (ctx.time as u8).wrapping_add(ctx.window as u8);
            RasterFrame::filled(frame.width(), frame.height(), frame.format(), value)
        });
        let ctx = FrameContext {
            time: 10.0,
            window: 2.0,
            options: &options,
        };
        let hook = options.callback.as_ref().unwrap();
        let out = hook(RasterFrame::zeros(2, 2, ColorFormat::Luminance), &ctx);
        assert!(out.is_uniform(12));
        assert!(format!("{:?}", options).contains("<fn>"));
    }
}
