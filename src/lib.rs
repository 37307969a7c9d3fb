//! Watermark compositing for generated images.
//!
//! Takes base image bytes (PNG or JPEG, detected from content) and a [`WatermarkSpec`] (text, a
//! raster image, or an SVG), and returns the watermarked image re-encoded in the base image's
//! own format:
//!
//! - [`validate_watermark_image`] checks a watermark path cheaply, before any costly work
//! - [`Watermarker`] owns the font database and runs the pipeline
//! - [`apply`] is the one-shot convenience entry point
#![forbid(unsafe_code)]

pub mod codec;
mod foundation;
pub mod raster;
pub mod schema;
pub mod watermark;

pub use crate::foundation::color::Rgba8;
pub use crate::foundation::core::{
    Anchor, BitDepth, CompositeResult, HAlign, ImageFormat, PixelBuffer, Rgba16, VAlign,
};
pub use crate::foundation::error::{WatermarkError, WatermarkResult};

pub use crate::raster::svg::{SvgRasterizer, rasterize};
pub use crate::raster::text::{SvgTextRenderer, TextRenderer};
pub use crate::watermark::apply::{Watermarker, apply};
pub use crate::watermark::spec::{
    ImageWatermark, TextWatermark, WatermarkConfig, WatermarkSource, WatermarkSpec,
};
pub use crate::watermark::validate::validate_watermark_image;
