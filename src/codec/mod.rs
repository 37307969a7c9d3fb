//! Format-agnostic raster decode/encode.
//!
//! Container detection goes through [`sniff`] (magic bytes); pixel work goes through the `image`
//! crate. Everything in and out is a [`PixelBuffer`](crate::PixelBuffer).

pub(crate) mod image_codec;
pub mod sniff;

pub use image_codec::{
    DecodedImage, JPEG_QUALITY, decode, decode_header, decode_image, encode, encode_named,
    encode_with_depth,
};
