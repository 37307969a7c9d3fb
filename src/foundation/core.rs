use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{WatermarkError, WatermarkResult};

/// One straight-alpha RGBA pixel, 16 bits per channel.
pub type Rgba16 = [u16; 4];

/// Fully transparent black.
pub const TRANSPARENT: Rgba16 = [0, 0, 0, 0];

/// Widen an 8-bit channel to 16 bits (`0xFF -> 0xFFFF`).
#[inline]
pub fn widen_u8(v: u8) -> u16 {
    u16::from(v) * 257
}

/// Narrow a 16-bit channel to 8 bits with rounding.
#[inline]
pub fn narrow_u16(v: u16) -> u8 {
    ((u32::from(v) + 128) / 257) as u8
}

/// In-memory image: straight (non-premultiplied) RGBA, 16 bits per channel, row-major, tightly
/// packed.
///
/// `data.len() == width * height * 4` always holds; the fields are private so every constructor
/// can enforce it.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u16>,
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl PixelBuffer {
    /// Allocate a fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, TRANSPARENT)
    }

    /// Allocate a buffer with every pixel set to `px`.
    pub fn filled(width: u32, height: u32, px: Rgba16) -> Self {
        let n = (width as usize) * (height as usize);
        let mut data = Vec::with_capacity(n * 4);
        for _ in 0..n {
            data.extend_from_slice(&px);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Wrap raw RGBA16 samples, checking the length invariant.
    pub fn from_raw(width: u32, height: u32, data: Vec<u16>) -> WatermarkResult<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        if data.len() != expected {
            return Err(WatermarkError::invalid_config(format!(
                "pixel buffer {width}x{height} expects {expected} samples, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build from straight RGBA8 bytes, widening each channel.
    pub fn from_rgba8(width: u32, height: u32, rgba8: &[u8]) -> WatermarkResult<Self> {
        Self::from_raw(width, height, rgba8.iter().copied().map(widen_u8).collect())
    }

    /// Build from premultiplied RGBA8 bytes (tiny-skia pixmaps), demultiplying and widening.
    pub fn from_premul_rgba8(width: u32, height: u32, premul: &[u8]) -> WatermarkResult<Self> {
        let mut data = Vec::with_capacity(premul.len());
        for px in premul.chunks_exact(4) {
            let a = u32::from(px[3]);
            if a == 0 {
                data.extend_from_slice(&TRANSPARENT);
                continue;
            }
            for &c in &px[..3] {
                let straight = ((u32::from(c) * 255 + a / 2) / a).min(255) as u8;
                data.push(widen_u8(straight));
            }
            data.push(widen_u8(px[3]));
        }
        Self::from_raw(width, height, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// `true` when the buffer holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        ((y as usize) * (self.width as usize) + (x as usize)) * 4
    }

    /// Read the pixel at `(x, y)`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba16 {
        let i = self.index(x, y);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Overwrite the pixel at `(x, y)`. Panics when out of bounds.
    pub fn put_pixel(&mut self, x: u32, y: u32, px: Rgba16) {
        let i = self.index(x, y);
        self.data[i..i + 4].copy_from_slice(&px);
    }

    /// Samples of row `y`.
    pub fn row(&self, y: u32) -> &[u16] {
        let stride = self.width as usize * 4;
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    pub fn as_raw(&self) -> &[u16] {
        &self.data
    }

    pub(crate) fn as_raw_mut(&mut self) -> &mut [u16] {
        &mut self.data
    }

    /// `true` when every pixel has full alpha.
    pub fn is_opaque(&self) -> bool {
        self.data.chunks_exact(4).all(|px| px[3] == u16::MAX)
    }
}

/// Raster container formats the codec reads and writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Preferred file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    /// Map a MIME type reported by an upstream service; anything unknown is treated as PNG.
    pub fn from_mime_type(mime: &str) -> Self {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Self::Jpeg,
            _ => Self::Png,
        }
    }

    pub(crate) fn to_image_crate(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        })
    }
}

impl FromStr for ImageFormat {
    type Err = WatermarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            other => Err(WatermarkError::unsupported(format!(
                "{other} (only png and jpeg can be encoded)"
            ))),
        }
    }
}

/// Sample depth of an encoded image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BitDepth {
    #[default]
    Eight,
    Sixteen,
}

/// Horizontal component of an [`Anchor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

/// Vertical component of an [`Anchor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Middle,
    Bottom,
}

/// Named watermark position on the base image.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    TopLeft,
    TopCenter,
    TopRight,
    LeftCenter,
    Center,
    RightCenter,
    BottomLeft,
    BottomCenter,
    #[default]
    BottomRight,
}

impl Anchor {
    /// Every anchor, in row-major order.
    pub const ALL: [Anchor; 9] = [
        Anchor::TopLeft,
        Anchor::TopCenter,
        Anchor::TopRight,
        Anchor::LeftCenter,
        Anchor::Center,
        Anchor::RightCenter,
        Anchor::BottomLeft,
        Anchor::BottomCenter,
        Anchor::BottomRight,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopCenter => "top-center",
            Self::TopRight => "top-right",
            Self::LeftCenter => "left-center",
            Self::Center => "center",
            Self::RightCenter => "right-center",
            Self::BottomLeft => "bottom-left",
            Self::BottomCenter => "bottom-center",
            Self::BottomRight => "bottom-right",
        }
    }

    pub fn horizontal(self) -> HAlign {
        match self {
            Self::TopLeft | Self::LeftCenter | Self::BottomLeft => HAlign::Left,
            Self::TopCenter | Self::Center | Self::BottomCenter => HAlign::Center,
            Self::TopRight | Self::RightCenter | Self::BottomRight => HAlign::Right,
        }
    }

    pub fn vertical(self) -> VAlign {
        match self {
            Self::TopLeft | Self::TopCenter | Self::TopRight => VAlign::Top,
            Self::LeftCenter | Self::Center | Self::RightCenter => VAlign::Middle,
            Self::BottomLeft | Self::BottomCenter | Self::BottomRight => VAlign::Bottom,
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Anchor {
    type Err = WatermarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|a| a.name()).collect();
                WatermarkError::invalid_config(format!(
                    "unknown watermark position \"{s}\" (expected one of: {})",
                    names.join(", ")
                ))
            })
    }
}

/// Final composited pixels plus the container format and depth they must be written back as.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompositeResult {
    pub buffer: PixelBuffer,
    pub format: ImageFormat,
    /// Depth of the base image; an 8-bit PNG base stays 8-bit.
    pub depth: BitDepth,
}

impl CompositeResult {
    /// Encode [`CompositeResult::buffer`] as [`CompositeResult::format`] at
    /// [`CompositeResult::depth`].
    pub fn encode(&self) -> WatermarkResult<Vec<u8>> {
        crate::codec::encode_with_depth(&self.buffer, self.format, self.depth)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
