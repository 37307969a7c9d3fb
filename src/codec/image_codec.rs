use std::io::Cursor;

use crate::codec::sniff::{Sniffed, sniff};
use crate::foundation::core::{BitDepth, ImageFormat, PixelBuffer, narrow_u16};
use crate::foundation::error::{WatermarkError, WatermarkResult};

/// JPEG quality used for every re-encode.
pub const JPEG_QUALITY: u8 = 95;

fn detect(bytes: &[u8]) -> WatermarkResult<ImageFormat> {
    match sniff(bytes) {
        Sniffed::Supported(f) => Ok(f),
        Sniffed::Unsupported(name) => Err(WatermarkError::unsupported(format!(
            "{name} (only PNG and JPEG raster images are supported)"
        ))),
        Sniffed::Unknown => Err(WatermarkError::decode("unrecognized image data")),
    }
}

/// A decoded raster plus what is needed to write it back the same way.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    pub buffer: PixelBuffer,
    pub format: ImageFormat,
    /// Sample depth of the source container.
    pub depth: BitDepth,
}

/// Decode PNG or JPEG bytes into RGBA16, reporting the detected container and its depth.
#[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
pub fn decode_image(bytes: &[u8]) -> WatermarkResult<DecodedImage> {
    let format = detect(bytes)?;
    let img = image::load_from_memory_with_format(bytes, format.to_image_crate())
        .map_err(|e| WatermarkError::decode(format!("failed to decode {format}: {e}")))?;

    let depth = if img.color().bytes_per_pixel() / img.color().channel_count() > 1 {
        BitDepth::Sixteen
    } else {
        BitDepth::Eight
    };

    let rgba = img.into_rgba16();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(WatermarkError::degenerate(format!(
            "{format} image has zero area ({width}x{height})"
        )));
    }

    tracing::debug!(width, height, %format, ?depth, "decoded image");
    let buffer = PixelBuffer::from_raw(width, height, rgba.into_raw())?;
    Ok(DecodedImage {
        buffer,
        format,
        depth,
    })
}

/// [`decode_image`] without the depth.
pub fn decode(bytes: &[u8]) -> WatermarkResult<(PixelBuffer, ImageFormat)> {
    let decoded = decode_image(bytes)?;
    Ok((decoded.buffer, decoded.format))
}

/// Read only the container header: dimensions and format, no pixel data.
pub fn decode_header(bytes: &[u8]) -> WatermarkResult<(u32, u32, ImageFormat)> {
    let format = detect(bytes)?;
    let reader = image::ImageReader::with_format(Cursor::new(bytes), format.to_image_crate());
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| WatermarkError::decode(format!("invalid or corrupted {format} image: {e}")))?;
    Ok((width, height, format))
}

/// Encode a buffer as `format`, losslessly for PNG.
///
/// PNG is written as RGBA8 when every sample survives narrowing exactly, otherwise as RGBA16, so
/// decoding the output reproduces the buffer bit for bit. JPEG drops alpha and uses
/// [`JPEG_QUALITY`].
pub fn encode(buffer: &PixelBuffer, format: ImageFormat) -> WatermarkResult<Vec<u8>> {
    let depth = if fits_in_u8(buffer) {
        BitDepth::Eight
    } else {
        BitDepth::Sixteen
    };
    encode_with_depth(buffer, format, depth)
}

/// Encode a buffer as `format` at a fixed PNG sample depth; 8-bit output rounds each sample.
///
/// JPEG is always 8-bit RGB and ignores `depth`.
#[tracing::instrument(skip(buffer), fields(width = buffer.width(), height = buffer.height()))]
pub fn encode_with_depth(
    buffer: &PixelBuffer,
    format: ImageFormat,
    depth: BitDepth,
) -> WatermarkResult<Vec<u8>> {
    let (width, height) = buffer.dimensions();
    let mut out = Vec::new();

    match format {
        ImageFormat::Png => {
            let img = match depth {
                BitDepth::Eight => {
                    let rgba8: Vec<u8> =
                        buffer.as_raw().iter().map(|&v| narrow_u16(v)).collect();
                    image::RgbaImage::from_raw(width, height, rgba8)
                        .map(image::DynamicImage::ImageRgba8)
                }
                BitDepth::Sixteen => image::ImageBuffer::<image::Rgba<u16>, Vec<u16>>::from_raw(
                    width,
                    height,
                    buffer.as_raw().to_vec(),
                )
                .map(image::DynamicImage::ImageRgba16),
            };
            let img = img.ok_or_else(|| {
                WatermarkError::encode("pixel buffer does not match its dimensions")
            })?;

            img.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
                .map_err(|e| WatermarkError::encode(format!("failed to encode png: {e}")))?;
        }
        ImageFormat::Jpeg => {
            let mut rgb8 = Vec::with_capacity((width as usize) * (height as usize) * 3);
            for px in buffer.as_raw().chunks_exact(4) {
                rgb8.extend(px[..3].iter().map(|&v| narrow_u16(v)));
            }
            let mut encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
            encoder
                .encode(&rgb8, width, height, image::ExtendedColorType::Rgb8)
                .map_err(|e| WatermarkError::encode(format!("failed to encode jpeg: {e}")))?;
        }
    }

    tracing::debug!(bytes = out.len(), %format, ?depth, "encoded image");
    Ok(out)
}

/// Encode by format name (`"png"`, `"jpeg"`, `"jpg"`); anything else is unsupported.
pub fn encode_named(buffer: &PixelBuffer, format: &str) -> WatermarkResult<Vec<u8>> {
    encode(buffer, format.parse()?)
}

fn fits_in_u8(buffer: &PixelBuffer) -> bool {
    buffer.as_raw().iter().all(|&v| v % 257 == 0)
}

#[cfg(test)]
#[path = "../../tests/unit/codec/image_codec.rs"]
mod tests;
