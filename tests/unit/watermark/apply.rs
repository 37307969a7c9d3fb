use super::*;
use crate::foundation::color::Rgba8;
use crate::foundation::core::{Anchor, BitDepth, ImageFormat, PixelBuffer, widen_u8};
use crate::foundation::error::WatermarkError;

/// Solid block, `point_size` tall, half a point wide per char.
struct BlockText;

impl TextRenderer for BlockText {
    fn render_text(
        &self,
        content: &str,
        point_size: u32,
        color: Rgba8,
    ) -> WatermarkResult<PixelBuffer> {
        let w = content.chars().count() as u32 * point_size / 2;
        Ok(PixelBuffer::filled(
            w,
            point_size,
            [widen_u8(color.r), widen_u8(color.g), widen_u8(color.b), u16::MAX],
        ))
    }
}

fn marker() -> Watermarker<BlockText> {
    Watermarker::new(SvgRasterizer::default(), BlockText)
}

fn base(format: ImageFormat) -> Vec<u8> {
    let buf = PixelBuffer::filled(100, 60, [0, 0, 0, u16::MAX]);
    codec::encode(&buf, format).unwrap()
}

#[test]
fn text_watermark_lands_at_anchor_unscaled() {
    let spec = WatermarkSpec::text("abcd")
        .anchor(Anchor::TopLeft)
        .margin(5)
        .opacity(1.0);
    let out = marker().composite(&base(ImageFormat::Png), &spec).unwrap();
    assert_eq!(out.format, ImageFormat::Png);
    assert_eq!(out.buffer.dimensions(), (100, 60));

    // 4 chars * 24pt / 2 = 48 wide, 24 tall, starting at (5, 5).
    assert_eq!(out.buffer.pixel(5, 5), [u16::MAX; 4]);
    assert_eq!(out.buffer.pixel(52, 28), [u16::MAX; 4]);
    assert_eq!(out.buffer.pixel(53, 28), [0, 0, 0, u16::MAX]);
    assert_eq!(out.buffer.pixel(4, 5), [0, 0, 0, u16::MAX]);
}

#[test]
fn jpeg_base_stays_jpeg() {
    let spec = WatermarkSpec::text("x");
    let bytes = marker().apply(&base(ImageFormat::Jpeg), &spec).unwrap();
    let (_, format) = codec::decode(&bytes).unwrap();
    assert_eq!(format, ImageFormat::Jpeg);
}

#[test]
fn spec_errors_win_over_base_decoding() {
    let spec = WatermarkSpec::text("x").opacity(2.0);
    assert!(matches!(
        marker().composite(b"garbage", &spec),
        Err(WatermarkError::InvalidConfiguration(_))
    ));

    let spec = WatermarkSpec::image("/definitely/not/here.png");
    assert!(matches!(
        marker().composite(b"garbage", &spec),
        Err(WatermarkError::NotFound(_))
    ));
}

#[test]
fn bad_base_is_a_decode_error() {
    let spec = WatermarkSpec::text("x");
    assert!(matches!(
        marker().apply(b"garbage", &spec),
        Err(WatermarkError::Decode(_))
    ));
}

#[test]
fn zero_opacity_leaves_base_untouched() {
    let spec = WatermarkSpec::text("hello").opacity(0.0);
    let base_bytes = base(ImageFormat::Png);
    let out = marker().composite(&base_bytes, &spec).unwrap();
    let (orig, _) = codec::decode(&base_bytes).unwrap();
    assert_eq!(out.buffer, orig);
}

#[test]
fn eight_bit_png_base_stays_eight_bit() {
    // Half opacity lands blended samples between 8-bit steps.
    let spec = WatermarkSpec::text("abcd").opacity(0.5);
    let bytes = marker().apply(&base(ImageFormat::Png), &spec).unwrap();
    let decoded = codec::decode_image(&bytes).unwrap();
    assert_eq!(decoded.format, ImageFormat::Png);
    assert_eq!(decoded.depth, BitDepth::Eight);
}

#[test]
fn sixteen_bit_png_base_stays_sixteen_bit() {
    let base16 = codec::encode(&PixelBuffer::filled(40, 30, [1, 2, 3, u16::MAX]), ImageFormat::Png)
        .unwrap();
    let result = marker()
        .composite(&base16, &WatermarkSpec::text("ab").opacity(0.5))
        .unwrap();
    assert_eq!(result.depth, BitDepth::Sixteen);
}

#[test]
fn validated_variant_skips_the_path_check() {
    // Without the path check the base is decoded first.
    let spec = WatermarkSpec::image("/definitely/not/here.png");
    assert!(matches!(
        marker().composite_validated(b"garbage", &spec),
        Err(WatermarkError::Decode(_))
    ));
    assert!(matches!(
        marker().composite(b"garbage", &spec),
        Err(WatermarkError::NotFound(_))
    ));
}
