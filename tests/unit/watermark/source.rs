use std::cell::Cell;

use super::*;
use crate::foundation::color::Rgba8;
use crate::foundation::core::{ImageFormat, widen_u8};
use crate::watermark::spec::{ImageWatermark, TextWatermark};

struct BlockText {
    calls: Cell<u32>,
}

impl TextRenderer for BlockText {
    fn render_text(
        &self,
        content: &str,
        point_size: u32,
        color: Rgba8,
    ) -> WatermarkResult<PixelBuffer> {
        self.calls.set(self.calls.get() + 1);
        let w = content.chars().count() as u32 * point_size / 2;
        Ok(PixelBuffer::filled(
            w,
            point_size,
            [widen_u8(color.r), widen_u8(color.g), widen_u8(color.b), u16::MAX],
        ))
    }
}

fn image_source(path: &Path) -> WatermarkSource {
    WatermarkSource::Image(ImageWatermark {
        path: path.to_path_buf(),
        scale: 0.2,
    })
}

#[test]
fn text_goes_to_the_renderer() {
    let text = BlockText { calls: Cell::new(0) };
    let source = WatermarkSource::Text(TextWatermark {
        content: "abcd".into(),
        point_size: 10,
        color: Rgba8::rgba(1, 2, 3, 255),
    });
    let buf = resolve_source(&source, &SvgRasterizer::default(), &text).unwrap();
    assert_eq!(buf.dimensions(), (20, 10));
    assert_eq!(text.calls.get(), 1);
}

#[test]
fn raster_files_are_decoded() {
    let dir = tempfile::tempdir().unwrap();
    let png = PixelBuffer::filled(6, 3, [100, 200, 300, 400]);
    let path = dir.path().join("logo.png");
    std::fs::write(&path, codec::encode(&png, ImageFormat::Png).unwrap()).unwrap();

    let text = BlockText { calls: Cell::new(0) };
    let buf = resolve_source(&image_source(&path), &SvgRasterizer::default(), &text).unwrap();
    assert_eq!(buf, png);
    assert_eq!(text.calls.get(), 0);
}

#[test]
fn svg_files_are_rasterized_at_the_watermark_size() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logo.svg");
    std::fs::write(
        &path,
        br#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 40 10"><rect width="40" height="10"/></svg>"#,
    )
    .unwrap();

    let text = BlockText { calls: Cell::new(0) };
    let buf = resolve_source(&image_source(&path), &SvgRasterizer::default(), &text).unwrap();
    assert_eq!(buf.dimensions(), (SVG_WATERMARK_RASTER_SIZE, 256));
}

#[test]
fn foreign_and_missing_files_fail() {
    let dir = tempfile::tempdir().unwrap();
    let text = BlockText { calls: Cell::new(0) };
    let svg = SvgRasterizer::default();

    let gif = dir.path().join("logo.png");
    std::fs::write(&gif, b"GIF89a\x01\x00\x01\x00").unwrap();
    assert!(matches!(
        resolve_source(&image_source(&gif), &svg, &text),
        Err(WatermarkError::UnsupportedFormat(_))
    ));

    assert!(matches!(
        resolve_source(&image_source(&dir.path().join("gone.png")), &svg, &text),
        Err(WatermarkError::NotFound(_))
    ));
}
