use std::path::Path;

use crate::codec;
use crate::foundation::core::CompositeResult;
use crate::foundation::error::WatermarkResult;
use crate::raster::fonts::{FontDb, system_fontdb};
use crate::raster::svg::SvgRasterizer;
use crate::raster::text::{SvgTextRenderer, TextRenderer};
use crate::watermark::blend::composite;
use crate::watermark::opacity::apply_opacity;
use crate::watermark::position::resolve_position;
use crate::watermark::scale::scale;
use crate::watermark::source::resolve_source;
use crate::watermark::spec::{WatermarkSource, WatermarkSpec};
use crate::watermark::validate::validate_watermark_image;

/// Runs the watermark pipeline: validate, decode base, resolve source, scale, fade, place,
/// blend, re-encode.
///
/// Holds no per-image state; one instance can serve any number of images, from any number of
/// threads when `T` allows it.
pub struct Watermarker<T = SvgTextRenderer> {
    svg: SvgRasterizer,
    text: T,
}

impl Watermarker<SvgTextRenderer> {
    /// Load system fonts (plus `font_dirs`) once and share them between SVG and text rendering.
    pub fn with_fonts<P: AsRef<Path>>(font_dirs: &[P]) -> Self {
        let fontdb: FontDb = system_fontdb(font_dirs);
        Self::new(
            SvgRasterizer::new(fontdb.clone()),
            SvgTextRenderer::new(fontdb),
        )
    }

    pub fn with_system_fonts() -> Self {
        Self::with_fonts::<&Path>(&[])
    }

    /// Render text watermarks with the CSS font-family list `family` instead of `sans-serif`.
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.text = self.text.with_font_family(family);
        self
    }
}

impl<T: TextRenderer> Watermarker<T> {
    pub fn new(svg: SvgRasterizer, text: T) -> Self {
        Self { svg, text }
    }

    /// Watermark `base_bytes` and keep the result as pixels.
    ///
    /// The watermark image path is validated before the base image is decoded.
    pub fn composite(
        &self,
        base_bytes: &[u8],
        spec: &WatermarkSpec,
    ) -> WatermarkResult<CompositeResult> {
        spec.check()?;
        if let WatermarkSource::Image(img) = &spec.source {
            validate_watermark_image(&img.path)?;
        }
        self.composite_validated(base_bytes, spec)
    }

    /// [`Watermarker::composite`] for callers that already ran [`validate_watermark_image`] on
    /// the watermark path.
    #[tracing::instrument(skip(self, base_bytes, spec), fields(len = base_bytes.len(), anchor = %spec.anchor))]
    pub fn composite_validated(
        &self,
        base_bytes: &[u8],
        spec: &WatermarkSpec,
    ) -> WatermarkResult<CompositeResult> {
        spec.check()?;

        let base = codec::decode_image(base_bytes)?;
        let base_dims = base.buffer.dimensions();

        let mark = resolve_source(&spec.source, &self.svg, &self.text)?;
        let mark = match &spec.source {
            WatermarkSource::Image(img) => scale(&mark, img.scale, base_dims.0)?,
            WatermarkSource::Text(_) => mark,
        };
        let mark = apply_opacity(mark, spec.opacity)?;

        let offset = resolve_position(spec.anchor, spec.margin, base_dims, mark.dimensions());
        tracing::debug!(
            x = offset.0,
            y = offset.1,
            wm_w = mark.width(),
            wm_h = mark.height(),
            "placing watermark"
        );

        let buffer = composite(base.buffer, &mark, offset);
        Ok(CompositeResult {
            buffer,
            format: base.format,
            depth: base.depth,
        })
    }

    /// Watermark `base_bytes` and re-encode in the base image's own format.
    pub fn apply(&self, base_bytes: &[u8], spec: &WatermarkSpec) -> WatermarkResult<Vec<u8>> {
        self.composite(base_bytes, spec)?.encode()
    }
}

/// One-shot [`Watermarker::apply`] with system fonts.
///
/// Loading the font database is not free; reuse a [`Watermarker`] when processing many images.
pub fn apply(base_bytes: &[u8], spec: &WatermarkSpec) -> WatermarkResult<Vec<u8>> {
    Watermarker::with_system_fonts().apply(base_bytes, spec)
}

#[cfg(test)]
#[path = "../../tests/unit/watermark/apply.rs"]
mod tests;
