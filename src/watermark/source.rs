use std::path::Path;

use crate::codec;
use crate::foundation::core::PixelBuffer;
use crate::foundation::error::{WatermarkError, WatermarkResult};
use crate::raster::svg::SvgRasterizer;
use crate::raster::text::TextRenderer;
use crate::watermark::spec::WatermarkSource;
use crate::watermark::validate::is_svg_path;

/// Width SVG watermarks are rasterized at before proportional scaling.
pub const SVG_WATERMARK_RASTER_SIZE: u32 = 1024;

/// Produce the unscaled watermark pixels for `source`.
#[tracing::instrument(skip_all)]
pub fn resolve_source(
    source: &WatermarkSource,
    svg: &SvgRasterizer,
    text: &dyn TextRenderer,
) -> WatermarkResult<PixelBuffer> {
    let buffer = match source {
        WatermarkSource::Text(t) => text.render_text(&t.content, t.point_size, t.color)?,
        WatermarkSource::Image(img) => load_image(&img.path, svg)?,
    };
    tracing::debug!(
        width = buffer.width(),
        height = buffer.height(),
        "watermark source ready"
    );
    Ok(buffer)
}

fn load_image(path: &Path, svg: &SvgRasterizer) -> WatermarkResult<PixelBuffer> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(WatermarkError::NotFound(path.to_path_buf()));
        }
        Err(e) => {
            return Err(anyhow::Error::new(e)
                .context(format!("failed to open watermark image '{}'", path.display()))
                .into());
        }
    };

    if is_svg_path(path) {
        return svg.rasterize(&bytes, SVG_WATERMARK_RASTER_SIZE);
    }

    // The codec only yields PNG or JPEG; other containers fail inside `decode` as unsupported.
    let (buffer, format) = codec::decode(&bytes)?;
    tracing::debug!(%format, path = %path.display(), "decoded raster watermark");
    Ok(buffer)
}

#[cfg(test)]
#[path = "../../tests/unit/watermark/source.rs"]
mod tests;
