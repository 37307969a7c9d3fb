use crate::foundation::color::Rgba8;
use crate::foundation::core::PixelBuffer;
use crate::foundation::error::{WatermarkError, WatermarkResult};
use crate::raster::fonts::FontDb;
use crate::raster::svg::MAX_RASTER_DIM;

/// Renders a string into a buffer that tightly bounds the glyphs, on a transparent background.
///
/// Font discovery and shaping live behind this seam; the compositing pipeline only consumes the
/// returned pixels.
pub trait TextRenderer {
    fn render_text(
        &self,
        content: &str,
        point_size: u32,
        color: Rgba8,
    ) -> WatermarkResult<PixelBuffer>;
}

/// Default [`TextRenderer`]: lays the string out as an SVG `<text>` element and lets
/// `usvg`/`resvg` shape and fill it.
///
/// Point sizes map 1:1 to pixels (72 dpi).
#[derive(Clone)]
pub struct SvgTextRenderer {
    fontdb: FontDb,
    font_family: String,
}

impl SvgTextRenderer {
    pub fn new(fontdb: FontDb) -> Self {
        Self {
            fontdb,
            font_family: "sans-serif".to_owned(),
        }
    }

    /// CSS font-family list handed to the SVG text node.
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    fn document(&self, content: &str, point_size: u32, color: Rgba8) -> String {
        // Roomy canvas; the bounding box of the glyphs is what gets rasterized.
        let chars = content.chars().count() as u64 + 2;
        let width = u64::from(point_size) * chars;
        let height = u64::from(point_size) * 3;
        let baseline = u64::from(point_size) * 2;

        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}"><text x="0" y="{baseline}" font-family="{family}" font-size="{point_size}" fill="{fill}" fill-opacity="{opacity}" xml:space="preserve">{text}</text></svg>"#,
            family = escape_xml(&self.font_family),
            fill = color.to_hex_rgb(),
            opacity = color.alpha_f32(),
            text = escape_xml(content),
        )
    }
}

impl TextRenderer for SvgTextRenderer {
    #[tracing::instrument(skip(self, content), fields(chars = content.chars().count()))]
    fn render_text(
        &self,
        content: &str,
        point_size: u32,
        color: Rgba8,
    ) -> WatermarkResult<PixelBuffer> {
        if content.trim().is_empty() {
            return Err(WatermarkError::invalid_config(
                "watermark text must not be empty",
            ));
        }
        if point_size == 0 {
            return Err(WatermarkError::invalid_config(
                "watermark text size must be >= 1",
            ));
        }

        let doc = self.document(content, point_size, color);
        let opts = usvg::Options {
            fontdb: self.fontdb.clone(),
            ..Default::default()
        };
        let tree = usvg::Tree::from_str(&doc, &opts)
            .map_err(|e| WatermarkError::text_render(format!("text layout failed: {e}")))?;

        if !tree.root().has_children() {
            return Err(WatermarkError::text_render(
                "no glyphs were produced (is a usable font installed?)",
            ));
        }

        let bbox = tree.root().abs_bounding_box();
        let x0 = bbox.left().floor();
        let y0 = bbox.top().floor();
        let width = (bbox.right().ceil() - x0) as u32;
        let height = (bbox.bottom().ceil() - y0) as u32;
        if width == 0 || height == 0 {
            return Err(WatermarkError::text_render("rendered text has zero area"));
        }
        if width > MAX_RASTER_DIM || height > MAX_RASTER_DIM {
            return Err(WatermarkError::invalid_config(format!(
                "rendered text too large: {width}x{height}"
            )));
        }

        let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| WatermarkError::text_render("failed to allocate text pixmap"))?;
        let xform = resvg::tiny_skia::Transform::from_translate(-x0, -y0);
        resvg::render(&tree, xform, &mut pixmap.as_mut());

        tracing::debug!(width, height, "rendered text watermark");
        PixelBuffer::from_premul_rgba8(width, height, pixmap.data())
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/raster/text.rs"]
mod tests;
