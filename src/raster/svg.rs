use std::borrow::Cow;

use resvg::tiny_skia::Transform;
use svgtypes::{Align, AspectRatio, Length, ViewBox};
use usvg::roxmltree;

use crate::foundation::core::PixelBuffer;
use crate::foundation::error::{WatermarkError, WatermarkResult};
use crate::raster::fonts::{FontDb, empty_fontdb};

/// Raster width used when the caller passes a target size of 0.
pub const DEFAULT_RASTER_SIZE: u32 = 512;

/// Largest raster side we are willing to allocate.
pub const MAX_RASTER_DIM: u32 = 16_384;

/// Output dimensions for a document whose view box is `view_w x view_h`.
///
/// Width is `target_size` (or [`DEFAULT_RASTER_SIZE`] when 0); height follows the view box
/// aspect ratio, truncated, at least 1. A non-finite or non-positive view box yields a square.
pub fn raster_dims(view_w: f32, view_h: f32, target_size: u32) -> (u32, u32) {
    let width = if target_size > 0 {
        target_size
    } else {
        DEFAULT_RASTER_SIZE
    };

    let valid = |v: f32| v.is_finite() && v > 0.0;
    if !valid(view_w) || !valid(view_h) {
        return (width, width);
    }

    let height = (f64::from(width) * f64::from(view_h) / f64::from(view_w)).floor();
    let height = if height.is_finite() && height >= 1.0 {
        height.min(f64::from(u32::MAX)) as u32
    } else {
        1
    };
    (width, height)
}

/// Sizing attributes of the root `<svg>` element, read from the markup.
#[derive(Clone, Copy, Debug)]
struct RootGeometry {
    view_box: Option<ViewBox>,
    aspect: AspectRatio,
    /// An explicit `width` or `height` of zero (or less) disables rendering.
    zero_size: bool,
}

impl RootGeometry {
    fn read(doc: &roxmltree::Document<'_>) -> Self {
        let root = doc.root_element();
        let view_box = root
            .attribute("viewBox")
            .and_then(|v| v.parse::<ViewBox>().ok());
        let aspect = root
            .attribute("preserveAspectRatio")
            .and_then(|v| v.parse::<AspectRatio>().ok())
            .unwrap_or_default();
        let zero = |name: &str| {
            root.attribute(name)
                .and_then(|v| v.parse::<Length>().ok())
                .is_some_and(|l| l.number <= 0.0)
        };

        Self {
            view_box,
            aspect,
            zero_size: zero("width") || zero("height"),
        }
    }

    /// View box as `(x, y, w, h)`; the whole viewport when the document has none.
    fn view_rect(&self, viewport: usvg::Size) -> (f32, f32, f32, f32) {
        match self.view_box {
            Some(vb) => (vb.x as f32, vb.y as f32, vb.w as f32, vb.h as f32),
            None => (0.0, 0.0, viewport.width(), viewport.height()),
        }
    }
}

/// Parses SVG documents and renders them to [`PixelBuffer`]s.
#[derive(Clone)]
pub struct SvgRasterizer {
    fontdb: FontDb,
}

impl Default for SvgRasterizer {
    fn default() -> Self {
        Self::new(empty_fontdb())
    }
}

impl SvgRasterizer {
    /// Text inside documents resolves against `fontdb`.
    pub fn new(fontdb: FontDb) -> Self {
        Self { fontdb }
    }

    fn convert(&self, doc: &roxmltree::Document<'_>) -> WatermarkResult<usvg::Tree> {
        let opts = usvg::Options {
            fontdb: self.fontdb.clone(),
            ..Default::default()
        };
        usvg::Tree::from_xmltree(doc, &opts)
            .map_err(|e| WatermarkError::decode(format!("invalid SVG: {e}")))
    }

    /// Full parse of `bytes` without drawing; malformed markup is a [`WatermarkError::Decode`].
    pub fn check(&self, bytes: &[u8]) -> WatermarkResult<()> {
        let text = svg_text(bytes)?;
        let doc = parse_xml(&text)?;
        if RootGeometry::read(&doc).zero_size {
            return Ok(());
        }
        self.convert(&doc).map(|_| ())
    }

    /// Rasterize `svg_bytes` at `target_size` pixels wide, keeping the view box aspect ratio.
    ///
    /// The view box is mapped onto the whole output. Documents with a zero width or height draw
    /// nothing and come back as a transparent square.
    #[tracing::instrument(skip(self, svg_bytes), fields(len = svg_bytes.len()))]
    pub fn rasterize(&self, svg_bytes: &[u8], target_size: u32) -> WatermarkResult<PixelBuffer> {
        let text = svg_text(svg_bytes)?;
        let doc = parse_xml(&text)?;
        let geometry = RootGeometry::read(&doc);

        if geometry.zero_size {
            let (width, height) = raster_dims(0.0, 0.0, target_size);
            check_raster_size(width, height)?;
            tracing::warn!(width, height, "svg has a zero width or height, nothing to draw");
            return Ok(PixelBuffer::new(width, height));
        }

        let tree = self.convert(&doc)?;
        rasterize_tree(&tree, &geometry, target_size)
    }
}

/// Rasterize with an empty font database (documents without `<text>`).
pub fn rasterize(svg_bytes: &[u8], target_size: u32) -> WatermarkResult<PixelBuffer> {
    SvgRasterizer::default().rasterize(svg_bytes, target_size)
}

fn svg_text(bytes: &[u8]) -> WatermarkResult<Cow<'_, str>> {
    if bytes.starts_with(&[0x1f, 0x8b]) {
        let raw = usvg::decompress_svgz(bytes)
            .map_err(|e| WatermarkError::decode(format!("invalid SVG: {e}")))?;
        let text = String::from_utf8(raw)
            .map_err(|_| WatermarkError::decode("invalid SVG: not UTF-8 text"))?;
        return Ok(Cow::Owned(text));
    }
    std::str::from_utf8(bytes)
        .map(Cow::Borrowed)
        .map_err(|_| WatermarkError::decode("invalid SVG: not UTF-8 text"))
}

fn parse_xml(text: &str) -> WatermarkResult<roxmltree::Document<'_>> {
    let opts = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    roxmltree::Document::parse_with_options(text, opts)
        .map_err(|e| WatermarkError::decode(format!("invalid SVG: {e}")))
}

fn check_raster_size(width: u32, height: u32) -> WatermarkResult<()> {
    if width > MAX_RASTER_DIM || height > MAX_RASTER_DIM {
        return Err(WatermarkError::invalid_config(format!(
            "svg raster size too large: {width}x{height} (max {MAX_RASTER_DIM}x{MAX_RASTER_DIM})"
        )));
    }
    Ok(())
}

/// Transform usvg applies to fit the view box into the viewport (`preserveAspectRatio`).
fn viewport_transform(
    viewport: usvg::Size,
    (vx, vy, vw, vh): (f32, f32, f32, f32),
    aspect: AspectRatio,
) -> Transform {
    let sx = viewport.width() / vw;
    let sy = viewport.height() / vh;
    let (sx, sy) = if aspect.align == Align::None {
        (sx, sy)
    } else {
        let s = if aspect.slice { sx.max(sy) } else { sx.min(sy) };
        (s, s)
    };

    let free_w = viewport.width() - vw * sx;
    let free_h = viewport.height() - vh * sy;
    let (fx, fy) = match aspect.align {
        Align::None | Align::XMinYMin => (0.0, 0.0),
        Align::XMidYMin => (0.5, 0.0),
        Align::XMaxYMin => (1.0, 0.0),
        Align::XMinYMid => (0.0, 0.5),
        Align::XMidYMid => (0.5, 0.5),
        Align::XMaxYMid => (1.0, 0.5),
        Align::XMinYMax => (0.0, 1.0),
        Align::XMidYMax => (0.5, 1.0),
        Align::XMaxYMax => (1.0, 1.0),
    };

    Transform::from_row(
        sx,
        0.0,
        0.0,
        sy,
        -vx * sx + free_w * fx,
        -vy * sy + free_h * fy,
    )
}

fn rasterize_tree(
    tree: &usvg::Tree,
    geometry: &RootGeometry,
    target_size: u32,
) -> WatermarkResult<PixelBuffer> {
    let viewport = tree.size();
    let rect = geometry.view_rect(viewport);
    let (vx, vy, vw, vh) = rect;
    let (width, height) = raster_dims(vw, vh, target_size);
    check_raster_size(width, height)?;

    // The tree is already fitted into its viewport; undo that and map the view box onto the
    // output instead.
    let to_output =
        Transform::from_scale(width as f32 / vw, height as f32 / vh).pre_translate(-vx, -vy);
    let xform = match viewport_transform(viewport, rect, geometry.aspect).invert() {
        Some(inv) => to_output.pre_concat(inv),
        None => Transform::from_scale(
            width as f32 / viewport.width(),
            height as f32 / viewport.height(),
        ),
    };

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| WatermarkError::invalid_config("failed to allocate svg pixmap"))?;
    resvg::render(tree, xform, &mut pixmap.as_mut());

    tracing::debug!(width, height, "rasterized svg");
    PixelBuffer::from_premul_rgba8(width, height, pixmap.data())
}

#[cfg(test)]
#[path = "../../tests/unit/raster/svg.rs"]
mod tests;
