use std::path::Path;

use anyhow::Context as _;

use crate::codec;
use crate::foundation::error::{WatermarkError, WatermarkResult};
use crate::raster::svg::SvgRasterizer;

/// Accepted watermark file extensions (lowercase, without the dot).
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "svg"];

/// Lowercased extension of `path`, if any.
pub(crate) fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// `true` when the path names an SVG document.
pub fn is_svg_path(path: &Path) -> bool {
    extension_of(path).as_deref() == Some("svg")
}

/// Cheap pre-flight check of a watermark image path.
///
/// Meant to run before any expensive or billable work produces the base image. An empty path is
/// valid (no watermark requested). SVGs are fully parsed; raster files only have their header
/// decoded.
#[tracing::instrument]
pub fn validate_watermark_image(path: &Path) -> WatermarkResult<()> {
    if path.as_os_str().is_empty() {
        return Ok(());
    }

    let meta = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(WatermarkError::NotFound(path.to_path_buf()));
        }
        Err(e) => {
            return Err(anyhow::Error::new(e)
                .context(format!("failed to access watermark image '{}'", path.display()))
                .into());
        }
    };
    if !meta.is_file() {
        return Err(WatermarkError::NotAFile(path.to_path_buf()));
    }

    let ext = extension_of(path).unwrap_or_default();
    if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        let shown = if ext.is_empty() {
            "(no extension)".to_owned()
        } else {
            format!(".{ext}")
        };
        return Err(WatermarkError::unsupported(format!(
            "{shown} (supported formats: PNG, JPEG, SVG)"
        )));
    }

    let bytes = std::fs::read(path)
        .with_context(|| format!("read watermark image '{}'", path.display()))?;

    if ext == "svg" {
        SvgRasterizer::default().check(&bytes)?;
    } else {
        let (width, height, format) = codec::decode_header(&bytes)?;
        tracing::debug!(width, height, %format, "watermark header ok");
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/watermark/validate.rs"]
mod tests;
