use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::foundation::color::Rgba8;
use crate::foundation::core::Anchor;
use crate::foundation::error::{WatermarkError, WatermarkResult};

pub const DEFAULT_MARGIN: u32 = 20;
pub const DEFAULT_OPACITY: f64 = 0.7;
pub const DEFAULT_TEXT_SIZE: u32 = 24;
pub const DEFAULT_SCALE: f64 = 0.2;
pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 1.0;

/// Flat watermark settings as they arrive from a config file or the command line.
///
/// Nothing is checked until [`WatermarkConfig::resolve`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatermarkConfig {
    /// Text watermark content. Mutually exclusive with `image`.
    pub text: Option<String>,
    /// Path to a PNG, JPEG or SVG watermark. Mutually exclusive with `text`.
    pub image: Option<PathBuf>,
    pub position: Anchor,
    /// Distance from the anchored edges, in pixels.
    pub margin: u32,
    /// 0.0 (invisible) to 1.0 (as drawn).
    pub opacity: f64,
    /// Text size in points.
    pub text_size: u32,
    pub text_color: Rgba8,
    /// Image watermark width as a fraction of the base image width (0.1 to 1.0).
    pub scale: f64,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            text: None,
            image: None,
            position: Anchor::BottomRight,
            margin: DEFAULT_MARGIN,
            opacity: DEFAULT_OPACITY,
            text_size: DEFAULT_TEXT_SIZE,
            text_color: Rgba8::WHITE,
            scale: DEFAULT_SCALE,
        }
    }
}

impl WatermarkConfig {
    fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|s| !s.is_empty())
    }

    fn image(&self) -> Option<&PathBuf> {
        self.image.as_ref().filter(|p| !p.as_os_str().is_empty())
    }

    /// `true` when either a text or an image watermark is set.
    pub fn is_requested(&self) -> bool {
        self.text().is_some() || self.image().is_some()
    }

    /// Turn the flat settings into a checked [`WatermarkSpec`].
    ///
    /// Returns `Ok(None)` when no watermark is requested. Setting both `text` and `image` is an
    /// error.
    pub fn resolve(&self) -> WatermarkResult<Option<WatermarkSpec>> {
        let source = match (self.text(), self.image()) {
            (Some(_), Some(_)) => {
                return Err(WatermarkError::invalid_config(
                    "cannot use both a text and an image watermark",
                ));
            }
            (None, None) => return Ok(None),
            (Some(content), None) => WatermarkSource::Text(TextWatermark {
                content: content.to_owned(),
                point_size: self.text_size,
                color: self.text_color,
            }),
            (None, Some(path)) => WatermarkSource::Image(ImageWatermark {
                path: path.clone(),
                scale: self.scale,
            }),
        };

        let spec = WatermarkSpec {
            anchor: self.position,
            margin: self.margin,
            opacity: self.opacity,
            source,
        };
        spec.check()?;
        Ok(Some(spec))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextWatermark {
    pub content: String,
    pub point_size: u32,
    pub color: Rgba8,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImageWatermark {
    /// PNG, JPEG or SVG file; SVG is chosen by the `.svg` extension.
    pub path: PathBuf,
    pub scale: f64,
}

/// Where the watermark pixels come from. Exactly one source per watermark.
#[derive(Clone, Debug, PartialEq)]
pub enum WatermarkSource {
    Text(TextWatermark),
    Image(ImageWatermark),
}

/// A checked watermark request.
#[derive(Clone, Debug, PartialEq)]
pub struct WatermarkSpec {
    pub anchor: Anchor,
    pub margin: u32,
    pub opacity: f64,
    pub source: WatermarkSource,
}

impl WatermarkSpec {
    /// Text watermark with default placement, opacity, size and color.
    pub fn text(content: impl Into<String>) -> Self {
        Self::with_source(WatermarkSource::Text(TextWatermark {
            content: content.into(),
            point_size: DEFAULT_TEXT_SIZE,
            color: Rgba8::WHITE,
        }))
    }

    /// Image watermark with default placement, opacity and scale.
    pub fn image(path: impl Into<PathBuf>) -> Self {
        Self::with_source(WatermarkSource::Image(ImageWatermark {
            path: path.into(),
            scale: DEFAULT_SCALE,
        }))
    }

    fn with_source(source: WatermarkSource) -> Self {
        Self {
            anchor: Anchor::default(),
            margin: DEFAULT_MARGIN,
            opacity: DEFAULT_OPACITY,
            source,
        }
    }

    pub fn anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn margin(mut self, margin: u32) -> Self {
        self.margin = margin;
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    /// Image scale; ignored for text watermarks.
    pub fn scale(mut self, scale: f64) -> Self {
        if let WatermarkSource::Image(img) = &mut self.source {
            img.scale = scale;
        }
        self
    }

    /// Re-check every range constraint (fields are public and may have been edited).
    pub fn check(&self) -> WatermarkResult<()> {
        check_opacity(self.opacity)?;
        match &self.source {
            WatermarkSource::Text(t) => {
                if t.content.is_empty() {
                    return Err(WatermarkError::invalid_config(
                        "watermark text must not be empty",
                    ));
                }
                if t.point_size < 1 {
                    return Err(WatermarkError::invalid_config(
                        "watermark text size must be >= 1",
                    ));
                }
            }
            WatermarkSource::Image(img) => {
                if img.path.as_os_str().is_empty() {
                    return Err(WatermarkError::invalid_config(
                        "watermark image path must not be empty",
                    ));
                }
                check_scale(img.scale)?;
            }
        }
        Ok(())
    }
}

pub(crate) fn check_opacity(opacity: f64) -> WatermarkResult<()> {
    if !(0.0..=1.0).contains(&opacity) {
        return Err(WatermarkError::invalid_config(format!(
            "watermark opacity must be within 0.0..=1.0, got {opacity}"
        )));
    }
    Ok(())
}

pub(crate) fn check_scale(scale: f64) -> WatermarkResult<()> {
    if !(MIN_SCALE..=MAX_SCALE).contains(&scale) {
        return Err(WatermarkError::invalid_config(format!(
            "watermark scale must be within {MIN_SCALE}..={MAX_SCALE}, got {scale}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/watermark/spec.rs"]
mod tests;
