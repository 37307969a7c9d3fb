use std::path::PathBuf;

/// Convenience result type used across the crate.
pub type WatermarkResult<T> = Result<T, WatermarkError>;

/// Error taxonomy for watermark validation, decoding and compositing.
#[derive(thiserror::Error, Debug)]
pub enum WatermarkError {
    /// Contradictory or out-of-range watermark settings.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The watermark path does not exist.
    #[error("watermark image file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The watermark path exists but is not a regular file.
    #[error("watermark image path is not a file: {}", .0.display())]
    NotAFile(PathBuf),

    /// Extension or decoded container format outside PNG, JPEG and SVG.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Corrupt or malformed raster or vector content.
    #[error("decode error: {0}")]
    Decode(String),

    /// Output encoding failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// Zero-area source image or view box.
    #[error("degenerate geometry: {0}")]
    GeometryDegenerate(String),

    /// The text collaborator produced nothing drawable.
    #[error("text render error: {0}")]
    TextRender(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WatermarkError {
    /// Build a [`WatermarkError::InvalidConfiguration`] value.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Build a [`WatermarkError::UnsupportedFormat`] value.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedFormat(msg.into())
    }

    /// Build a [`WatermarkError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`WatermarkError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`WatermarkError::GeometryDegenerate`] value.
    pub fn degenerate(msg: impl Into<String>) -> Self {
        Self::GeometryDegenerate(msg.into())
    }

    /// Build a [`WatermarkError::TextRender`] value.
    pub fn text_render(msg: impl Into<String>) -> Self {
        Self::TextRender(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
