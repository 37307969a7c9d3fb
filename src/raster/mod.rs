//! Everything that turns non-raster input (SVG documents, text) into pixels.

pub mod fonts;
pub mod svg;
pub mod text;
