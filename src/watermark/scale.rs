use rayon::prelude::*;

use crate::foundation::core::PixelBuffer;
use crate::foundation::error::{WatermarkError, WatermarkResult};
use crate::watermark::spec::check_scale;

/// Largest pixel count a scaled watermark may have.
const MAX_SCALED_PIXELS: u64 = 1 << 28;

/// Target size for a `src_w x src_h` watermark that should span `factor` of `base_width`.
pub fn scaled_dims(src_w: u32, src_h: u32, factor: f64, base_width: u32) -> (u32, u32) {
    let new_w = (f64::from(base_width) * factor).round().max(1.0) as u32;
    let new_h = (f64::from(new_w) * f64::from(src_h) / f64::from(src_w))
        .round()
        .max(1.0) as u32;
    (new_w, new_h)
}

/// Resize `buffer` to `factor * base_width` pixels wide, keeping its aspect ratio.
///
/// Nearest-neighbor: destination `(x, y)` samples source `(x*src_w/new_w, y*src_h/new_h)` with
/// floor division. Fast and blocky; no filtering.
#[tracing::instrument(skip(buffer), fields(src_w = buffer.width(), src_h = buffer.height()))]
pub fn scale(buffer: &PixelBuffer, factor: f64, base_width: u32) -> WatermarkResult<PixelBuffer> {
    check_scale(factor)?;
    if buffer.is_empty() {
        return Err(WatermarkError::degenerate(format!(
            "cannot scale a {}x{} watermark",
            buffer.width(),
            buffer.height()
        )));
    }

    let (src_w, src_h) = buffer.dimensions();
    let (new_w, new_h) = scaled_dims(src_w, src_h, factor, base_width);
    if u64::from(new_w) * u64::from(new_h) > MAX_SCALED_PIXELS {
        return Err(WatermarkError::invalid_config(format!(
            "scaled watermark too large: {new_w}x{new_h}"
        )));
    }

    let stride = new_w as usize * 4;
    let mut data = vec![0u16; stride * new_h as usize];
    data.par_chunks_exact_mut(stride)
        .enumerate()
        .for_each(|(y, row)| {
            let sy = (y as u64 * u64::from(src_h) / u64::from(new_h)) as u32;
            let src_row = buffer.row(sy);
            for (x, dst) in row.chunks_exact_mut(4).enumerate() {
                let sx = (x as u64 * u64::from(src_w) / u64::from(new_w)) as usize;
                dst.copy_from_slice(&src_row[sx * 4..sx * 4 + 4]);
            }
        });

    tracing::debug!(new_w, new_h, "scaled watermark");
    PixelBuffer::from_raw(new_w, new_h, data)
}

#[cfg(test)]
#[path = "../../tests/unit/watermark/scale.rs"]
mod tests;
