use rayon::prelude::*;

use crate::foundation::core::PixelBuffer;
use crate::foundation::error::WatermarkResult;
use crate::watermark::spec::check_opacity;

/// Multiply every pixel's alpha by `opacity` (rounded); color channels are left alone.
pub fn apply_opacity(mut buffer: PixelBuffer, opacity: f64) -> WatermarkResult<PixelBuffer> {
    check_opacity(opacity)?;
    if opacity == 1.0 {
        return Ok(buffer);
    }

    buffer
        .as_raw_mut()
        .par_chunks_exact_mut(4)
        .for_each(|px| px[3] = (f64::from(px[3]) * opacity).round() as u16);
    Ok(buffer)
}
